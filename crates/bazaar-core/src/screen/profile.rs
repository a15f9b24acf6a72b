//! Public profile page: a user and the plugins they published

use super::{AppContext, Loadable, ScreenScope};
use crate::error::Result;
use crate::models::{Plugin, User};

const LOAD_FAILED: &str = "Failed to load user profile. Please try again later.";

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub user: User,
    pub plugins: Vec<Plugin>,
}

pub struct ProfileScreen {
    ctx: AppContext,
    scope: ScreenScope,
    user_id: String,
    pub view: Loadable<ProfileView>,
}

impl ProfileScreen {
    pub fn new(ctx: AppContext, user_id: impl Into<String>) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            user_id: user_id.into(),
            view: Loadable::Loading,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// True when the page shows the signed-in user's own profile
    pub fn is_own_profile(&self) -> bool {
        self.ctx
            .session
            .user()
            .map(|u| u.id == self.user_id)
            .unwrap_or(false)
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.view = Loadable::Loading;
        let api = self.ctx.api.clone();
        let id = self.user_id.as_str();

        let both = async { tokio::try_join!(api.user(id), api.user_plugins(id)) };
        match self.scope.run(both).await {
            Ok((user, plugins)) => {
                self.view = Loadable::Ready(ProfileView { user, plugins });
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, user = %self.user_id, "error fetching profile");
                self.view = Loadable::Failed(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }
}
