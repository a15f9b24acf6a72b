//! Home screen: featured plugins

use super::{AppContext, Loadable, ScreenScope};
use crate::error::Result;
use crate::models::Plugin;

const LOAD_FAILED: &str = "Failed to load featured plugins.";

pub struct HomeScreen {
    ctx: AppContext,
    scope: ScreenScope,
    pub featured: Loadable<Vec<Plugin>>,
}

impl HomeScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            featured: Loadable::Loading,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.featured = Loadable::Loading;
        let api = self.ctx.api.clone();

        match self.scope.run(api.featured_plugins()).await {
            Ok(plugins) => {
                self.featured = Loadable::Ready(plugins);
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "error fetching featured plugins");
                self.featured = Loadable::Failed(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, FakeApi};
    use std::sync::Arc;

    #[tokio::test]
    async fn mount_loads_featured() {
        let api = Arc::new(FakeApi::new());
        api.state().featured = vec![fake::plugin("p1", "EssentialsX", 0.0)];
        let mut screen = HomeScreen::new(fake::anonymous(&api));

        screen.mount().await.unwrap();

        assert_eq!(screen.featured.value().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mount_failure_sets_banner() {
        let api = Arc::new(FakeApi::new());
        api.fail("featured_plugins", 500, None);
        let mut screen = HomeScreen::new(fake::anonymous(&api));

        assert!(screen.mount().await.is_err());
        assert_eq!(screen.featured.error(), Some(LOAD_FAILED));
    }
}
