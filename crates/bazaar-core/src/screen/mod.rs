//! Screen Module
//!
//! Headless controllers, one per routed view. A screen owns the view state
//! of that view, fetches on `mount`, and exposes one method per user action.
//! Front ends render the state and drain the notices.
//!
//! Shared pieces:
//! - `notice`: transient notifications
//! - `route`: routes and navigation history
//! - `scope`: per-screen cancellation and stale-response protection
//! - `likes`: optimistic like counts

pub mod browser;
pub mod create_plugin;
pub mod detail;
pub mod forums;
pub mod home;
pub mod likes;
pub mod navbar;
pub mod new_topic;
pub mod notice;
pub mod profile;
pub mod reviews;
pub mod route;
pub mod scope;
pub mod settings;
pub mod topic;

use std::sync::Arc;

use crate::api::MarketApi;
use crate::error::{BazaarError, Result};
use crate::session::SessionHolder;

pub use browser::PluginBrowser;
pub use create_plugin::{CreatePluginScreen, PluginForm};
pub use detail::{DownloadedJar, PluginDetailScreen};
pub use forums::{ForumIndex, ForumIndexScreen};
pub use home::HomeScreen;
pub use likes::{LikeOverlay, Likeable};
pub use navbar::NavbarState;
pub use new_topic::{NewTopicForm, NewTopicScreen};
pub use notice::{Notice, NoticeLevel, Notifier};
pub use profile::{ProfileScreen, ProfileView};
pub use reviews::ReviewsScreen;
pub use route::{Navigator, Route};
pub use scope::{FetchTicket, ScreenScope};
pub use settings::{PasswordForm, SettingsScreen};
pub use topic::{TopicScreen, TopicView};

/// Everything a screen needs from the outside, shared by all screens
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn MarketApi>,
    pub session: SessionHolder,
    pub notifier: Notifier,
    pub navigator: Navigator,
}

impl AppContext {
    pub fn new(
        api: Arc<dyn MarketApi>,
        session: SessionHolder,
        notifier: Notifier,
        navigator: Navigator,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            navigator,
        }
    }

    /// Auth gate for protected screens and mutating actions.
    ///
    /// Without a session: shows `message`, sends the user to the login
    /// screen and fails with `NotAuthenticated`.
    pub fn require_session(&self, message: &str) -> Result<String> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => {
                self.notifier.error(message);
                self.navigator.push(Route::Login);
                Err(BazaarError::not_authenticated(message))
            }
        }
    }

    /// Client-side validation failure: notice plus error, nothing sent
    pub(crate) fn reject(&self, message: &str) -> BazaarError {
        self.notifier.error(message);
        BazaarError::validation(message)
    }

    /// Report a failed request and hand the error back.
    ///
    /// A rejected token signs the user out.
    pub(crate) fn report(&self, err: BazaarError, fallback: &str) -> BazaarError {
        if err.is_cancelled() {
            return err;
        }

        self.report_as(err.user_message(fallback), err)
    }

    /// Like [`report`](Self::report), but always shows `message`
    pub(crate) fn report_fixed(&self, err: BazaarError, message: &str) -> BazaarError {
        if err.is_cancelled() {
            return err;
        }
        self.report_as(message.to_string(), err)
    }

    fn report_as(&self, message: String, err: BazaarError) -> BazaarError {
        tracing::warn!(error = %err, "{}", message);
        self.notifier.error(message);
        if err.kind() == crate::error::ErrorKind::Unauthorized {
            if let Err(e) = self.session.logout() {
                tracing::warn!(error = %e, "failed to clear session");
            }
        }
        err
    }
}

/// Read-side state of a screen
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Write-side state of a form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
}

impl SubmitState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, FakeApi};
    use crate::error::ErrorKind;

    #[test]
    fn require_session_redirects_anonymous_user() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::anonymous(&api);

        let err = ctx.require_session("Please log in").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        assert_eq!(ctx.navigator.current(), Route::Login);
        assert_eq!(ctx.notifier.last().unwrap().message, "Please log in");
    }

    #[test]
    fn require_session_passes_token() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::signed_in(&api);
        assert_eq!(ctx.require_session("x").unwrap(), fake::TOKEN);
        assert!(ctx.notifier.pending().is_empty());
    }

    #[test]
    fn report_unauthorized_signs_out() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::signed_in(&api);

        let err = ctx.report(BazaarError::from_status(401, None), "Failed");

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!ctx.session.is_authenticated());
        assert_eq!(ctx.notifier.last().unwrap().message, "Failed");
    }

    #[test]
    fn loadable_accessors() {
        let mut state: Loadable<u32> = Loadable::default();
        assert!(state.is_loading());
        state = Loadable::Ready(3);
        assert_eq!(state.value(), Some(&3));
        state = Loadable::Failed("boom".into());
        assert_eq!(state.error(), Some("boom"));
    }
}
