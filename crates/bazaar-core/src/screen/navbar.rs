//! Top bar: sign-in state, search box and sign out

use super::{AppContext, Route};
use crate::error::Result;
use crate::models::User;

pub struct NavbarState {
    ctx: AppContext,
    pub authenticated: bool,
    pub user: Option<User>,
}

impl NavbarState {
    pub fn new(ctx: AppContext) -> Self {
        let mut navbar = Self {
            ctx,
            authenticated: false,
            user: None,
        };
        navbar.refresh();
        navbar
    }

    /// Re-read sign-in state from the shared session
    pub fn refresh(&mut self) {
        self.authenticated = self.ctx.session.is_authenticated();
        self.user = self.ctx.session.user();
    }

    /// Called on every route change
    pub fn on_navigate(&mut self, route: Route) {
        self.ctx.navigator.push(route);
        self.refresh();
    }

    /// Submit the search box: opens the plugin listing filtered by `query`.
    /// A blank query does nothing and returns `false`.
    pub fn search(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.on_navigate(Route::Plugins {
            search: Some(query.to_string()),
        });
        true
    }

    /// Sign out; leaves profile-only pages for the home page
    pub fn logout(&mut self) -> Result<()> {
        self.ctx.session.logout()?;
        if self.ctx.navigator.current().is_profile_only() {
            self.ctx.navigator.push(Route::Home);
        }
        self.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, FakeApi};
    use crate::session::{SessionHolder, TokenStore};
    use std::sync::{Arc, Mutex};

    /// Store that remembers whether it was cleared
    #[derive(Clone, Default)]
    struct SpyStore {
        token: Arc<Mutex<Option<String>>>,
    }

    impl TokenStore for SpyStore {
        fn load(&self) -> crate::error::Result<Option<String>> {
            Ok(self.token.lock().unwrap().clone())
        }

        fn save(&self, token: &str) -> crate::error::Result<()> {
            *self.token.lock().unwrap() = Some(token.to_string());
            Ok(())
        }

        fn clear(&self) -> crate::error::Result<()> {
            *self.token.lock().unwrap() = None;
            Ok(())
        }
    }

    fn context_with_spy(api: &Arc<FakeApi>) -> (AppContext, SpyStore) {
        let store = SpyStore::default();
        store.save(fake::TOKEN).unwrap();
        let session = SessionHolder::new(api.clone(), store.clone()).unwrap();
        let ctx = AppContext::new(
            api.clone(),
            session,
            crate::screen::Notifier::new(),
            crate::screen::Navigator::new(),
        );
        (ctx, store)
    }

    #[test]
    fn logout_on_profile_route_goes_home() {
        let api = Arc::new(FakeApi::new());
        let (ctx, store) = context_with_spy(&api);
        let mut navbar = NavbarState::new(ctx.clone());
        navbar.on_navigate(Route::Settings);
        assert!(navbar.authenticated);

        navbar.logout().unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(!navbar.authenticated);
        assert_eq!(ctx.navigator.current(), Route::Home);
    }

    #[test]
    fn logout_elsewhere_stays_put() {
        let api = Arc::new(FakeApi::new());
        let (ctx, store) = context_with_spy(&api);
        let mut navbar = NavbarState::new(ctx.clone());
        navbar.on_navigate(Route::Topic("t1".into()));

        navbar.logout().unwrap();

        assert!(store.load().unwrap().is_none());
        assert_eq!(ctx.navigator.current(), Route::Topic("t1".into()));
    }

    #[test]
    fn navigation_picks_up_sign_out_elsewhere() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::signed_in(&api);
        let mut navbar = NavbarState::new(ctx.clone());
        assert!(navbar.authenticated);

        ctx.session.logout().unwrap();
        assert!(navbar.authenticated);

        navbar.on_navigate(Route::Forums);
        assert!(!navbar.authenticated);
    }

    #[test]
    fn search_opens_filtered_listing() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::anonymous(&api);
        let mut navbar = NavbarState::new(ctx.clone());

        assert!(navbar.search(" worldedit "));
        assert_eq!(
            ctx.navigator.current(),
            Route::Plugins {
                search: Some("worldedit".into())
            }
        );

    }

    #[test]
    fn blank_search_stays_put() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::anonymous(&api);
        let mut navbar = NavbarState::new(ctx.clone());
        navbar.on_navigate(Route::Forums);

        assert!(!navbar.search("   "));
        assert!(!navbar.search(""));
        assert_eq!(ctx.navigator.current(), Route::Forums);
    }
}
