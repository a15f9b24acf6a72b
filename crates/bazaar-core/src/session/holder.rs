//! Session Holder
//!
//! One shared "who is logged in" object for the whole process. Screens read
//! it through `AppContext` instead of consulting storage themselves, and can
//! subscribe to changes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::store::TokenStore;
use crate::api::MarketApi;
use crate::error::{BazaarError, ErrorKind, Result};
use crate::models::{Credentials, Registration, User};

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Published on every sign-in/sign-out
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedOut,
    /// A stored token was picked up; the user is not resolved yet
    Restored,
    SignedIn(User),
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

struct Inner {
    api: Arc<dyn MarketApi>,
    store: Box<dyn TokenStore>,
    state: Mutex<SessionState>,
    events: watch::Sender<SessionEvent>,
}

/// Cheap to clone; all clones share the same session.
#[derive(Clone)]
pub struct SessionHolder {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SessionHolder")
            .field("authenticated", &state.token.is_some())
            .field("user", &state.user.as_ref().map(|u| &u.username))
            .finish()
    }
}

impl SessionHolder {
    /// Create a holder, picking up any token persisted by an earlier run
    pub fn new(api: Arc<dyn MarketApi>, store: impl TokenStore + 'static) -> Result<Self> {
        let token = store.load()?;
        let initial = match token {
            Some(_) => SessionEvent::Restored,
            None => SessionEvent::SignedOut,
        };
        let (events, _) = watch::channel(initial);

        Ok(Self {
            inner: Arc::new(Inner {
                api,
                store: Box::new(store),
                state: Mutex::new(SessionState { token, user: None }),
                events,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Last user resolved by login or `current_user`, without a request
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(BazaarError::validation(
                "Please enter your email and password",
            ));
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.inner.api.login(&credentials).await.map_err(|e| {
            tracing::warn!(error = %e, "login failed");
            e
        })?;

        self.inner.store.save(&response.token)?;
        {
            let mut state = self.state();
            state.token = Some(response.token);
            state.user = Some(response.user.clone());
        }
        tracing::info!(user = %response.user.username, "signed in");
        self.inner
            .events
            .send_replace(SessionEvent::SignedIn(response.user.clone()));

        Ok(response.user)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        if registration.username.trim().is_empty() {
            return Err(BazaarError::validation("Username is required"));
        }
        if registration.email.trim().is_empty() {
            return Err(BazaarError::validation("Email is required"));
        }
        if registration.password.is_empty() {
            return Err(BazaarError::validation("Password is required"));
        }

        self.inner.api.register(registration).await.map_err(|e| {
            tracing::warn!(error = %e, "registration failed");
            e
        })
    }

    /// Forget the token and user, both in memory and on disk
    pub fn logout(&self) -> Result<()> {
        {
            let mut state = self.state();
            state.token = None;
            state.user = None;
        }
        self.inner.events.send_replace(SessionEvent::SignedOut);
        tracing::info!("signed out");
        self.inner.store.clear()
    }

    /// Resolve the signed-in user by fetching `/api/users/me`.
    ///
    /// Returns `None` without a token. A rejected token clears the session;
    /// other failures leave it in place.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        match self.inner.api.me(&token).await {
            Ok(user) => {
                {
                    let mut state = self.state();
                    if state.token.as_deref() != Some(token.as_str()) {
                        // Signed out or switched accounts while the request was in flight
                        return Ok(state.user.clone());
                    }
                    state.user = Some(user.clone());
                }
                self.inner
                    .events
                    .send_replace(SessionEvent::SignedIn(user.clone()));
                Ok(Some(user))
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch current user");
                if e.kind() == ErrorKind::Unauthorized
                    && self.token().as_deref() == Some(token.as_str())
                {
                    self.logout()?;
                }
                Err(e)
            }
        }
    }

    /// Startup check: validate a persisted token, if any
    pub async fn restore(&self) -> Result<Option<User>> {
        match self.current_user().await {
            Ok(user) => Ok(user),
            Err(e) if e.kind() == ErrorKind::Unauthorized => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the cached user after a profile update
    pub fn set_user(&self, user: User) {
        {
            let mut state = self.state();
            if state.token.is_none() {
                return;
            }
            state.user = Some(user.clone());
        }
        self.inner.events.send_replace(SessionEvent::SignedIn(user));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, FakeApi, TOKEN};
    use crate::session::MemoryTokenStore;

    fn holder(api: &Arc<FakeApi>, store: MemoryTokenStore) -> SessionHolder {
        SessionHolder::new(api.clone(), store).unwrap()
    }

    #[tokio::test]
    async fn login_persists_token_and_notifies() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::new());
        let mut events = session.subscribe();

        let user = session
            .login(fake::EMAIL, fake::PASSWORD)
            .await
            .unwrap();

        assert_eq!(user.username, "steve");
        assert_eq!(session.token().as_deref(), Some(TOKEN));
        assert!(events.has_changed().unwrap());
        assert_eq!(*events.borrow_and_update(), SessionEvent::SignedIn(user));
    }

    #[tokio::test]
    async fn first_event_matches_stored_token() {
        let api = Arc::new(FakeApi::new());

        let restored = holder(&api, MemoryTokenStore::with_token(TOKEN));
        assert!(restored.is_authenticated());
        assert_eq!(*restored.subscribe().borrow(), SessionEvent::Restored);

        let fresh = holder(&api, MemoryTokenStore::new());
        assert_eq!(*fresh.subscribe().borrow(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn login_failure_uses_api_message() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::new());

        let err = session.login(fake::EMAIL, "wrong").await.unwrap_err();
        assert_eq!(err.user_message(LOGIN_FAILED), "Invalid credentials");
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::new());

        let err = session.login("  ", "pw").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(api.calls("login").is_empty());
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::with_token(TOKEN));
        session.current_user().await.unwrap();
        let events = session.subscribe();

        session.logout().unwrap();

        assert!(session.token().is_none());
        assert!(session.user().is_none());
        assert_eq!(*events.borrow(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn current_user_without_token_is_none() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::new());
        assert_eq!(session.current_user().await.unwrap(), None);
        assert!(api.calls("me").is_empty());
    }

    #[tokio::test]
    async fn rejected_token_clears_session() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::with_token("expired"));

        let err = session.current_user().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!session.is_authenticated());

        // restore() treats the same situation as "not logged in"
        let session = holder(&api, MemoryTokenStore::with_token("expired"));
        assert_eq!(session.restore().await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_keeps_session() {
        let api = Arc::new(FakeApi::new());
        api.fail("me", 503, None);
        let session = holder(&api, MemoryTokenStore::with_token(TOKEN));

        let err = session.current_user().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn register_does_not_sign_in() {
        let api = Arc::new(FakeApi::new());
        let session = holder(&api, MemoryTokenStore::new());

        session
            .register(&Registration {
                username: "alex".into(),
                email: "alex@example.com".into(),
                password: "longpassword".into(),
            })
            .await
            .unwrap();

        assert_eq!(api.calls("register").len(), 1);
        assert!(!session.is_authenticated());
    }
}
