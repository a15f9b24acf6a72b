//! Routes and navigation history

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::form_urlencoded::byte_serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Plugins { search: Option<String> },
    Plugin(String),
    CreatePlugin,
    Forums,
    ForumSearch(String),
    Topic(String),
    NewTopic,
    Profile(String),
    Settings,
}

impl Route {
    /// Routes that only make sense for a signed-in user
    pub fn is_profile_only(&self) -> bool {
        matches!(self, Self::Profile(_) | Self::Settings | Self::CreatePlugin)
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "/"),
            Self::Login => write!(f, "/login"),
            Self::Plugins { search: None } => write!(f, "/plugins"),
            Self::Plugins { search: Some(q) } => write!(f, "/plugins?search={}", encode(q)),
            Self::Plugin(id) => write!(f, "/plugins/{}", id),
            Self::CreatePlugin => write!(f, "/plugins/create"),
            Self::Forums => write!(f, "/forums"),
            Self::ForumSearch(q) => write!(f, "/forums/search?q={}", encode(q)),
            Self::Topic(id) => write!(f, "/forums/topic/{}", id),
            Self::NewTopic => write!(f, "/forums/new-topic"),
            Self::Profile(id) => write!(f, "/profile/{}", id),
            Self::Settings => write!(f, "/profile/settings"),
        }
    }
}

/// Most routes kept in the visited list
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug)]
struct History {
    current: Route,
    visited: VecDeque<Route>,
}

/// Shared record of where the user is and where they have been
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Arc<Mutex<History>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::starting_at(Route::Home)
    }

    pub fn starting_at(route: Route) -> Self {
        Self {
            history: Arc::new(Mutex::new(History {
                current: route,
                visited: VecDeque::new(),
            })),
        }
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> Route {
        self.history().current.clone()
    }

    pub fn push(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        let mut history = self.history();
        let previous = std::mem::replace(&mut history.current, route);
        if history.visited.len() == HISTORY_LIMIT {
            history.visited.pop_front();
        }
        history.visited.push_back(previous);
    }

    /// Routes left behind, oldest first; at most [`HISTORY_LIMIT`]
    pub fn visited(&self) -> Vec<Route> {
        self.history().visited.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_paths() {
        assert_eq!(Route::Home.to_string(), "/");
        assert_eq!(Route::Topic("t1".into()).to_string(), "/forums/topic/t1");
        assert_eq!(
            Route::Plugins {
                search: Some("world edit".into())
            }
            .to_string(),
            "/plugins?search=world+edit"
        );
        assert_eq!(
            Route::ForumSearch("a&b".into()).to_string(),
            "/forums/search?q=a%26b"
        );
    }

    #[test]
    fn profile_only_routes() {
        assert!(Route::Settings.is_profile_only());
        assert!(Route::Profile("u1".into()).is_profile_only());
        assert!(Route::CreatePlugin.is_profile_only());
        assert!(!Route::Forums.is_profile_only());
    }

    #[test]
    fn navigator_tracks_history() {
        let nav = Navigator::new();
        let shared = nav.clone();
        nav.push(Route::Forums);
        shared.push(Route::Topic("t1".into()));

        assert_eq!(nav.current(), Route::Topic("t1".into()));
        assert_eq!(nav.visited(), vec![Route::Home, Route::Forums]);
    }

    #[test]
    fn history_drops_oldest_past_limit() {
        let nav = Navigator::new();
        for i in 0..HISTORY_LIMIT + 5 {
            nav.push(Route::Topic(i.to_string()));
        }

        let visited = nav.visited();
        assert_eq!(visited.len(), HISTORY_LIMIT);
        assert_eq!(visited[0], Route::Topic("4".into()));
        assert_eq!(
            visited[HISTORY_LIMIT - 1],
            Route::Topic((HISTORY_LIMIT + 3).to_string())
        );
    }
}
