//! Session Module
//!
//! - `holder`: the shared session (token, current user, change events)
//! - `store`: where the token is persisted between runs

pub mod holder;
pub mod store;

pub use holder::{SessionEvent, SessionHolder, LOGIN_FAILED, REGISTRATION_FAILED};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
