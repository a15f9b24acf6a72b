//! API Module
//!
//! Access to the remote marketplace API.
//!
//! - `http`: `reqwest` implementation of [`MarketApi`]
//! - `query`: plugin listing filters and their query-string encoding

pub mod http;
pub mod query;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AuthResponse, Credentials, ForumCategory, NewReply, NewReview, NewTopic, PasswordChange,
    Plugin, PluginDraft, ProfileUpdate, Purchase, Registration, Reply, Review, ReviewPage, Topic,
    Upload, User, UserRef,
};

pub use http::HttpApi;
pub use query::{
    FilterChange, PluginFilters, PriceFilter, SortKey, MINECRAFT_VERSIONS, PLUGIN_CATEGORIES,
};

/// Every endpoint the client consumes.
///
/// Methods taking a `token` send it as a bearer credential. Errors carry
/// the API's `message` field when the response body had one.
#[async_trait]
pub trait MarketApi: Send + Sync {
    // ========== Auth ==========

    /// `POST /api/auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    /// `POST /api/auth/register`
    async fn register(&self, registration: &Registration) -> Result<()>;

    // ========== Plugins ==========

    /// `GET /api/plugins?{filters}`
    async fn list_plugins(&self, filters: &PluginFilters) -> Result<Vec<Plugin>>;

    /// `GET /api/plugins/featured`
    async fn featured_plugins(&self) -> Result<Vec<Plugin>>;

    /// `GET /api/plugins/:id`
    async fn plugin(&self, id: &str) -> Result<Plugin>;

    /// `GET /api/plugins/related/:id?tags=a,b`
    async fn related_plugins(&self, id: &str, tags: &[String]) -> Result<Vec<Plugin>>;

    /// `GET /api/plugins/user/:id`
    async fn user_plugins(&self, user_id: &str) -> Result<Vec<Plugin>>;

    /// `GET /api/plugins/:id/download`, raw jar bytes
    async fn download_plugin(&self, token: &str, id: &str) -> Result<Vec<u8>>;

    /// Multipart `POST /api/plugins`
    async fn create_plugin(&self, token: &str, draft: &PluginDraft) -> Result<Plugin>;

    /// `POST /api/purchases`
    async fn purchase(&self, token: &str, plugin_id: &str) -> Result<Purchase>;

    // ========== Reviews ==========

    /// `GET /api/plugins/:id/reviews`; with a token the API also fills `userReview`
    async fn reviews(&self, plugin_id: &str, token: Option<&str>) -> Result<ReviewPage>;

    /// `POST /api/plugins/:id/reviews` (creates or replaces the caller's review)
    async fn post_review(&self, token: &str, plugin_id: &str, review: &NewReview)
        -> Result<Review>;

    /// `POST /api/plugins/reviews/:id/like`
    async fn like_review(&self, token: &str, review_id: &str) -> Result<()>;

    // ========== Forums ==========

    /// `GET /api/forums/categories`
    async fn forum_categories(&self) -> Result<Vec<ForumCategory>>;

    /// `GET /api/forums/topics/recent`
    async fn recent_topics(&self) -> Result<Vec<Topic>>;

    /// `GET /api/forums/topics/:id`
    async fn topic(&self, id: &str) -> Result<Topic>;

    /// `GET /api/forums/topics/:id/replies`; with a token the API fills `liked`
    async fn replies(&self, topic_id: &str, token: Option<&str>) -> Result<Vec<Reply>>;

    /// `POST /api/forums/topics`
    async fn create_topic(&self, token: &str, topic: &NewTopic) -> Result<Topic>;

    /// `POST /api/forums/topics/:id/replies`
    async fn post_reply(&self, token: &str, topic_id: &str, reply: &NewReply) -> Result<Reply>;

    /// `POST /api/forums/replies/:id/like`
    async fn like_reply(&self, token: &str, reply_id: &str) -> Result<()>;

    // ========== Users ==========

    /// `GET /api/users/me`
    async fn me(&self, token: &str) -> Result<User>;

    /// Multipart `PUT /api/users/me`
    async fn update_me(
        &self,
        token: &str,
        update: &ProfileUpdate,
        avatar: Option<&Upload>,
    ) -> Result<User>;

    /// `PUT /api/users/me/password`
    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<()>;

    /// `GET /api/users/:id`
    async fn user(&self, id: &str) -> Result<User>;

    /// `GET /api/users/search?username=`
    async fn search_users(&self, token: &str, username: &str) -> Result<Vec<UserRef>>;
}
