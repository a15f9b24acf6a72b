//! In-memory `MarketApi` for tests. Records every call and serves canned data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::query::{PluginFilters, PriceFilter};
use super::MarketApi;
use crate::error::{BazaarError, Result};
use crate::models::{
    AuthResponse, CategoryRef, Credentials, ForumCategory, NewReply, NewReview, NewTopic,
    PasswordChange, Plugin, PluginDraft, ProfileUpdate, Purchase, Registration, Reply, Review,
    ReviewPage, Topic, Upload, User, UserRef,
};
use crate::screen::{AppContext, Navigator, Notifier};
use crate::session::{MemoryTokenStore, SessionHolder};

pub const TOKEN: &str = "valid-token";
pub const EMAIL: &str = "steve@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const CURRENT_PASSWORD: &str = "old-password";

#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: &'static str,
    pub detail: String,
}

#[derive(Debug)]
pub struct FakeState {
    pub plugins: Vec<Plugin>,
    pub featured: Vec<Plugin>,
    pub related: Vec<Plugin>,
    pub reviews: ReviewPage,
    pub categories: Vec<ForumCategory>,
    pub topics: Vec<Topic>,
    pub replies: Vec<Reply>,
    pub users: Vec<User>,
    pub me: User,
    pub jar: Vec<u8>,
    failures: HashMap<&'static str, (u16, Option<String>)>,
    calls: Vec<Call>,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        let me = user("u1", "steve");
        Self {
            state: Mutex::new(FakeState {
                plugins: Vec::new(),
                featured: Vec::new(),
                related: Vec::new(),
                reviews: ReviewPage::default(),
                categories: Vec::new(),
                topics: Vec::new(),
                replies: Vec::new(),
                users: vec![me.clone()],
                me,
                jar: b"PK\x03\x04fake-jar".to_vec(),
                failures: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call to `endpoint` fail with `status`
    pub fn fail(&self, endpoint: &'static str, status: u16, message: Option<&str>) {
        self.state()
            .failures
            .insert(endpoint, (status, message.map(str::to_string)));
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.state().failures.remove(endpoint);
    }

    /// Details of the calls made to `endpoint`, in order
    pub fn calls(&self, endpoint: &str) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .map(|c| c.detail.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.len()
    }

    fn record(&self, endpoint: &'static str, detail: impl Into<String>) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call {
            endpoint,
            detail: detail.into(),
        });
        match state.failures.get(endpoint) {
            Some((status, message)) => Err(BazaarError::from_status(*status, message.clone())),
            None => Ok(()),
        }
    }

    fn authorize(token: &str) -> Result<()> {
        if token == TOKEN {
            Ok(())
        } else {
            Err(BazaarError::from_status(401, Some("Invalid token".into())))
        }
    }
}

#[async_trait]
impl MarketApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.record("login", credentials.email.clone())?;
        if credentials.email == EMAIL && credentials.password == PASSWORD {
            Ok(AuthResponse {
                token: TOKEN.to_string(),
                user: self.state().me.clone(),
            })
        } else {
            Err(BazaarError::from_status(
                401,
                Some("Invalid credentials".into()),
            ))
        }
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        self.record("register", registration.username.clone())
    }

    async fn list_plugins(&self, filters: &PluginFilters) -> Result<Vec<Plugin>> {
        let query = filters
            .to_query()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        self.record("list_plugins", query)?;

        Ok(self
            .state()
            .plugins
            .iter()
            .filter(|p| match filters.price {
                PriceFilter::All => true,
                PriceFilter::Free => p.is_free(),
                PriceFilter::Paid => !p.is_free(),
            })
            .cloned()
            .collect())
    }

    async fn featured_plugins(&self) -> Result<Vec<Plugin>> {
        self.record("featured_plugins", "")?;
        Ok(self.state().featured.clone())
    }

    async fn plugin(&self, id: &str) -> Result<Plugin> {
        self.record("plugin", id)?;
        self.state()
            .plugins
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| BazaarError::from_status(404, Some("Plugin not found".into())))
    }

    async fn related_plugins(&self, id: &str, tags: &[String]) -> Result<Vec<Plugin>> {
        self.record("related_plugins", format!("{}?tags={}", id, tags.join(",")))?;
        Ok(self.state().related.clone())
    }

    async fn user_plugins(&self, user_id: &str) -> Result<Vec<Plugin>> {
        self.record("user_plugins", user_id)?;
        Ok(self
            .state()
            .plugins
            .iter()
            .filter(|p| p.author.as_ref().map(|a| a.id.as_str()) == Some(user_id))
            .cloned()
            .collect())
    }

    async fn download_plugin(&self, token: &str, id: &str) -> Result<Vec<u8>> {
        self.record("download_plugin", id)?;
        Self::authorize(token)?;
        Ok(self.state().jar.clone())
    }

    async fn create_plugin(&self, token: &str, draft: &PluginDraft) -> Result<Plugin> {
        self.record("create_plugin", draft.name.clone())?;
        Self::authorize(token)?;
        let mut created = plugin("p-new", &draft.name, draft.price);
        created.tags = draft.tags.clone();
        created.supported_versions = draft.supported_versions.clone();
        Ok(created)
    }

    async fn purchase(&self, token: &str, plugin_id: &str) -> Result<Purchase> {
        self.record("purchase", plugin_id)?;
        Self::authorize(token)?;
        Ok(Purchase {
            id: Some("order-1".into()),
            plugin_id: Some(plugin_id.to_string()),
        })
    }

    async fn reviews(&self, plugin_id: &str, _token: Option<&str>) -> Result<ReviewPage> {
        self.record("reviews", plugin_id)?;
        Ok(self.state().reviews.clone())
    }

    async fn post_review(
        &self,
        token: &str,
        plugin_id: &str,
        review: &NewReview,
    ) -> Result<Review> {
        self.record("post_review", format!("{}:{}", plugin_id, review.rating))?;
        Self::authorize(token)?;
        let state = self.state();
        let id = state
            .reviews
            .user_review
            .as_ref()
            .map(|r| r.id.clone())
            .unwrap_or_else(|| "r-new".to_string());
        Ok(Review {
            id,
            content: review.content.clone(),
            rating: review.rating,
            author: Some(UserRef::from(&state.me)),
            created_at: None,
            like_count: 0,
            liked: false,
        })
    }

    async fn like_review(&self, token: &str, review_id: &str) -> Result<()> {
        self.record("like_review", review_id)?;
        Self::authorize(token)
    }

    async fn forum_categories(&self) -> Result<Vec<ForumCategory>> {
        self.record("forum_categories", "")?;
        Ok(self.state().categories.clone())
    }

    async fn recent_topics(&self) -> Result<Vec<Topic>> {
        self.record("recent_topics", "")?;
        Ok(self.state().topics.clone())
    }

    async fn topic(&self, id: &str) -> Result<Topic> {
        self.record("topic", id)?;
        self.state()
            .topics
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| BazaarError::from_status(404, Some("Topic not found".into())))
    }

    async fn replies(&self, topic_id: &str, token: Option<&str>) -> Result<Vec<Reply>> {
        let detail = match token {
            Some(_) => format!("{}:auth", topic_id),
            None => topic_id.to_string(),
        };
        self.record("replies", detail)?;
        Ok(self.state().replies.clone())
    }

    async fn create_topic(&self, token: &str, new_topic: &NewTopic) -> Result<Topic> {
        self.record("create_topic", new_topic.title.clone())?;
        Self::authorize(token)?;
        let mut created = topic("t-new", &new_topic.title);
        created.content = new_topic.content.clone();
        created.category = Some(CategoryRef::Id(new_topic.category_id.clone()));
        Ok(created)
    }

    async fn post_reply(&self, token: &str, topic_id: &str, new_reply: &NewReply) -> Result<Reply> {
        self.record("post_reply", topic_id)?;
        Self::authorize(token)?;
        let mut created = reply("reply-new", 0);
        created.content = new_reply.content.clone();
        Ok(created)
    }

    async fn like_reply(&self, token: &str, reply_id: &str) -> Result<()> {
        self.record("like_reply", reply_id)?;
        Self::authorize(token)
    }

    async fn me(&self, token: &str) -> Result<User> {
        self.record("me", "")?;
        Self::authorize(token)?;
        Ok(self.state().me.clone())
    }

    async fn update_me(
        &self,
        token: &str,
        update: &ProfileUpdate,
        avatar: Option<&Upload>,
    ) -> Result<User> {
        let detail = match avatar {
            Some(a) => format!("{}+{}", update.username, a.file_name),
            None => update.username.clone(),
        };
        self.record("update_me", detail)?;
        Self::authorize(token)?;

        let mut state = self.state();
        state.me.username = update.username.clone();
        state.me.email = Some(update.email.clone());
        state.me.bio = Some(update.bio.clone());
        if let Some(avatar) = avatar {
            state.me.avatar = Some(format!("/uploads/{}", avatar.file_name));
        }
        Ok(state.me.clone())
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<()> {
        self.record("change_password", "")?;
        Self::authorize(token)?;
        if change.current_password == CURRENT_PASSWORD {
            Ok(())
        } else {
            Err(BazaarError::from_status(
                400,
                Some("Current password is incorrect".into()),
            ))
        }
    }

    async fn user(&self, id: &str) -> Result<User> {
        self.record("user", id)?;
        self.state()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| BazaarError::from_status(404, Some("User not found".into())))
    }

    async fn search_users(&self, token: &str, username: &str) -> Result<Vec<UserRef>> {
        self.record("search_users", username)?;
        Self::authorize(token)?;
        let needle = username.to_lowercase();
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .map(UserRef::from)
            .collect())
    }
}

// ========== Fixtures ==========

pub fn user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: Some(format!("{}@example.com", username)),
        avatar: None,
        bio: None,
        location: None,
        website: None,
        title: None,
        created_at: None,
    }
}

pub fn plugin(id: &str, name: &str, price: f64) -> Plugin {
    Plugin {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("<p>{}</p>", name),
        price,
        thumbnail: None,
        category: None,
        tags: Vec::new(),
        supported_versions: vec!["1.20".to_string()],
        downloads: 0,
        rating: 0.0,
        review_count: 0,
        author: Some(UserRef::from(&user("u1", "steve"))),
        contributors: Vec::new(),
        versions: Vec::new(),
        created_at: None,
    }
}

pub fn review(id: &str, rating: u8, like_count: u32) -> Review {
    Review {
        id: id.to_string(),
        content: format!("review {}", id),
        rating,
        author: Some(UserRef::from(&user("u2", "alex"))),
        created_at: None,
        like_count,
        liked: false,
    }
}

pub fn category(id: &str, name: &str) -> ForumCategory {
    ForumCategory {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        topic_count: None,
    }
}

pub fn topic(id: &str, title: &str) -> Topic {
    Topic {
        id: id.to_string(),
        title: title.to_string(),
        content: format!("<p>{}</p>", title),
        author: Some(UserRef::from(&user("u2", "alex"))),
        category: None,
        created_at: None,
        reply_count: None,
        view_count: None,
    }
}

pub fn reply(id: &str, like_count: u32) -> Reply {
    Reply {
        id: id.to_string(),
        content: format!("<p>reply {}</p>", id),
        author: Some(UserRef::from(&user("u2", "alex"))),
        created_at: None,
        like_count,
        liked: false,
    }
}

/// Context with nobody signed in
pub fn anonymous(api: &Arc<FakeApi>) -> AppContext {
    context_with(api, MemoryTokenStore::new())
}

/// Context signed in with [`TOKEN`]
pub fn signed_in(api: &Arc<FakeApi>) -> AppContext {
    context_with(api, MemoryTokenStore::with_token(TOKEN))
}

fn context_with(api: &Arc<FakeApi>, store: MemoryTokenStore) -> AppContext {
    let api: Arc<dyn MarketApi> = api.clone();
    let session = SessionHolder::new(api.clone(), store).unwrap();
    AppContext::new(api, session, Notifier::new(), Navigator::new())
}
