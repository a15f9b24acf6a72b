//! HTTP implementation of [`MarketApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::query::PluginFilters;
use super::MarketApi;
use crate::error::{BazaarError, Result};
use crate::models::{
    AuthResponse, Credentials, ForumCategory, NewReply, NewReview, NewTopic, PasswordChange,
    Plugin, PluginDraft, ProfileUpdate, Purchase, PurchaseRequest, Registration, Reply, Review,
    ReviewPage, Topic, Upload, User, UserRef,
};

const USER_AGENT: &str = concat!("plugin-bazaar/", env!("CARGO_PKG_VERSION"));

/// Error body shape used by the API (`{ "message": "..." }`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Successful response body and the path it came from
struct Body {
    path: String,
    bytes: Vec<u8>,
}

/// `reqwest`-backed API client. No retries, no caching.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Create a client for the API at `base_url`. A zero timeout disables it.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        Self::with_client(base_url, builder)
    }

    fn with_client(base_url: &str, builder: ClientBuilder) -> Result<Self> {
        let base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `<base>/api/<segments...>`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&str>) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, authenticated = token.is_some(), "api request");

        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the raw body of a 2xx response
    async fn send(&self, builder: RequestBuilder) -> Result<Body> {
        let response = builder.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(Body {
                path,
                bytes: bytes.to_vec(),
            });
        }

        let message = error_message(&bytes);
        tracing::warn!(status = status.as_u16(), %path, ?message, "api request failed");
        Err(BazaarError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.send(builder).await?;
        decode(&body.path, &body.bytes)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], token: Option<&str>) -> Result<T> {
        self.send_json(self.request(Method::GET, segments, token))
            .await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        self.send_json(self.request(Method::POST, segments, token).json(body))
            .await
    }

    /// Request where only the status matters
    async fn post_unit<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
        body: &B,
    ) -> Result<()> {
        self.send(self.request(method, segments, token).json(body))
            .await
            .map(|_| ())
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| BazaarError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn file_part(upload: &Upload) -> Part {
    Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone())
}

fn plugin_form(draft: &PluginDraft) -> Form {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("price", draft.price.to_string());

    for tag in &draft.tags {
        form = form.text("tags", tag.clone());
    }
    for version in &draft.supported_versions {
        form = form.text("supportedVersions", version.clone());
    }
    for id in &draft.contributor_ids {
        form = form.text("contributors", id.clone());
    }

    form = form
        .text("versionNumber", draft.version_number.clone())
        .text("versionChangelog", draft.version_changelog.clone());

    if let Some(thumbnail) = &draft.thumbnail {
        form = form.part("thumbnail", file_part(thumbnail));
    }
    form.part("jarFile", file_part(&draft.jar))
}

fn profile_form(update: &ProfileUpdate, avatar: Option<&Upload>) -> Form {
    let mut form = Form::new();
    for (name, value) in update.fields() {
        form = form.text(name, value.to_string());
    }
    if let Some(avatar) = avatar {
        form = form.part("avatar", file_part(avatar));
    }
    form
}

#[async_trait]
impl MarketApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post(&["auth", "login"], None, credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        self.post_unit(Method::POST, &["auth", "register"], None, registration)
            .await
    }

    async fn list_plugins(&self, filters: &PluginFilters) -> Result<Vec<Plugin>> {
        let builder = self
            .request(Method::GET, &["plugins"], None)
            .query(&filters.to_query());
        self.send_json(builder).await
    }

    async fn featured_plugins(&self) -> Result<Vec<Plugin>> {
        self.get(&["plugins", "featured"], None).await
    }

    async fn plugin(&self, id: &str) -> Result<Plugin> {
        self.get(&["plugins", id], None).await
    }

    async fn related_plugins(&self, id: &str, tags: &[String]) -> Result<Vec<Plugin>> {
        let builder = self
            .request(Method::GET, &["plugins", "related", id], None)
            .query(&[("tags", tags.join(","))]);
        self.send_json(builder).await
    }

    async fn user_plugins(&self, user_id: &str) -> Result<Vec<Plugin>> {
        self.get(&["plugins", "user", user_id], None).await
    }

    async fn download_plugin(&self, token: &str, id: &str) -> Result<Vec<u8>> {
        self.send(self.request(Method::GET, &["plugins", id, "download"], Some(token)))
            .await
            .map(|body| body.bytes)
    }

    async fn create_plugin(&self, token: &str, draft: &PluginDraft) -> Result<Plugin> {
        let builder = self
            .request(Method::POST, &["plugins"], Some(token))
            .multipart(plugin_form(draft));
        self.send_json(builder).await
    }

    async fn purchase(&self, token: &str, plugin_id: &str) -> Result<Purchase> {
        let body = PurchaseRequest {
            plugin_id: plugin_id.to_string(),
        };
        let response = self
            .send(self.request(Method::POST, &["purchases"], Some(token)).json(&body))
            .await?;
        // Any 2xx is a completed purchase; the receipt is optional
        Ok(serde_json::from_slice(&response.bytes).unwrap_or_default())
    }

    async fn reviews(&self, plugin_id: &str, token: Option<&str>) -> Result<ReviewPage> {
        self.get(&["plugins", plugin_id, "reviews"], token).await
    }

    async fn post_review(
        &self,
        token: &str,
        plugin_id: &str,
        review: &NewReview,
    ) -> Result<Review> {
        self.post(&["plugins", plugin_id, "reviews"], Some(token), review)
            .await
    }

    async fn like_review(&self, token: &str, review_id: &str) -> Result<()> {
        self.post_unit(
            Method::POST,
            &["plugins", "reviews", review_id, "like"],
            Some(token),
            &serde_json::json!({}),
        )
        .await
    }

    async fn forum_categories(&self) -> Result<Vec<ForumCategory>> {
        self.get(&["forums", "categories"], None).await
    }

    async fn recent_topics(&self) -> Result<Vec<Topic>> {
        self.get(&["forums", "topics", "recent"], None).await
    }

    async fn topic(&self, id: &str) -> Result<Topic> {
        self.get(&["forums", "topics", id], None).await
    }

    async fn replies(&self, topic_id: &str, token: Option<&str>) -> Result<Vec<Reply>> {
        self.get(&["forums", "topics", topic_id, "replies"], token)
            .await
    }

    async fn create_topic(&self, token: &str, topic: &NewTopic) -> Result<Topic> {
        self.post(&["forums", "topics"], Some(token), topic).await
    }

    async fn post_reply(&self, token: &str, topic_id: &str, reply: &NewReply) -> Result<Reply> {
        self.post(&["forums", "topics", topic_id, "replies"], Some(token), reply)
            .await
    }

    async fn like_reply(&self, token: &str, reply_id: &str) -> Result<()> {
        self.post_unit(
            Method::POST,
            &["forums", "replies", reply_id, "like"],
            Some(token),
            &serde_json::json!({}),
        )
        .await
    }

    async fn me(&self, token: &str) -> Result<User> {
        self.get(&["users", "me"], Some(token)).await
    }

    async fn update_me(
        &self,
        token: &str,
        update: &ProfileUpdate,
        avatar: Option<&Upload>,
    ) -> Result<User> {
        let builder = self
            .request(Method::PUT, &["users", "me"], Some(token))
            .multipart(profile_form(update, avatar));
        self.send_json(builder).await
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<()> {
        self.post_unit(Method::PUT, &["users", "me", "password"], Some(token), change)
            .await
    }

    async fn user(&self, id: &str) -> Result<User> {
        self.get(&["users", id], None).await
    }

    async fn search_users(&self, token: &str, username: &str) -> Result<Vec<UserRef>> {
        let builder = self
            .request(Method::GET, &["users", "search"], Some(token))
            .query(&[("username", username)]);
        self.send_json(builder).await
    }
}
