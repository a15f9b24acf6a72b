//! Plugin upload form
//!
//! Holds the form fields, tag and version pickers, contributor search and
//! the attached files until the whole draft is submitted as one multipart
//! request.

use super::{AppContext, Route, ScreenScope, SubmitState};
use crate::error::Result;
use crate::models::{Plugin, PluginDraft, Upload, UserRef};

const CREATE_LOGIN: &str = "You must be logged in to create a plugin";
const CREATE_FAILED: &str = "Failed to create plugin. Please try again.";
const SEARCH_FAILED: &str = "Failed to search users. Please try again.";

/// Contributor search starts at this many characters
pub const MIN_CONTRIBUTOR_QUERY: usize = 2;

/// Plain text fields of the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginForm {
    pub name: String,
    /// HTML
    pub description: String,
    pub price: f64,
    pub version_number: String,
    pub version_changelog: String,
}

pub struct CreatePluginScreen {
    ctx: AppContext,
    scope: ScreenScope,
    pub form: PluginForm,
    pub tags: Vec<String>,
    pub supported_versions: Vec<String>,
    pub contributors: Vec<UserRef>,
    pub contributor_results: Vec<UserRef>,
    pub jar: Option<Upload>,
    pub thumbnail: Option<Upload>,
    pub submit: SubmitState,
}

impl CreatePluginScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            form: PluginForm::default(),
            tags: Vec::new(),
            supported_versions: Vec::new(),
            contributors: Vec::new(),
            contributor_results: Vec::new(),
            jar: None,
            thumbnail: None,
            submit: SubmitState::Idle,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Auth gate; the form itself needs no data
    pub fn mount(&self) -> Result<()> {
        self.ctx.require_session(CREATE_LOGIN).map(|_| ())
    }

    /// Add a tag. Blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Select or deselect a Minecraft version
    pub fn toggle_version(&mut self, version: &str) {
        if let Some(pos) = self.supported_versions.iter().position(|v| v == version) {
            self.supported_versions.remove(pos);
        } else {
            self.supported_versions.push(version.to_string());
        }
    }

    pub fn set_jar(&mut self, upload: Upload) -> Result<()> {
        if !upload.has_extension("jar") {
            return Err(self.ctx.reject("Only JAR files are allowed"));
        }
        self.jar = Some(upload);
        Ok(())
    }

    pub fn set_thumbnail(&mut self, upload: Option<Upload>) {
        self.thumbnail = upload;
    }

    /// Look up users to credit. Short queries clear the results without a
    /// request.
    pub async fn search_contributors(&mut self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.chars().count() < MIN_CONTRIBUTOR_QUERY {
            self.contributor_results.clear();
            return Ok(());
        }
        let token = self.ctx.require_session(CREATE_LOGIN)?;

        match self
            .scope
            .run(self.ctx.api.search_users(&token, query))
            .await
        {
            Ok(users) => {
                let me = self.ctx.session.user().map(|u| u.id);
                self.contributor_results = users
                    .into_iter()
                    .filter(|u| Some(&u.id) != me.as_ref())
                    .filter(|u| !self.contributors.iter().any(|c| c.id == u.id))
                    .collect();
                Ok(())
            }
            Err(e) => Err(self.ctx.report(e, SEARCH_FAILED)),
        }
    }

    pub fn add_contributor(&mut self, user: UserRef) -> bool {
        if self.contributors.iter().any(|c| c.id == user.id) {
            return false;
        }
        self.contributor_results.retain(|u| u.id != user.id);
        self.contributors.push(user);
        true
    }

    pub fn remove_contributor(&mut self, user_id: &str) {
        self.contributors.retain(|c| c.id != user_id);
    }

    fn validate(&self) -> Option<&'static str> {
        if self.form.name.trim().is_empty() {
            Some("Please provide a name for your plugin")
        } else if self.form.description.trim().is_empty() {
            Some("Please provide a description for your plugin")
        } else if self.form.version_number.trim().is_empty() {
            Some("Please provide a version number")
        } else if !self.form.price.is_finite() || self.form.price < 0.0 {
            Some("Price cannot be negative")
        } else if self.jar.is_none() {
            Some("Please upload a JAR file for your plugin")
        } else if self.supported_versions.is_empty() {
            Some("Please select at least one supported Minecraft version")
        } else {
            None
        }
    }

    /// Upload the draft, then open the new plugin's page
    pub async fn submit(&mut self) -> Result<Plugin> {
        let token = self.ctx.require_session(CREATE_LOGIN)?;
        if let Some(message) = self.validate() {
            return Err(self.ctx.reject(message));
        }
        let Some(jar) = self.jar.clone() else {
            return Err(self.ctx.reject("Please upload a JAR file for your plugin"));
        };

        let draft = PluginDraft {
            name: self.form.name.trim().to_string(),
            description: self.form.description.clone(),
            price: self.form.price,
            tags: self.tags.clone(),
            supported_versions: self.supported_versions.clone(),
            contributor_ids: self.contributors.iter().map(|c| c.id.clone()).collect(),
            version_number: self.form.version_number.trim().to_string(),
            version_changelog: self.form.version_changelog.clone(),
            thumbnail: self.thumbnail.clone(),
            jar,
        };

        self.submit = SubmitState::Submitting;
        let result = self
            .scope
            .run(self.ctx.api.create_plugin(&token, &draft))
            .await;
        self.submit = SubmitState::Idle;

        match result {
            Ok(plugin) => {
                tracing::info!(id = %plugin.id, name = %plugin.name, "plugin created");
                self.ctx.notifier.success("Plugin created successfully!");
                self.ctx.navigator.push(Route::Plugin(plugin.id.clone()));
                Ok(plugin)
            }
            Err(e) => Err(self.ctx.report(e, CREATE_FAILED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, FakeApi};
    use crate::error::ErrorKind;
    use std::sync::Arc;

    fn filled(ctx: crate::screen::AppContext) -> CreatePluginScreen {
        let mut screen = CreatePluginScreen::new(ctx);
        screen.form = PluginForm {
            name: "SkyBlock".into(),
            description: "<p>Islands</p>".into(),
            price: 2.5,
            version_number: "1.0.0".into(),
            version_changelog: "Initial release".into(),
        };
        screen.toggle_version("1.20");
        screen
            .set_jar(Upload::new("SkyBlock.jar", b"PK".to_vec()))
            .unwrap();
        screen
    }

    #[test]
    fn anonymous_mount_redirects_to_login() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::anonymous(&api);
        let screen = CreatePluginScreen::new(ctx.clone());

        let err = screen.mount().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        assert_eq!(ctx.navigator.current(), Route::Login);
        assert_eq!(ctx.notifier.last().unwrap().message, CREATE_LOGIN);
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let api = Arc::new(FakeApi::new());
        let mut screen = CreatePluginScreen::new(fake::signed_in(&api));

        assert!(screen.add_tag("  economy "));
        assert!(!screen.add_tag("economy"));
        assert!(!screen.add_tag("   "));
        assert!(screen.add_tag("shops"));
        screen.remove_tag("economy");

        assert_eq!(screen.tags, vec!["shops"]);
    }

    #[test]
    fn versions_toggle() {
        let api = Arc::new(FakeApi::new());
        let mut screen = CreatePluginScreen::new(fake::signed_in(&api));

        screen.toggle_version("1.20");
        screen.toggle_version("1.19");
        screen.toggle_version("1.20");

        assert_eq!(screen.supported_versions, vec!["1.19"]);
    }

    #[test]
    fn non_jar_upload_is_rejected() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::signed_in(&api);
        let mut screen = CreatePluginScreen::new(ctx.clone());

        let err = screen
            .set_jar(Upload::new("plugin.zip", vec![1, 2]))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(screen.jar.is_none());
        assert_eq!(
            ctx.notifier.last().unwrap().message,
            "Only JAR files are allowed"
        );
    }

    #[tokio::test]
    async fn short_contributor_query_skips_request() {
        let api = Arc::new(FakeApi::new());
        let mut screen = CreatePluginScreen::new(fake::signed_in(&api));

        screen.search_contributors("a").await.unwrap();

        assert!(api.calls("search_users").is_empty());
        assert!(screen.contributor_results.is_empty());
    }

    #[tokio::test]
    async fn contributors_are_searched_and_deduplicated() {
        let api = Arc::new(FakeApi::new());
        api.state().users.push(fake::user("u2", "alex"));
        api.state().users.push(fake::user("u3", "alexandra"));
        let mut screen = CreatePluginScreen::new(fake::signed_in(&api));

        screen.search_contributors("alex").await.unwrap();
        assert_eq!(api.calls("search_users"), vec!["alex"]);
        assert_eq!(screen.contributor_results.len(), 2);

        let alex = screen.contributor_results[0].clone();
        assert!(screen.add_contributor(alex.clone()));
        assert!(!screen.add_contributor(alex));
        assert_eq!(screen.contributors.len(), 1);
        assert_eq!(screen.contributor_results.len(), 1);

        screen.remove_contributor("u2");
        assert!(screen.contributors.is_empty());
    }

    #[tokio::test]
    async fn submit_requires_jar_and_versions() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::signed_in(&api);
        let mut screen = filled(ctx.clone());
        screen.jar = None;

        assert!(screen.submit().await.is_err());
        assert_eq!(
            ctx.notifier.last().unwrap().message,
            "Please upload a JAR file for your plugin"
        );

        let mut screen = filled(ctx.clone());
        screen.toggle_version("1.20");
        assert!(screen.submit().await.is_err());
        assert_eq!(
            ctx.notifier.last().unwrap().message,
            "Please select at least one supported Minecraft version"
        );

        assert!(api.calls("create_plugin").is_empty());
    }

    #[tokio::test]
    async fn submit_creates_and_navigates() {
        let api = Arc::new(FakeApi::new());
        let ctx = fake::signed_in(&api);
        let mut screen = filled(ctx.clone());
        screen.add_tag("skyblock");

        let plugin = screen.submit().await.unwrap();

        assert_eq!(plugin.id, "p-new");
        assert_eq!(plugin.tags, vec!["skyblock"]);
        assert_eq!(api.calls("create_plugin"), vec!["SkyBlock"]);
        assert_eq!(ctx.navigator.current(), Route::Plugin("p-new".into()));
        assert_eq!(
            ctx.notifier.last().unwrap().message,
            "Plugin created successfully!"
        );
    }

    #[tokio::test]
    async fn api_message_is_shown_on_failure() {
        let api = Arc::new(FakeApi::new());
        api.fail("create_plugin", 400, Some("Plugin name already taken"));
        let ctx = fake::signed_in(&api);
        let mut screen = filled(ctx.clone());

        assert!(screen.submit().await.is_err());
        assert_eq!(
            ctx.notifier.last().unwrap().message,
            "Plugin name already taken"
        );
        assert_eq!(ctx.navigator.current(), Route::Home);
    }
}
