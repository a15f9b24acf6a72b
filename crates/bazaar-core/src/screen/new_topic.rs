//! New topic form

use super::{AppContext, Loadable, Route, ScreenScope, SubmitState};
use crate::error::Result;
use crate::models::{ForumCategory, NewTopic, Topic};

const TOPIC_LOGIN: &str = "You must be logged in to create a topic";
const CATEGORIES_FAILED: &str = "Failed to load forum categories. Please try again later.";
const CREATE_FAILED: &str = "Failed to create topic. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTopicForm {
    pub title: String,
    /// HTML
    pub content: String,
    pub category_id: String,
}

impl NewTopicForm {
    /// First failing check, in the order the form shows the fields
    fn validate(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("Please provide a title for your topic")
        } else if self.content.trim().is_empty() {
            Some("Please provide content for your topic")
        } else if self.category_id.trim().is_empty() {
            Some("Please select a category")
        } else {
            None
        }
    }
}

pub struct NewTopicScreen {
    ctx: AppContext,
    scope: ScreenScope,
    pub categories: Loadable<Vec<ForumCategory>>,
    pub form: NewTopicForm,
    pub submit: SubmitState,
}

impl NewTopicScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            categories: Loadable::Loading,
            form: NewTopicForm::default(),
            submit: SubmitState::Idle,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Auth gate, then load categories and preselect the first one
    pub async fn mount(&mut self) -> Result<()> {
        self.ctx.require_session(TOPIC_LOGIN)?;
        self.categories = Loadable::Loading;
        let api = self.ctx.api.clone();

        match self.scope.run(api.forum_categories()).await {
            Ok(categories) => {
                if self.form.category_id.is_empty() {
                    if let Some(first) = categories.first() {
                        self.form.category_id = first.id.clone();
                    }
                }
                self.categories = Loadable::Ready(categories);
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.categories = Loadable::Failed(CATEGORIES_FAILED.to_string());
                Err(self.ctx.report(e, CATEGORIES_FAILED))
            }
        }
    }

    pub async fn submit(&mut self) -> Result<Topic> {
        let token = self.ctx.require_session(TOPIC_LOGIN)?;
        if let Some(message) = self.form.validate() {
            return Err(self.ctx.reject(message));
        }

        let payload = NewTopic {
            title: self.form.title.trim().to_string(),
            content: self.form.content.clone(),
            category_id: self.form.category_id.clone(),
        };
        self.submit = SubmitState::Submitting;
        let result = self
            .scope
            .run(self.ctx.api.create_topic(&token, &payload))
            .await;
        self.submit = SubmitState::Idle;

        match result {
            Ok(topic) => {
                tracing::info!(id = %topic.id, "topic created");
                self.ctx.notifier.success("Topic created successfully!");
                self.ctx.navigator.push(Route::Topic(topic.id.clone()));
                Ok(topic)
            }
            Err(e) => Err(self.ctx.report(e, CREATE_FAILED)),
        }
    }
}
