//! Topic page: the opening post, its replies and the reply box

use super::{AppContext, LikeOverlay, Loadable, ScreenScope, SubmitState};
use crate::error::Result;
use crate::models::{NewReply, Reply, Topic};

const LOAD_FAILED: &str = "Failed to load topic. Please try again later.";
const REPLY_LOGIN: &str = "You must be logged in to reply";
const REPLY_FAILED: &str = "Failed to post reply. Please try again.";
const LIKE_LOGIN: &str = "You must be logged in to like a reply";
const LIKE_FAILED: &str = "Failed to like reply. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct TopicView {
    pub topic: Topic,
    pub replies: Vec<Reply>,
}

pub struct TopicScreen {
    ctx: AppContext,
    scope: ScreenScope,
    topic_id: String,
    pub view: Loadable<TopicView>,
    pub likes: LikeOverlay,
    pub submit: SubmitState,
}

impl TopicScreen {
    pub fn new(ctx: AppContext, topic_id: impl Into<String>) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            topic_id: topic_id.into(),
            view: Loadable::Loading,
            likes: LikeOverlay::new(),
            submit: SubmitState::Idle,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.view = Loadable::Loading;
        let api = self.ctx.api.clone();
        let id = self.topic_id.as_str();
        let token = self.ctx.session.token();

        let both = async { tokio::try_join!(api.topic(id), api.replies(id, token.as_deref())) };
        match self.scope.run(both).await {
            Ok((topic, replies)) => {
                self.likes.reconcile();
                self.view = Loadable::Ready(TopicView { topic, replies });
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, topic = %self.topic_id, "error fetching topic");
                self.view = Loadable::Failed(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Post a reply and append it to the visible list
    pub async fn post_reply(&mut self, content: &str) -> Result<Reply> {
        let token = self.ctx.require_session(REPLY_LOGIN)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(self.ctx.reject("Reply cannot be empty"));
        }

        let payload = NewReply {
            content: content.to_string(),
        };
        self.submit = SubmitState::Submitting;
        let result = self
            .scope
            .run(self.ctx.api.post_reply(&token, &self.topic_id, &payload))
            .await;
        self.submit = SubmitState::Idle;

        match result {
            Ok(reply) => {
                if let Some(view) = self.view.value_mut() {
                    view.replies.push(reply.clone());
                }
                self.ctx.notifier.success("Reply posted successfully");
                Ok(reply)
            }
            Err(e) => Err(self.ctx.report(e, REPLY_FAILED)),
        }
    }

    /// Like a reply. Returns `false` when it was already liked and no
    /// request was made.
    pub async fn like_reply(&mut self, reply_id: &str) -> Result<bool> {
        let token = self.ctx.require_session(LIKE_LOGIN)?;

        let likeable = self
            .view
            .value()
            .and_then(|view| view.replies.iter().find(|r| r.id == reply_id))
            .map(|reply| self.likes.can_like(reply))
            .unwrap_or(true);
        if !likeable {
            tracing::debug!(reply = reply_id, "already liked");
            return Ok(false);
        }

        if let Err(e) = self
            .scope
            .run(self.ctx.api.like_reply(&token, reply_id))
            .await
        {
            return Err(self.ctx.report(e, LIKE_FAILED));
        }

        if let Some(view) = self.view.value_mut() {
            if let Some(reply) = view.replies.iter_mut().find(|r| r.id == reply_id) {
                self.likes.apply(reply);
            }
        }
        Ok(true)
    }
}
