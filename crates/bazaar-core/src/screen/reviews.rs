//! Reviews tab of the plugin detail page

use super::{AppContext, LikeOverlay, Likeable, Loadable, ScreenScope, SubmitState};
use crate::error::Result;
use crate::models::{NewReview, Review};

const LOAD_FAILED: &str = "Failed to load reviews. Please try again later.";
const REVIEW_LOGIN: &str = "You must be logged in to leave a review";
const REVIEW_FAILED: &str = "Failed to post review. Please try again.";
const LIKE_LOGIN: &str = "You must be logged in to like a review";
const LIKE_FAILED: &str = "Failed to like review. Please try again.";

pub struct ReviewsScreen {
    ctx: AppContext,
    scope: ScreenScope,
    plugin_id: String,
    pub reviews: Loadable<Vec<Review>>,
    /// The signed-in user's own review, if any
    pub user_review: Option<Review>,
    pub likes: LikeOverlay,
    pub submit: SubmitState,
}

impl ReviewsScreen {
    pub fn new(ctx: AppContext, plugin_id: impl Into<String>) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            plugin_id: plugin_id.into(),
            reviews: Loadable::Loading,
            user_review: None,
            likes: LikeOverlay::new(),
            submit: SubmitState::Idle,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.reviews = Loadable::Loading;
        let api = self.ctx.api.clone();
        // Sent when available so the server can fill in `liked`
        let token = self.ctx.session.token();

        match self
            .scope
            .run(api.reviews(&self.plugin_id, token.as_deref()))
            .await
        {
            Ok(page) => {
                self.likes.reconcile();
                self.reviews = Loadable::Ready(page.reviews);
                self.user_review = page.user_review;
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, plugin = %self.plugin_id, "error fetching reviews");
                self.reviews = Loadable::Failed(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Post a new review or replace the user's existing one
    pub async fn submit_review(&mut self, content: &str, rating: u8) -> Result<Review> {
        let token = self.ctx.require_session(REVIEW_LOGIN)?;
        if rating == 0 {
            return Err(self.ctx.reject("Please select a rating"));
        }
        if rating > 5 {
            return Err(self.ctx.reject("Rating must be between 1 and 5"));
        }

        let payload = NewReview {
            content: content.trim().to_string(),
            rating,
        };
        self.submit = SubmitState::Submitting;
        let result = self
            .scope
            .run(self.ctx.api.post_review(&token, &self.plugin_id, &payload))
            .await;
        self.submit = SubmitState::Idle;

        let review = match result {
            Ok(review) => review,
            Err(e) => return Err(self.ctx.report(e, REVIEW_FAILED)),
        };

        let updated = self.user_review.is_some();
        if let Some(list) = self.reviews.value_mut() {
            match list.iter_mut().find(|r| r.id == review.id) {
                Some(existing) => *existing = review.clone(),
                None => list.insert(0, review.clone()),
            }
        } else {
            self.reviews = Loadable::Ready(vec![review.clone()]);
        }
        self.user_review = Some(review.clone());

        self.ctx.notifier.success(if updated {
            "Review updated successfully"
        } else {
            "Review posted successfully"
        });
        Ok(review)
    }

    /// Like a review. Returns `false` when it was already liked and no
    /// request was made.
    pub async fn like_review(&mut self, review_id: &str) -> Result<bool> {
        let token = self.ctx.require_session(LIKE_LOGIN)?;

        let likeable = self
            .find(review_id)
            .map(|review| self.likes.can_like(review))
            .unwrap_or(true);
        if !likeable {
            tracing::debug!(review = review_id, "already liked");
            return Ok(false);
        }

        if let Err(e) = self
            .scope
            .run(self.ctx.api.like_review(&token, review_id))
            .await
        {
            return Err(self.ctx.report(e, LIKE_FAILED));
        }

        if let Some(list) = self.reviews.value_mut() {
            if let Some(review) = list.iter_mut().find(|r| r.id == review_id) {
                self.likes.apply(review);
            }
        }
        if let Some(own) = self.user_review.as_mut().filter(|r| r.id == review_id) {
            let count = own.like_count.saturating_add(1);
            own.set_like_state(count, true);
        }
        Ok(true)
    }

    fn find(&self, review_id: &str) -> Option<&Review> {
        self.reviews
            .value()
            .and_then(|list| list.iter().find(|r| r.id == review_id))
    }
}
