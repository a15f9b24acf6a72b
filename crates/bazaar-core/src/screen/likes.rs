//! Optimistic like counts
//!
//! After a successful like call the displayed count is bumped locally. The
//! bump is tracked here until the next full fetch, where the server's
//! numbers replace it.

use std::collections::HashMap;

use crate::models::{Reply, Review};

/// Anything with a like button
pub trait Likeable {
    fn like_id(&self) -> &str;
    fn like_count(&self) -> u32;
    fn liked(&self) -> bool;
    fn set_like_state(&mut self, count: u32, liked: bool);
}

impl Likeable for Reply {
    fn like_id(&self) -> &str {
        &self.id
    }

    fn like_count(&self) -> u32 {
        self.like_count
    }

    fn liked(&self) -> bool {
        self.liked
    }

    fn set_like_state(&mut self, count: u32, liked: bool) {
        self.like_count = count;
        self.liked = liked;
    }
}

impl Likeable for Review {
    fn like_id(&self) -> &str {
        &self.id
    }

    fn like_count(&self) -> u32 {
        self.like_count
    }

    fn liked(&self) -> bool {
        self.liked
    }

    fn set_like_state(&mut self, count: u32, liked: bool) {
        self.like_count = count;
        self.liked = liked;
    }
}

/// Pending optimistic likes, by entity id
#[derive(Debug, Default)]
pub struct LikeOverlay {
    pending: HashMap<String, u32>,
}

impl LikeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// False once the item is liked, whether by the server or locally
    pub fn can_like<T: Likeable>(&self, item: &T) -> bool {
        !item.liked() && !self.pending.contains_key(item.like_id())
    }

    /// Record a confirmed like: count + 1, marked liked
    pub fn apply<T: Likeable>(&mut self, item: &mut T) {
        let count = item.like_count().saturating_add(1);
        item.set_like_state(count, true);
        self.pending.insert(item.like_id().to_string(), count);
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop local bumps after a full fetch; server values win
    pub fn reconcile(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "discarding optimistic likes");
        }
        self.pending.clear();
    }
}
