//! Forum index: categories and recent topics

use super::{AppContext, Loadable, Route, ScreenScope};
use crate::error::Result;
use crate::models::{ForumCategory, Topic};

const LOAD_FAILED: &str = "Failed to load forum data. Please try again later.";

#[derive(Debug, Clone, PartialEq)]
pub struct ForumIndex {
    pub categories: Vec<ForumCategory>,
    pub recent_topics: Vec<Topic>,
}

pub struct ForumIndexScreen {
    ctx: AppContext,
    scope: ScreenScope,
    pub index: Loadable<ForumIndex>,
}

impl ForumIndexScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            index: Loadable::Loading,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Both lists are fetched together; either failing fails the screen
    pub async fn mount(&mut self) -> Result<()> {
        self.index = Loadable::Loading;
        let api = self.ctx.api.clone();

        let both = async { tokio::try_join!(api.forum_categories(), api.recent_topics()) };
        match self.scope.run(both).await {
            Ok((categories, recent_topics)) => {
                self.index = Loadable::Ready(ForumIndex {
                    categories,
                    recent_topics,
                });
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "error fetching forum data");
                self.index = Loadable::Failed(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Go to the search results page; blank queries are ignored
    pub fn search(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.ctx.navigator.push(Route::ForumSearch(query.to_string()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, FakeApi};
    use std::sync::Arc;

    fn api_with_forum() -> Arc<FakeApi> {
        let api = Arc::new(FakeApi::new());
        api.state().categories = vec![
            fake::category("c1", "General"),
            fake::category("c2", "Help"),
        ];
        api.state().topics = vec![fake::topic("t1", "Welcome")];
        api
    }

    #[tokio::test]
    async fn mount_loads_both_lists() {
        let api = api_with_forum();
        let mut screen = ForumIndexScreen::new(fake::anonymous(&api));

        screen.mount().await.unwrap();

        let index = screen.index.value().unwrap();
        assert_eq!(index.categories.len(), 2);
        assert_eq!(index.recent_topics[0].title, "Welcome");
    }

    #[tokio::test]
    async fn one_failure_fails_the_screen() {
        let api = api_with_forum();
        api.fail("recent_topics", 500, None);
        let mut screen = ForumIndexScreen::new(fake::anonymous(&api));

        assert!(screen.mount().await.is_err());
        assert_eq!(screen.index.error(), Some(LOAD_FAILED));
    }

    #[test]
    fn search_navigates_for_non_blank_query() {
        let api = api_with_forum();
        let ctx = fake::anonymous(&api);
        let screen = ForumIndexScreen::new(ctx.clone());

        assert!(!screen.search("   "));
        assert_eq!(ctx.navigator.current(), Route::Home);

        assert!(screen.search(" claims "));
        assert_eq!(ctx.navigator.current(), Route::ForumSearch("claims".into()));
    }
}
