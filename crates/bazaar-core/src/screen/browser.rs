//! Plugin listing with search and filters.
//!
//! Every filter change issues exactly one list request and replaces the
//! displayed list with its response. Sorting and filtering happen server-side.

use super::{AppContext, Loadable, ScreenScope};
use crate::api::query::{FilterChange, PluginFilters};
use crate::error::{BazaarError, Result};
use crate::models::Plugin;

const LOAD_FAILED: &str = "Failed to load plugins. Please try again later.";

pub struct PluginBrowser {
    ctx: AppContext,
    scope: ScreenScope,
    filters: PluginFilters,
    pub plugins: Loadable<Vec<Plugin>>,
}

impl PluginBrowser {
    pub fn new(ctx: AppContext) -> Self {
        Self::with_filters(ctx, PluginFilters::default())
    }

    /// Start from a preset selection (e.g. `/plugins?search=...`)
    pub fn with_filters(ctx: AppContext, filters: PluginFilters) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            filters,
            plugins: Loadable::Loading,
        }
    }

    pub fn filters(&self) -> &PluginFilters {
        &self.filters
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.fetch().await
    }

    /// Update the search text without fetching; `search()` submits it
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filters.search = text.into();
    }

    pub async fn search(&mut self) -> Result<()> {
        self.fetch().await
    }

    pub async fn apply_filter(&mut self, change: FilterChange) -> Result<()> {
        self.filters.apply(change);
        self.fetch().await
    }

    /// Several toggles at once, still a single request
    pub async fn apply_filters(&mut self, changes: Vec<FilterChange>) -> Result<()> {
        for change in changes {
            self.filters.apply(change);
        }
        self.fetch().await
    }

    async fn fetch(&mut self) -> Result<()> {
        if self.scope.is_closed() {
            return Err(BazaarError::Cancelled);
        }
        self.plugins = Loadable::Loading;
        let api = self.ctx.api.clone();

        match self.scope.run(api.list_plugins(&self.filters)).await {
            Ok(plugins) => {
                tracing::debug!(count = plugins.len(), "plugins loaded");
                self.plugins = Loadable::Ready(plugins);
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "error fetching plugins");
                self.plugins = Loadable::Failed(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }
}
