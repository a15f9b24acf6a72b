//! Plugin detail: description, related plugins, version history, purchase
//! and download.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::{AppContext, Loadable, ScreenScope};
use crate::error::{BazaarError, Result};
use crate::models::{Plugin, PluginVersion};

const LOAD_FAILED: &str = "Failed to load plugin details. Please try again later.";
const PURCHASE_LOGIN: &str = "Please login to purchase this plugin";
const PURCHASE_FAILED: &str = "Failed to purchase plugin. Please try again.";
const DOWNLOAD_LOGIN: &str = "Please login to download this plugin";
const DOWNLOAD_FAILED: &str = "Failed to download plugin. Please try again.";

/// A jar saved to disk
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedJar {
    pub path: PathBuf,
    pub size: usize,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

pub struct PluginDetailScreen {
    ctx: AppContext,
    scope: ScreenScope,
    plugin_id: String,
    pub plugin: Loadable<Plugin>,
    pub related: Vec<Plugin>,
}

impl PluginDetailScreen {
    pub fn new(ctx: AppContext, plugin_id: impl Into<String>) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            plugin_id: plugin_id.into(),
            plugin: Loadable::Loading,
            related: Vec::new(),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.session.is_authenticated()
    }

    /// Load the plugin, then its related plugins (only when it has tags)
    pub async fn mount(&mut self) -> Result<()> {
        self.plugin = Loadable::Loading;
        self.related.clear();
        let api = self.ctx.api.clone();

        let plugin = match self.scope.run(api.plugin(&self.plugin_id)).await {
            Ok(plugin) => plugin,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, id = %self.plugin_id, "error fetching plugin details");
                self.plugin = Loadable::Failed(LOAD_FAILED.to_string());
                return Err(e);
            }
        };

        if !plugin.tags.is_empty() {
            // Related plugins are decoration; failures are only logged
            match self
                .scope
                .run(api.related_plugins(&plugin.id, &plugin.tags))
                .await
            {
                Ok(related) => self.related = related,
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => tracing::warn!(error = %e, "error fetching related plugins"),
            }
        }

        self.plugin = Loadable::Ready(plugin);
        Ok(())
    }

    /// Versions, newest first; the first entry is the latest release
    pub fn version_history(&self) -> &[PluginVersion] {
        self.plugin
            .value()
            .map(|p| p.versions.as_slice())
            .unwrap_or(&[])
    }

    pub fn latest_version(&self) -> Option<&PluginVersion> {
        self.version_history().first()
    }

    pub async fn purchase(&mut self) -> Result<()> {
        let token = self.ctx.require_session(PURCHASE_LOGIN)?;

        match self
            .scope
            .run(self.ctx.api.purchase(&token, &self.plugin_id))
            .await
        {
            Ok(purchase) => {
                tracing::info!(plugin = %self.plugin_id, order = ?purchase.id, "plugin purchased");
                self.ctx.notifier.success("Plugin purchased successfully!");
                Ok(())
            }
            Err(e) => Err(self.ctx.report(e, PURCHASE_FAILED)),
        }
    }

    /// Download the jar into `dir` as `<plugin name>.jar`
    pub async fn download(&mut self, dir: &Path) -> Result<DownloadedJar> {
        let token = self.ctx.require_session(DOWNLOAD_LOGIN)?;
        let file_name = match self.plugin.value() {
            Some(plugin) => plugin.jar_file_name(),
            None => format!("{}.jar", self.plugin_id),
        };

        let bytes = match self
            .scope
            .run(self.ctx.api.download_plugin(&token, &self.plugin_id))
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.ctx.report(e, DOWNLOAD_FAILED)),
        };

        let jar = save_jar(dir, &file_name, &bytes).await.map_err(|e| {
            self.ctx.notifier.error(DOWNLOAD_FAILED);
            e
        })?;
        tracing::info!(path = %jar.path.display(), size = jar.size, "plugin downloaded");
        self.ctx.notifier.success("Download started!");
        Ok(jar)
    }
}

async fn save_jar(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<DownloadedJar> {
    if bytes.is_empty() {
        return Err(BazaarError::Decode {
            path: file_name.to_string(),
            message: "empty download".to_string(),
        });
    }

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;

    Ok(DownloadedJar {
        path,
        size: bytes.len(),
        sha256: hex::encode(Sha256::digest(bytes)),
    })
}
