use std::path::Path;
use std::sync::Arc;

use crate::config::{self, AppConfig};
use crate::hidden::HiddenStore;
use crate::i18n::Catalog;
use crate::metadata::WorkflowProbe;
use crate::metrics::Metrics;
use crate::middleware::EndpointRateLimiter;
use crate::thumbs::ThumbCache;
use crate::types::{PanelConfig, Root};

/// The shared application state.
///
/// Cheap to clone; every handler gets its own copy through axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
    /// Stricter per-endpoint limits on top of the global limiter.
    pub rate_limiter: EndpointRateLimiter,
    /// Hidden markers; all writes go through its lock.
    pub hidden: Arc<HiddenStore>,
    pub probe: Arc<WorkflowProbe>,
    pub thumbs: ThumbCache,
    pub i18n: Arc<Catalog>,
}

impl AppState {
    /// Creates a new `AppState` from a validated configuration.
    ///
    /// Endpoint limits:
    /// - 30 delete requests per minute
    /// - 6 thumbnail-cache clears per minute
    pub fn new(config: AppConfig) -> Self {
        let rate_limiter = EndpointRateLimiter::new().with_limits(vec![
            ("delete", 30, 60),     // 30 delete batches per minute
            ("thumb_clear", 6, 60), // 6 cache wipes per minute
        ]);

        let storage = &config.storage;
        let hidden = Arc::new(HiddenStore::new(storage.hidden_index_path()));
        let thumbs = ThumbCache::new(storage.thumb_cache_dir(), config.limits.thumb_slots());
        let probe = Arc::new(WorkflowProbe::new(config.limits.workflow_cache_size));
        let i18n = Arc::new(Catalog::new(storage.locales_dir.clone()));

        Self { config: Arc::new(config), metrics: Metrics::new(), rate_limiter, hidden, probe, thumbs, i18n }
    }

    pub fn root_dir(&self, root: Root) -> &Path {
        match root {
            Root::Output => &self.config.storage.output_dir,
            Root::Input => &self.config.storage.input_dir,
        }
    }

    /// Server defaults with the user's `config.json` on top. Read per request
    /// so edits apply without a restart.
    pub async fn panel_config(&self) -> PanelConfig {
        let defaults = self.config.panel.to_panel_config();
        config::panel::load(&self.config.storage.panel_config_path(), &defaults).await
    }
}
