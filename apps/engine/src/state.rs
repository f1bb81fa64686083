use std::sync::Arc;

use crate::config::Config;
use crate::layout::{FitTuning, LayoutCache};
use crate::preview::{CvExtractor, PreviewCache};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Caches are owned here and passed into the core explicitly; the core holds no globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `LlmCvExtractor` when an API key is configured, `HeuristicOnly` otherwise.
    pub extractor: Arc<dyn CvExtractor>,
    pub layout_cache: Arc<LayoutCache>,
    pub preview_cache: Arc<PreviewCache>,
    pub fit_tuning: FitTuning,
}

impl AppState {
    pub fn new(config: Config, extractor: Arc<dyn CvExtractor>) -> Self {
        Self {
            layout_cache: Arc::new(LayoutCache::new(config.layout_cache_capacity)),
            preview_cache: Arc::new(PreviewCache::new(config.preview_cache_ttl)),
            fit_tuning: config.fit_tuning,
            extractor,
            config,
        }
    }
}
