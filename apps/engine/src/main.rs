use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_engine::config::Config;
use cv_engine::llm_client::LlmClient;
use cv_engine::preview::{CvExtractor, HeuristicOnly, LlmCvExtractor};
use cv_engine::routes::build_router;
use cv_engine::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cv_engine={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV engine v{}", env!("CARGO_PKG_VERSION"));

    let extractor: Arc<dyn CvExtractor> = match &config.openai_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.openai_model.clone())
                .context("Failed to build LLM HTTP client")?;
            info!("LLM extractor enabled (model: {})", llm.model());
            Arc::new(LlmCvExtractor::new(llm))
        }
        None => {
            info!("OPENAI_API_KEY not set, structure previews are heuristic-only");
            Arc::new(HeuristicOnly)
        }
    };

    info!(
        layout_cache_capacity = config.layout_cache_capacity,
        preview_ttl_secs = config.preview_cache_ttl.as_secs(),
        chars_per_unit = config.fit_tuning.chars_per_unit,
        "Caches and page-fit tuning configured"
    );

    let state = AppState::new(config.clone(), extractor);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
