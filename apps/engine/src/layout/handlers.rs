use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::{
    map_layout_to_variant, resolve_style_config, LayoutMetadata, StyleConfig, TemplateChoice,
    TemplateVariant,
};
use crate::routes::ensure_text_limit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub original_text: String,
    #[serde(default)]
    pub template: Option<TemplateChoice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub metadata: LayoutMetadata,
    pub variant: TemplateVariant,
    pub style: StyleConfig,
}

/// POST /api/v1/cv/layout
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    ensure_text_limit("originalText", &req.original_text)?;

    let cache = state.layout_cache.clone();
    let metadata = tokio::task::spawn_blocking(move || {
        cache.get_or_detect(&req.original_text, req.template)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Layout detection task failed: {e}")))?;

    let variant = map_layout_to_variant(&metadata);
    let style = resolve_style_config(&metadata, variant);
    Ok(Json(LayoutResponse {
        metadata,
        variant,
        style,
    }))
}
