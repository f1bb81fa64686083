use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::preview::builder::{build_structure_preview, StructurePreview};
use crate::routes::ensure_text_limit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructurePreviewRequest {
    pub cv_text: String,
    #[serde(default)]
    pub job_text: String,
}

/// POST /api/v1/cv/structure-preview
pub async fn handle_structure_preview(
    State(state): State<AppState>,
    Json(req): Json<StructurePreviewRequest>,
) -> Result<Json<StructurePreview>, AppError> {
    if req.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cvText is required".to_string()));
    }
    ensure_text_limit("cvText", &req.cv_text)?;
    ensure_text_limit("jobText", &req.job_text)?;

    let preview = build_structure_preview(
        &req.cv_text,
        &req.job_text,
        state.extractor.as_ref(),
        &state.preview_cache,
    )
    .await;
    Ok(Json(preview))
}
