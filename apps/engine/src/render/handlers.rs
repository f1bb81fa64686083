use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::cv::hybrid::{map_hybrid_to_structured, sanitize_hybrid_cv_form, HybridCvForm};
use crate::cv::validation::hybrid_validation_issues;
use crate::errors::AppError;
use crate::layout::TemplateChoice;
use crate::render::{
    build_resume_document, build_resume_document_from_text, RenderOptions, RenderedResume,
};
use crate::routes::{ensure_form_limit, ensure_text_limit};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub hybrid_form: HybridCvForm,
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub template: Option<TemplateChoice>,
    #[serde(default)]
    pub match_score: Option<u8>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTextRequest {
    pub original_text: String,
    pub rewritten_text: String,
    #[serde(default)]
    pub template: Option<TemplateChoice>,
    #[serde(default)]
    pub match_score: Option<u8>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::Internal(anyhow::anyhow!("Render task failed: {e}"))
}

/// POST /api/v1/cv/render
///
/// Refuses with 422 and the first golden-rule issue when the form is incomplete.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderedResume>, AppError> {
    ensure_text_limit("originalText", &req.original_text)?;
    ensure_form_limit(&req.hybrid_form)?;

    let form = sanitize_hybrid_cv_form(&req.hybrid_form);
    if let Some(issue) = hybrid_validation_issues(&form).into_iter().next() {
        return Err(AppError::UnprocessableEntity(issue));
    }

    let structured = map_hybrid_to_structured(&form);
    let options = RenderOptions {
        template: req.template.unwrap_or_default(),
        match_score: req.match_score,
        keywords: req.keywords,
    };
    let cache = state.layout_cache.clone();
    let tuning = state.fit_tuning;
    let original_text = req.original_text;

    let rendered = tokio::task::spawn_blocking(move || {
        build_resume_document(&structured, &original_text, &options, &cache, &tuning)
    })
    .await
    .map_err(join_error)?;

    info!(variant = %rendered.variant, density = ?rendered.density, "Rendered resume");
    Ok(Json(rendered))
}

/// POST /api/v1/cv/render-text
pub async fn handle_render_text(
    State(state): State<AppState>,
    Json(req): Json<RenderTextRequest>,
) -> Result<Json<RenderedResume>, AppError> {
    ensure_text_limit("originalText", &req.original_text)?;
    ensure_text_limit("rewrittenText", &req.rewritten_text)?;
    if req.rewritten_text.trim().is_empty() {
        return Err(AppError::Validation("rewrittenText must not be empty".to_string()));
    }

    let options = RenderOptions {
        template: req.template.unwrap_or_default(),
        match_score: req.match_score,
        keywords: req.keywords,
    };
    let cache = state.layout_cache.clone();
    let tuning = state.fit_tuning;

    let rendered = tokio::task::spawn_blocking(move || {
        build_resume_document_from_text(
            &req.original_text,
            &req.rewritten_text,
            &options,
            &cache,
            &tuning,
        )
    })
    .await
    .map_err(join_error)?;

    info!(variant = %rendered.variant, density = ?rendered.density, "Rendered resume from text");
    Ok(Json(rendered))
}
