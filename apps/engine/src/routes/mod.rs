pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cv::handlers as cv_handlers;
use crate::cv::hybrid::HybridCvForm;
use crate::errors::AppError;
use crate::layout::handlers as layout_handlers;
use crate::preview::handlers as preview_handlers;
use crate::render::handlers as render_handlers;
use crate::state::AppState;

/// Upper bound on any free-text field accepted at the boundary.
pub const MAX_INPUT_CHARS: usize = 20_000;

pub fn ensure_text_limit(field: &str, text: &str) -> Result<(), AppError> {
    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(AppError::Validation(format!(
            "{field} exceeds {MAX_INPUT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Applies [`MAX_INPUT_CHARS`] to a hybrid form as a whole.
pub fn ensure_form_limit(form: &HybridCvForm) -> Result<(), AppError> {
    if form.text_chars() > MAX_INPUT_CHARS {
        return Err(AppError::Validation(format!(
            "hybridForm exceeds {MAX_INPUT_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Structuring
        .route(
            "/api/v1/cv/structure-preview",
            post(preview_handlers::handle_structure_preview),
        )
        .route("/api/v1/cv/validate", post(cv_handlers::handle_validate))
        .route("/api/v1/cv/empty-form", get(cv_handlers::handle_empty_form))
        // Layout & rendering
        .route("/api/v1/cv/layout", post(layout_handlers::handle_layout))
        .route("/api/v1/cv/render", post(render_handlers::handle_render))
        .route(
            "/api/v1/cv/render-text",
            post(render_handlers::handle_render_text),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::layout::FitTuning;
    use crate::preview::HeuristicOnly;

    fn test_router() -> Router {
        let config = Config {
            port: 0,
            rust_log: "debug".into(),
            openai_api_key: None,
            openai_model: "test".into(),
            layout_cache_capacity: 8,
            preview_cache_ttl: Duration::from_secs(60),
            fit_tuning: FitTuning::default(),
        };
        build_router(AppState::new(config, Arc::new(HeuristicOnly)))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn ready_form() -> Value {
        json!({
            "personalInfo": { "fullName": "Jane Roe", "email": "jane@roe.io", "phone": "+33 6 12 34 56 78" },
            "experience": [{
                "jobTitle": "Engineer",
                "company": "Acme",
                "location": "Paris",
                "startDate": "2019",
                "isCurrent": true,
                "achievements": ["Built the billing pipeline"]
            }],
            "education": [{ "degree": "MSc Computer Science", "institution": "MIT" }],
            "hardSkills": ["Rust", "Go"]
        })
    }

    // ── limits ──

    #[test]
    fn test_ensure_text_limit() {
        assert!(ensure_text_limit("cvText", &"a".repeat(MAX_INPUT_CHARS)).is_ok());
        let err = ensure_text_limit("cvText", &"a".repeat(MAX_INPUT_CHARS + 1)).unwrap_err();
        assert!(err.to_string().contains("cvText"));
    }

    #[tokio::test]
    async fn test_oversized_form_is_rejected() {
        let mut form = ready_form();
        form["summary"] = json!("a".repeat(MAX_INPUT_CHARS));
        for uri in ["/api/v1/cv/render", "/api/v1/cv/validate"] {
            let (status, body) = post_json(uri, json!({ "hybridForm": form })).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"]["message"].as_str().unwrap().contains("hybridForm"));
        }
    }

    // ── routes ──

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_structure_preview_route() {
        let (status, body) = post_json(
            "/api/v1/cv/structure-preview",
            json!({
                "cvText": "John Doe\njohn@doe.com\nExperience\nSenior Engineer — Acme Corp\n2020 - Present\n- Shipped X",
                "jobText": "Backend engineer"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "heuristic");
        assert_eq!(body["cacheHit"], false);
        assert_eq!(body["hybridForm"]["personalInfo"]["fullName"], "John Doe");
    }

    #[tokio::test]
    async fn test_structure_preview_requires_cv_text() {
        let (status, body) =
            post_json("/api/v1/cv/structure-preview", json!({ "cvText": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_oversized_input_is_rejected() {
        let (status, _) = post_json(
            "/api/v1/cv/layout",
            json!({ "originalText": "a".repeat(MAX_INPUT_CHARS + 1) }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_route() {
        let (status, body) = post_json("/api/v1/cv/validate", json!({ "hybridForm": {} })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], false);
        assert!(!body["issues"].as_array().unwrap().is_empty());

        let (_, body) = post_json("/api/v1/cv/validate", json!({ "hybridForm": ready_form() })).await;
        assert_eq!(body["ready"], true);
    }

    #[tokio::test]
    async fn test_layout_route() {
        let (status, body) = post_json(
            "/api/v1/cv/layout",
            json!({ "originalText": "Jane Roe\nEXPERIENCE\nAcme, 2019.", "template": "Minimal ATS" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["hierarchyStyle"], "minimal");
        assert!(body["variant"].is_string());
    }

    #[tokio::test]
    async fn test_render_gates_on_golden_rule() {
        let (status, body) = post_json("/api/v1/cv/render", json!({ "hybridForm": {} })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_render_route() {
        let (status, body) = post_json(
            "/api/v1/cv/render",
            json!({ "hybridForm": ready_form(), "originalText": "Jane Roe\nEXPERIENCE\nAcme, 2019." }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = body["html"].as_str().unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("Jane Roe"));
    }
}
