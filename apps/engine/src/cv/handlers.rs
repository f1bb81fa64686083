use axum::Json;
use serde::{Deserialize, Serialize};

use crate::cv::dates::detect_date_overlaps;
use crate::cv::hybrid::{create_empty_hybrid_cv_form, sanitize_hybrid_cv_form, HybridCvForm};
use crate::cv::validation::{
    compute_hybrid_confidence, hybrid_validation_issues, suggested_improvements, HybridConfidence,
};
use crate::errors::AppError;
use crate::routes::ensure_form_limit;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub hybrid_form: HybridCvForm,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub issues: Vec<String>,
    pub confidence: HybridConfidence,
    pub overlap_warnings: Vec<String>,
    pub suggested_improvements: Vec<String>,
    /// True when the golden rule holds and the form can be rendered.
    pub ready: bool,
}

pub fn validate_form(form: &HybridCvForm) -> ValidateResponse {
    let form = sanitize_hybrid_cv_form(form);
    let issues = hybrid_validation_issues(&form);
    let confidence = compute_hybrid_confidence(&form);
    let overlap_warnings = detect_date_overlaps(&form.experience);
    ValidateResponse {
        ready: issues.is_empty(),
        suggested_improvements: suggested_improvements(&confidence, &overlap_warnings),
        issues,
        confidence,
        overlap_warnings,
    }
}

/// POST /api/v1/cv/validate
pub async fn handle_validate(
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    ensure_form_limit(&req.hybrid_form)?;
    Ok(Json(validate_form(&req.hybrid_form)))
}

/// GET /api/v1/cv/empty-form
pub async fn handle_empty_form() -> Json<HybridCvForm> {
    Json(create_empty_hybrid_cv_form())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::hybrid::HybridExperience;

    #[test]
    fn test_empty_form_is_not_ready() {
        let response = validate_form(&create_empty_hybrid_cv_form());
        assert!(!response.ready);
        assert_eq!(response.issues[0], "Nom complet manquant.");
        assert!(response.overlap_warnings.is_empty());
    }

    #[test]
    fn test_overlaps_feed_suggestions() {
        let job = |title: &str, start: &str, end: &str| HybridExperience {
            job_title: title.into(),
            company: "Acme".into(),
            start_date: start.into(),
            end_date: end.into(),
            ..Default::default()
        };
        let form = HybridCvForm {
            experience: vec![job("Engineer", "2018", "2021"), job("Lead", "2020", "2022")],
            ..Default::default()
        };
        let response = validate_form(&form);
        assert_eq!(response.overlap_warnings.len(), 1);
        assert!(response
            .suggested_improvements
            .iter()
            .any(|hint| hint.contains("chevauchements")));
    }
}
