//! Structure preview — heuristic parse, optional AI enrichment, validation readouts.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cv::dates::detect_date_overlaps;
use crate::cv::hybrid::{
    apply_experience_summaries, map_hybrid_to_structured, map_structured_to_hybrid, HybridCvForm,
};
use crate::cv::models::StructuredCv;
use crate::cv::sanitize::merge_with_fallback;
use crate::cv::validation::{compute_hybrid_confidence, suggested_improvements, HybridConfidence};
use crate::parsing::parse_structured_cv_from_text;
use crate::preview::cache::{preview_cache_key, PreviewCache};
use crate::preview::extraction::CvExtractor;

/// Where the previewed content came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewSource {
    #[default]
    Heuristic,
    /// AI structured extraction merged into the heuristic parse.
    Hybrid,
    /// AI experience summaries applied.
    HybridSummaries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructurePreview {
    pub hybrid_form: HybridCvForm,
    pub structured_cv: StructuredCv,
    pub source: PreviewSource,
    pub confidence: HybridConfidence,
    pub overlap_warnings: Vec<String>,
    pub suggested_improvements: Vec<String>,
    pub experience_summaries: Vec<String>,
    pub cache_hit: bool,
}

/// Builds (or replays from cache) the structure preview for one CV/job pair.
///
/// AI failures are logged and dropped; the heuristic parse always stands on its own.
pub async fn build_structure_preview(
    cv_text: &str,
    job_text: &str,
    extractor: &dyn CvExtractor,
    cache: &PreviewCache,
) -> StructurePreview {
    let key = preview_cache_key(cv_text, job_text);
    if let Some(mut cached) = cache.get(&key) {
        cached.cache_hit = true;
        return cached;
    }

    let heuristic = parse_structured_cv_from_text(cv_text);

    let (structured, summaries) = tokio::join!(
        extractor.extract_structured(cv_text, job_text),
        extractor.summarize_experiences(cv_text, job_text)
    );

    let ai_structured = structured.unwrap_or_else(|e| {
        warn!(backend = extractor.backend(), "Structured extraction failed, using heuristic parse: {e}");
        None
    });
    let summaries: Vec<String> = summaries
        .unwrap_or_else(|e| {
            warn!(backend = extractor.backend(), "Experience summaries failed: {e}");
            Vec::new()
        })
        .into_iter()
        .filter(|summary| !summary.trim().is_empty())
        .collect();

    let merged = merge_with_fallback(&heuristic, ai_structured.as_ref());
    let hybrid_form = apply_experience_summaries(&map_structured_to_hybrid(&merged), &summaries);

    let source = if !summaries.is_empty() {
        PreviewSource::HybridSummaries
    } else if ai_structured.is_some() {
        PreviewSource::Hybrid
    } else {
        PreviewSource::Heuristic
    };

    let confidence = compute_hybrid_confidence(&hybrid_form);
    let overlap_warnings = detect_date_overlaps(&hybrid_form.experience);
    let preview = StructurePreview {
        structured_cv: map_hybrid_to_structured(&hybrid_form),
        suggested_improvements: suggested_improvements(&confidence, &overlap_warnings),
        hybrid_form,
        source,
        confidence,
        overlap_warnings,
        experience_summaries: summaries,
        cache_hit: false,
    };

    info!(
        source = ?preview.source,
        experiences = preview.hybrid_form.experience.len(),
        global_confidence = preview.confidence.global,
        "Built structure preview"
    );

    cache.insert(key, preview.clone());
    preview
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cv::models::{Contact, Experience};
    use crate::llm_client::LlmError;
    use crate::preview::extraction::HeuristicOnly;

    const CV: &str = "John Doe\njohn@doe.com\n+33 6 12 34 56 78\nExperience\nSenior Engineer — Acme Corp\n2020 - Present\n- Shipped X\nEducation\nMSc CS — MIT";

    struct MockExtractor {
        structured: Option<StructuredCv>,
        summaries: Vec<String>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockExtractor {
        fn new(structured: Option<StructuredCv>, summaries: Vec<String>) -> Self {
            Self {
                structured,
                summaries,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CvExtractor for MockExtractor {
        async fn extract_structured(&self, _: &str, _: &str) -> Result<Option<StructuredCv>, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::EmptyContent);
            }
            Ok(self.structured.clone())
        }

        async fn summarize_experiences(&self, _: &str, _: &str) -> Result<Vec<String>, LlmError> {
            if self.fail {
                return Err(LlmError::RateLimited { retries: 3 });
            }
            Ok(self.summaries.clone())
        }

        fn backend(&self) -> &'static str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_heuristic_preview() {
        let cache = PreviewCache::default();
        let preview = build_structure_preview(CV, "Rust job", &HeuristicOnly, &cache).await;
        assert_eq!(preview.source, PreviewSource::Heuristic);
        assert!(!preview.cache_hit);
        assert_eq!(preview.hybrid_form.personal_info.full_name, "John Doe");
        assert_eq!(preview.hybrid_form.experience[0].job_title, "Senior Engineer");
        assert!(preview.hybrid_form.experience[0].is_current);
        assert_eq!(preview.structured_cv.experiences[0].date, "2020 - Present");
    }

    #[tokio::test]
    async fn test_summaries_are_applied_and_cached() {
        let cache = PreviewCache::default();
        let extractor = MockExtractor::new(None, vec!["Led the platform team.".into()]);

        let first = build_structure_preview(CV, "job", &extractor, &cache).await;
        assert_eq!(first.source, PreviewSource::HybridSummaries);
        assert_eq!(
            first.hybrid_form.experience[0].achievements,
            vec!["Led the platform team.", "Shipped X"]
        );

        let second = build_structure_preview(CV, "job", &extractor, &cache).await;
        assert!(second.cache_hit);
        assert_eq!(second.hybrid_form, first.hybrid_form);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ai_extraction_is_merged() {
        let ai = StructuredCv {
            contact: Contact {
                city: "Paris".into(),
                ..Default::default()
            },
            experiences: vec![Experience {
                title: "Staff Engineer".into(),
                company: "Acme Corp".into(),
                date: "2020 - Present".into(),
                location: None,
                bullets: vec!["Scaled the platform".into()],
            }],
            ..Default::default()
        };
        let cache = PreviewCache::default();
        let extractor = MockExtractor::new(Some(ai), Vec::new());
        let preview = build_structure_preview(CV, "job", &extractor, &cache).await;

        assert_eq!(preview.source, PreviewSource::Hybrid);
        assert_eq!(preview.hybrid_form.personal_info.city, "Paris");
        assert_eq!(preview.hybrid_form.personal_info.email, "john@doe.com");
        assert_eq!(preview.hybrid_form.experience[0].job_title, "Staff Engineer");
    }

    #[tokio::test]
    async fn test_extractor_failure_falls_back_to_heuristic() {
        let cache = PreviewCache::default();
        let mut extractor = MockExtractor::new(None, vec!["ignored".into()]);
        extractor.fail = true;
        let preview = build_structure_preview(CV, "job", &extractor, &cache).await;
        assert_eq!(preview.source, PreviewSource::Heuristic);
        assert!(preview.experience_summaries.is_empty());
        assert_eq!(preview.hybrid_form.experience[0].achievements, vec!["Shipped X"]);
    }

    #[test]
    fn test_source_wire_names() {
        assert_eq!(
            serde_json::to_value(PreviewSource::HybridSummaries).unwrap(),
            "hybrid-summaries"
        );
    }
}
