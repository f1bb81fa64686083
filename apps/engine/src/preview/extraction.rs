//! Extractor seam — the optional AI path of the structure preview.
//!
//! Both capabilities are fallible. Callers merge whatever comes back into the heuristic
//! parse and never depend on it: `HeuristicOnly` is a valid extractor.
//!
//! `AppState` holds an `Arc<dyn CvExtractor>`, chosen at startup from config.

use async_trait::async_trait;
use serde::Deserialize;

use crate::cv::models::StructuredCv;
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::preview::prompts::{STRUCTURE_PROMPT_TEMPLATE, SUMMARY_PROMPT_TEMPLATE};

/// Characters of résumé and job text sent to the model.
const PROMPT_CV_CHARS: usize = 12_000;
const PROMPT_JOB_CHARS: usize = 6_000;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait CvExtractor: Send + Sync {
    /// A full structured extraction, or `None` when this backend does not offer one.
    async fn extract_structured(
        &self,
        cv_text: &str,
        job_text: &str,
    ) -> Result<Option<StructuredCv>, LlmError>;

    /// One summary per experience, most recent first. Empty when unavailable.
    async fn summarize_experiences(
        &self,
        cv_text: &str,
        job_text: &str,
    ) -> Result<Vec<String>, LlmError>;

    /// Short name for logs and provenance.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicOnly
// ────────────────────────────────────────────────────────────────────────────

/// Used when no API key is configured.
pub struct HeuristicOnly;

#[async_trait]
impl CvExtractor for HeuristicOnly {
    async fn extract_structured(&self, _: &str, _: &str) -> Result<Option<StructuredCv>, LlmError> {
        Ok(None)
    }

    async fn summarize_experiences(&self, _: &str, _: &str) -> Result<Vec<String>, LlmError> {
        Ok(Vec::new())
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmCvExtractor
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmCvExtractor {
    llm: LlmClient,
}

#[derive(Debug, Deserialize)]
struct SummariesReply {
    #[serde(default)]
    summaries: Vec<String>,
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn build_prompt(template: &str, cv_text: &str, job_text: &str) -> String {
    template
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{job_text}", &truncate_chars(job_text, PROMPT_JOB_CHARS))
        .replace("{cv_text}", &truncate_chars(cv_text, PROMPT_CV_CHARS))
}

impl LlmCvExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CvExtractor for LlmCvExtractor {
    async fn extract_structured(
        &self,
        cv_text: &str,
        job_text: &str,
    ) -> Result<Option<StructuredCv>, LlmError> {
        let prompt = build_prompt(STRUCTURE_PROMPT_TEMPLATE, cv_text, job_text);
        let structured: StructuredCv = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        Ok(Some(structured))
    }

    async fn summarize_experiences(
        &self,
        cv_text: &str,
        job_text: &str,
    ) -> Result<Vec<String>, LlmError> {
        let prompt = build_prompt(SUMMARY_PROMPT_TEMPLATE, cv_text, job_text);
        let reply: SummariesReply = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        Ok(reply
            .summaries
            .into_iter()
            .map(|s| s.trim().to_string())
            .collect())
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}
