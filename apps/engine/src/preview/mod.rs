//! Structure preview: heuristic parse of a pasted résumé, optionally enriched by an AI
//! extractor, memoized per CV/job pair.

pub mod builder;
pub mod cache;
pub mod extraction;
pub mod handlers;
pub mod prompts;

pub use builder::{build_structure_preview, PreviewSource, StructurePreview};
pub use cache::{PreviewCache, DEFAULT_PREVIEW_TTL};
pub use extraction::{CvExtractor, HeuristicOnly, LlmCvExtractor};
