// Layout inference and one-page fitting.
// Detection, variant mapping and style resolution are pure; the page-fit loop is CPU-bound
// and runs inside tokio::task::spawn_blocking when driven from a handler.

pub mod cache;
pub mod detector;
pub mod handlers;
pub mod page_fit;
pub mod style;
pub mod template;
pub mod variant;

// Re-export the public API consumed by the renderer and the handlers.
pub use cache::LayoutCache;
pub use detector::{detect_layout_metadata, LayoutMetadata};
pub use page_fit::{fit_sections, fit_sections_for_template, DensityClass, FitTuning, FittedSections};
pub use style::{resolve_style_config, StyleConfig};
pub use template::TemplateChoice;
pub use variant::{map_layout_to_variant, TemplateVariant};
