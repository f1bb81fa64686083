//! Style Resolver — numeric style parameters for a (metadata, variant) pair.

use serde::{Deserialize, Serialize};

use crate::layout::detector::{LayoutMetadata, SpacingProfile, SpacingRhythm};
use crate::layout::variant::TemplateVariant;

const FONT_STACK: &str = r#""Inter", "Helvetica Neue", Helvetica, "Segoe UI", Arial, sans-serif"#;
const DEFAULT_SIDEBAR_RATIO: f32 = 0.31;
const MIN_SECTION_GAP: f32 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub font_family: String,
    /// px
    pub base_font_size: f32,
    pub line_height: f32,
    pub section_gap: f32,
    pub block_gap: f32,
    pub page_padding_mm: f32,
    pub header_name_size: f32,
    pub section_title_size: f32,
    pub primary_color: String,
    pub accent_color: String,
    /// Zero unless the layout has two columns.
    pub sidebar_ratio: f32,
}

fn by_profile(profile: SpacingProfile, compact: f32, balanced: f32, airy: f32) -> f32 {
    match profile {
        SpacingProfile::Compact => compact,
        SpacingProfile::Balanced => balanced,
        SpacingProfile::Airy => airy,
    }
}

pub fn resolve_style_config(metadata: &LayoutMetadata, variant: TemplateVariant) -> StyleConfig {
    let profile = metadata.spacing_profile;
    let minimal = variant == TemplateVariant::MinimalCompact;

    let sidebar_ratio = if metadata.column_count == 2 {
        if metadata.sidebar_width_ratio > 0.0 {
            metadata.sidebar_width_ratio
        } else {
            DEFAULT_SIDEBAR_RATIO
        }
    } else {
        0.0
    };

    StyleConfig {
        font_family: FONT_STACK.to_string(),
        base_font_size: by_profile(profile, 10.5, 10.8, 11.0),
        line_height: by_profile(profile, 1.22, 1.28, 1.33),
        section_gap: by_profile(profile, 7.0, 8.0, 10.0),
        block_gap: by_profile(profile, 5.0, 6.0, 8.0),
        page_padding_mm: by_profile(profile, 8.0, 9.0, 9.0),
        header_name_size: if minimal { 22.0 } else { 24.0 },
        section_title_size: if minimal { 12.0 } else { 13.0 },
        primary_color: metadata.primary_color.clone(),
        accent_color: metadata.accent_color.clone(),
        sidebar_ratio,
    }
}

/// Section gap after the detected rhythm: tight pulls it in (never under 6px), relaxed pushes it out.
pub fn rhythm_section_gap(style: &StyleConfig, rhythm: SpacingRhythm) -> f32 {
    match rhythm {
        SpacingRhythm::Tight => (style.section_gap - 1.0).max(MIN_SECTION_GAP),
        SpacingRhythm::Relaxed => style.section_gap + 1.0,
        SpacingRhythm::Regular => style.section_gap,
    }
}
