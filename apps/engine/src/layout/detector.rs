//! Layout Metadata Detector — infers the visual signature of a résumé from its original text.
//!
//! Everything here looks at the *shape* of the text (blank lines, short lines, heading
//! casing, marker words), never at what the candidate did. The result is a pure function of
//! `(text, requested template)`; [`crate::layout::cache::LayoutCache`] memoizes it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::layout::template::TemplateChoice;
use crate::parsing::normalize::{
    clean_line, heading_text, is_bullet, is_heading, LAYOUT_HEADING_MAX_LEN,
};
use crate::parsing::sections::normalize_heading;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    SingleColumn,
    TwoColumnLeft,
    TwoColumnRight,
    /// Never inferred from text; only reachable through caller-supplied metadata.
    MultiBlockAsymmetric,
}

impl LayoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::SingleColumn => "single-column",
            LayoutType::TwoColumnLeft => "two-column-left",
            LayoutType::TwoColumnRight => "two-column-right",
            LayoutType::MultiBlockAsymmetric => "multi-block-asymmetric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarPosition {
    Left,
    Right,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingProfile {
    Compact,
    Balanced,
    Airy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingRhythm {
    Tight,
    Regular,
    Relaxed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyStyle {
    Minimal,
    Classic,
    Executive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingCapitalization {
    Uppercase,
    Titlecase,
    Mixed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualElementsDetected {
    pub separators: bool,
    pub background_blocks: bool,
    pub date_alignment: bool,
    pub icon_like_bullets: bool,
    pub contact_header: bool,
}

/// Content-independent layout signature of one résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub layout_type: LayoutType,
    pub column_count: u8,
    pub sidebar_position: SidebarPosition,
    /// In `[0, 1)`; zero for single-column layouts.
    pub sidebar_width_ratio: f32,
    pub primary_color: String,
    pub accent_color: String,
    pub spacing_profile: SpacingProfile,
    pub density_profile: SpacingProfile,
    pub spacing_rhythm: SpacingRhythm,
    pub hierarchy_style: HierarchyStyle,
    pub heading_capitalization: HeadingCapitalization,
    pub section_order: Vec<String>,
    pub visual_elements_detected: VisualElementsDetected,
}

// ────────────────────────────────────────────────────────────────────────────
// Tunables
// ────────────────────────────────────────────────────────────────────────────

const SIDEBAR_MARKERS: &[&str] = &[
    "skills",
    "compétences",
    "languages",
    "langues",
    "certifications",
    "interests",
    "outils",
    "stack",
];

const SECTION_MARKERS: &[&str] = &[
    "experience",
    "expérience",
    "education",
    "formation",
    "projects",
    "projets",
    "summary",
    "profil",
];

const MIN_SIDEBAR_HITS: usize = 2;
const MIN_SECTION_HITS: usize = 3;
const SHORT_LINE_LEN: usize = 28;
const SHORT_LINE_RATIO: f32 = 0.22;
const DEFAULT_SIDEBAR_RATIO: f32 = 0.31;

const AIRY_BLANK_RATIO: f32 = 0.22;
const COMPACT_BLANK_RATIO: f32 = 0.10;
const TIGHT_RUN_LEN: f32 = 1.1;
const RELAXED_RUN_LEN: f32 = 1.8;

const UPPERCASE_SHARE: f32 = 0.55;
const TITLECASE_SHARE: f32 = 0.45;
const CLASSIC_UPPER_HEADINGS: usize = 3;
const MAX_SECTION_ORDER: usize = 14;

static LEFT_BIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"skills|compétences|langues|languages").unwrap());
static SEPARATOR_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_=]{3,}").unwrap());
static ALIGNED_DATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:19|20)\d{2}\s*[-–]\s*(?:(?:19|20)\d{2}|present|current|aujourd'hui)").unwrap()
});
static ICON_BULLETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•▪◦]").unwrap());
static CONTACT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@|linkedin|github|\+\d|\bfrance\b|\bremote\b").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Detection
// ────────────────────────────────────────────────────────────────────────────

fn blank_ratio(lines: &[&str]) -> f32 {
    let blanks = lines.iter().filter(|line| line.trim().is_empty()).count();
    blanks as f32 / lines.len().max(1) as f32
}

fn detect_spacing_profile(lines: &[&str]) -> SpacingProfile {
    let ratio = blank_ratio(lines);
    if ratio > AIRY_BLANK_RATIO {
        SpacingProfile::Airy
    } else if ratio < COMPACT_BLANK_RATIO {
        SpacingProfile::Compact
    } else {
        SpacingProfile::Balanced
    }
}

/// Average length of consecutive blank-line runs. No blank lines at all reads as tight.
fn detect_spacing_rhythm(lines: &[&str]) -> SpacingRhythm {
    let mut runs = Vec::new();
    let mut run = 0usize;
    for line in lines {
        if line.trim().is_empty() {
            run += 1;
        } else if run > 0 {
            runs.push(run);
            run = 0;
        }
    }
    if run > 0 {
        runs.push(run);
    }

    let average = if runs.is_empty() {
        0.0
    } else {
        runs.iter().sum::<usize>() as f32 / runs.len() as f32
    };

    if average <= TIGHT_RUN_LEN {
        SpacingRhythm::Tight
    } else if average >= RELAXED_RUN_LEN {
        SpacingRhythm::Relaxed
    } else {
        SpacingRhythm::Regular
    }
}

/// Cleaned, non-bullet lines that read as headings under the layout length ceiling.
fn heading_candidates(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|line| clean_line(line))
        .filter(|line| !line.is_empty() && !is_bullet(line))
        .filter(|line| is_heading(line, LAYOUT_HEADING_MAX_LEN))
        .map(|line| heading_text(&line).to_string())
        .collect()
}

fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

/// "Work Experience": at least two words, each one capital followed by lowercase letters.
fn is_strict_title_case(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.len() >= 2
        && words.iter().all(|word| {
            let mut chars = word.chars();
            chars.next().is_some_and(char::is_uppercase)
                && chars.clone().next().is_some()
                && chars.all(char::is_lowercase)
        })
}

fn detect_heading_capitalization(candidates: &[String]) -> HeadingCapitalization {
    if candidates.is_empty() {
        return HeadingCapitalization::Mixed;
    }
    let total = candidates.len() as f32;
    let upper = candidates.iter().filter(|c| is_all_caps(c)).count() as f32;
    if upper / total >= UPPERCASE_SHARE {
        return HeadingCapitalization::Uppercase;
    }
    let title = candidates.iter().filter(|c| is_strict_title_case(c)).count() as f32;
    if title / total >= TITLECASE_SHARE {
        return HeadingCapitalization::Titlecase;
    }
    HeadingCapitalization::Mixed
}

fn detect_section_order(candidates: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for candidate in candidates {
        let heading = normalize_heading(candidate);
        if !order.contains(&heading) {
            order.push(heading);
        }
        if order.len() == MAX_SECTION_ORDER {
            break;
        }
    }
    order
}

/// An explicit template wins; otherwise three or more ALL-CAPS lines read as classic.
/// Only lines with a line break on both sides count, so an uppercase name on the first
/// line is not taken for a heading.
fn detect_hierarchy_style(lines: &[&str], template: Option<TemplateChoice>) -> HierarchyStyle {
    match template {
        Some(TemplateChoice::ModernExecutive) => return HierarchyStyle::Executive,
        Some(TemplateChoice::MinimalAts) => return HierarchyStyle::Minimal,
        _ => {}
    }
    let interior = match lines.len() {
        0..=2 => &[][..],
        len => &lines[1..len - 1],
    };
    let upper_lines = interior
        .iter()
        .map(|line| line.trim())
        .filter(|line| {
            line.chars().count() >= 4
                && line.chars().any(|c| c.is_ascii_uppercase())
                && line.chars().all(|c| c.is_ascii_uppercase() || c == ' ')
        })
        .count();
    if upper_lines >= CLASSIC_UPPER_HEADINGS {
        HierarchyStyle::Classic
    } else {
        HierarchyStyle::Executive
    }
}

struct ColumnInference {
    layout_type: LayoutType,
    column_count: u8,
    sidebar_position: SidebarPosition,
    sidebar_width_ratio: f32,
}

/// Two columns only when sidebar markers, section markers and short lines all agree.
fn detect_columns(text: &str, lines: &[&str]) -> ColumnInference {
    let lower = text.to_lowercase();
    let sidebar_hits = SIDEBAR_MARKERS.iter().filter(|m| lower.contains(*m)).count();
    let section_hits = SECTION_MARKERS.iter().filter(|m| lower.contains(*m)).count();

    let short_lines = lines
        .iter()
        .map(|line| line.trim().chars().count())
        .filter(|len| *len > 0 && *len < SHORT_LINE_LEN)
        .count();
    let short_ratio = short_lines as f32 / lines.len().max(1) as f32;

    let two_columns = sidebar_hits >= MIN_SIDEBAR_HITS
        && section_hits >= MIN_SECTION_HITS
        && short_ratio > SHORT_LINE_RATIO;

    if !two_columns {
        return ColumnInference {
            layout_type: LayoutType::SingleColumn,
            column_count: 1,
            sidebar_position: SidebarPosition::None,
            sidebar_width_ratio: 0.0,
        };
    }

    let (layout_type, sidebar_position) = if LEFT_BIAS.is_match(&lower) {
        (LayoutType::TwoColumnLeft, SidebarPosition::Left)
    } else {
        (LayoutType::TwoColumnRight, SidebarPosition::Right)
    };
    ColumnInference {
        layout_type,
        column_count: 2,
        sidebar_position,
        sidebar_width_ratio: DEFAULT_SIDEBAR_RATIO,
    }
}

fn detect_visual_elements(text: &str) -> VisualElementsDetected {
    VisualElementsDetected {
        separators: SEPARATOR_RULE.is_match(text),
        background_blocks: false,
        date_alignment: ALIGNED_DATES.is_match(text),
        icon_like_bullets: ICON_BULLETS.is_match(text),
        contact_header: CONTACT_HEADER.is_match(text),
    }
}

fn infer_colors(template: Option<TemplateChoice>) -> (&'static str, &'static str) {
    match template {
        Some(TemplateChoice::ModernExecutive) => ("#0f172a", "#2563eb"),
        Some(TemplateChoice::MinimalAts) => ("#111827", "#334155"),
        _ => ("#0f172a", "#0ea5e9"),
    }
}

/// Infers the layout signature of `text`. Pure and deterministic.
pub fn detect_layout_metadata(text: &str, template: Option<TemplateChoice>) -> LayoutMetadata {
    let lines: Vec<&str> = text.split('\n').collect();
    let spacing_profile = detect_spacing_profile(&lines);
    let columns = detect_columns(text, &lines);
    let candidates = heading_candidates(&lines);
    let (primary, accent) = infer_colors(template);

    LayoutMetadata {
        layout_type: columns.layout_type,
        column_count: columns.column_count,
        sidebar_position: columns.sidebar_position,
        sidebar_width_ratio: columns.sidebar_width_ratio,
        primary_color: primary.to_string(),
        accent_color: accent.to_string(),
        spacing_profile,
        density_profile: spacing_profile,
        spacing_rhythm: detect_spacing_rhythm(&lines),
        hierarchy_style: detect_hierarchy_style(&lines, template),
        heading_capitalization: detect_heading_capitalization(&candidates),
        section_order: detect_section_order(&candidates),
        visual_elements_detected: detect_visual_elements(text),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_COLUMN: &str = "JANE ROE\njane@roe.io\n\nPROFIL\nBackend engineer\n\nEXPERIENCE\nAcme — Engineer\n2019 - 2023\n\nSKILLS\nRust\nGo\nSQL\n\nLANGUAGES\nFrench\nEnglish\n\nEDUCATION\nMSc\n\nPROJECTS\nCompiler";

    #[test]
    fn test_two_column_gate_passes_with_all_signals() {
        let metadata = detect_layout_metadata(TWO_COLUMN, None);
        assert_eq!(metadata.layout_type, LayoutType::TwoColumnLeft);
        assert_eq!(metadata.column_count, 2);
        assert_eq!(metadata.sidebar_position, SidebarPosition::Left);
        assert!((metadata.sidebar_width_ratio - 0.31).abs() < f32::EPSILON);
    }

    #[test]
    fn test_single_sidebar_marker_keeps_single_column() {
        let text = "Summary\nEngineer with ten years of backend and platform work.\nExperience\nLed the migration of a payments monolith to event-driven services.\nEducation\nMaster of Science in Computer Science, 2015.\nSkills\nRust, Go, SQL, Kubernetes, Terraform, AWS, GCP.";
        let metadata = detect_layout_metadata(text, None);
        assert_eq!(metadata.layout_type, LayoutType::SingleColumn);
        assert_eq!(metadata.column_count, 1);
        assert_eq!(metadata.sidebar_position, SidebarPosition::None);
        assert_eq!(metadata.sidebar_width_ratio, 0.0);
    }

    #[test]
    fn test_spacing_profiles() {
        assert_eq!(detect_spacing_profile(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]), SpacingProfile::Compact);
        assert_eq!(detect_spacing_profile(&["a", "", "b", "", "c"]), SpacingProfile::Airy);
        assert_eq!(
            detect_spacing_profile(&["a", "b", "c", "d", "", "e", "f", "g"]),
            SpacingProfile::Balanced
        );
    }

    #[test]
    fn test_spacing_rhythm() {
        assert_eq!(detect_spacing_rhythm(&["a", "b"]), SpacingRhythm::Tight);
        assert_eq!(detect_spacing_rhythm(&["a", "", "b", "", "c"]), SpacingRhythm::Tight);
        assert_eq!(detect_spacing_rhythm(&["a", "", "", "b", "", "c"]), SpacingRhythm::Regular);
        assert_eq!(detect_spacing_rhythm(&["a", "", "", "b", "", "", "c"]), SpacingRhythm::Relaxed);
    }

    #[test]
    fn test_heading_capitalization() {
        let upper = vec!["EXPERIENCE".to_string(), "SKILLS".to_string(), "Education".to_string()];
        assert_eq!(detect_heading_capitalization(&upper), HeadingCapitalization::Uppercase);

        let title = vec![
            "Work Experience".to_string(),
            "Technical Skills".to_string(),
            "Education".to_string(),
        ];
        assert_eq!(detect_heading_capitalization(&title), HeadingCapitalization::Titlecase);

        let mixed = vec!["Experience".to_string(), "Skills".to_string(), "EDUCATION".to_string()];
        assert_eq!(detect_heading_capitalization(&mixed), HeadingCapitalization::Mixed);
        assert_eq!(detect_heading_capitalization(&[]), HeadingCapitalization::Mixed);
    }

    #[test]
    fn test_section_order_is_canonical_and_deduped() {
        let text = "EXPERIENCE\nAcme — Engineer, 2019.\nCompétences\nRust, Go.\nEXPERIENCE:\nMore, stuff.\nFormation\nMSc, 2015.";
        let metadata = detect_layout_metadata(text, None);
        assert_eq!(metadata.section_order, vec!["Experience", "Skills", "Education"]);
    }

    #[test]
    fn test_hierarchy_follows_template_then_caps() {
        assert_eq!(
            detect_layout_metadata(TWO_COLUMN, Some(TemplateChoice::MinimalAts)).hierarchy_style,
            HierarchyStyle::Minimal
        );
        assert_eq!(
            detect_layout_metadata(TWO_COLUMN, Some(TemplateChoice::ModernExecutive)).hierarchy_style,
            HierarchyStyle::Executive
        );
        assert_eq!(detect_layout_metadata(TWO_COLUMN, None).hierarchy_style, HierarchyStyle::Classic);
        assert_eq!(detect_layout_metadata("Experience\nStuff", None).hierarchy_style, HierarchyStyle::Executive);
    }

    #[test]
    fn test_hierarchy_ignores_first_and_last_lines() {
        let text = "JANE ROE\nEXPERIENCE\nAcme, 2019.\nSKILLS\nRust, Go.\nEDUCATION";
        assert_eq!(detect_layout_metadata(text, None).hierarchy_style, HierarchyStyle::Executive);

        let text = "Jane Roe\nEXPERIENCE\nAcme, 2019.\nSKILLS\nRust, Go.\nEDUCATION\nMSc, 2015.";
        assert_eq!(detect_layout_metadata(text, None).hierarchy_style, HierarchyStyle::Classic);
    }

    #[test]
    fn test_visual_elements_and_colors() {
        let metadata = detect_layout_metadata(TWO_COLUMN, Some(TemplateChoice::ModernExecutive));
        let visual = metadata.visual_elements_detected;
        assert!(visual.date_alignment);
        assert!(visual.contact_header);
        assert!(!visual.separators);
        assert!(!visual.background_blocks);
        assert_eq!(metadata.accent_color, "#2563eb");
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let json = serde_json::to_value(detect_layout_metadata(TWO_COLUMN, None)).unwrap();
        assert_eq!(json["layoutType"], "two-column-left");
        assert_eq!(json["sidebarPosition"], "left");
        assert_eq!(json["visualElementsDetected"]["iconLikeBullets"], false);
    }
}
