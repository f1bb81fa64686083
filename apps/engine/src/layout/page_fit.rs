//! Page-Fit Engine — trims résumé sections until their estimated height fits one page.
//!
//! Height is estimated in abstract *units*: each section costs a fixed heading allowance
//! plus one unit per started `chars_per_unit` characters of each line. Both constants are
//! empirical proxies for line wrapping at one font and page size, so they live in
//! [`FitTuning`] and can be recalibrated from config when the render target changes.
//!
//! # Fit rules
//! - Every section is first capped at its per-heading maximum and long lines are cut at
//!   `max_line_chars` with an ellipsis.
//! - While over budget, the last line of the lowest-priority section still above its
//!   floor is dropped. Ties go to the section that appears first.
//! - No section is ever trimmed below its floor. If every section sits at its floor the
//!   result may stay over budget; that is reported through the density class, not an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::template::TemplateChoice;
use crate::parsing::normalize::strip_bullet;
use crate::parsing::sections::{normalize_heading, ResumeSection};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitTuning {
    pub chars_per_unit: f32,
    pub heading_units: f32,
    pub max_line_chars: usize,
}

impl Default for FitTuning {
    fn default() -> Self {
        Self {
            chars_per_unit: 96.0,
            heading_units: 1.5,
            max_line_chars: 170,
        }
    }
}

/// How close the fitted content sits to its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityClass {
    /// Above 93% of the budget (or still over it).
    Tight,
    /// Above 82%.
    Normal,
    Relaxed,
}

impl DensityClass {
    pub fn css_class(self) -> &'static str {
        match self {
            DensityClass::Tight => "density-tight",
            DensityClass::Normal => "density-normal",
            DensityClass::Relaxed => "density-relaxed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedSections {
    pub sections: Vec<ResumeSection>,
    pub units: f32,
    pub budget: f32,
    pub density: DensityClass,
}

/// Per-heading fit rule. Lower `priority` values are protected longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRule {
    pub priority: u8,
    pub max_lines: usize,
    pub min_lines: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

const UNKNOWN_SECTION: SectionRule = SectionRule {
    priority: 10,
    max_lines: 7,
    min_lines: 1,
};

const TIGHT_SHARE: f32 = 0.93;
const NORMAL_SHARE: f32 = 0.82;

/// Looks up the rule for a heading after canonicalizing it.
pub fn section_rule(heading: &str) -> SectionRule {
    let rule = |priority, max_lines, min_lines| SectionRule {
        priority,
        max_lines,
        min_lines,
    };
    match normalize_heading(heading).as_str() {
        "Summary" => rule(1, 5, 2),
        "Experience" => rule(2, 14, 6),
        "Education" => rule(3, 7, 2),
        "Projects" => rule(4, 6, 1),
        "Skills" => rule(5, 10, 3),
        "Certifications" => rule(6, 4, 1),
        "Languages" => rule(7, 3, 1),
        "Interests" => rule(8, 3, 1),
        _ => UNKNOWN_SECTION,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Cuts a line to `max_chars` characters, the last one being an ellipsis.
pub fn truncate_line(line: &str, max_chars: usize) -> String {
    let clean = line.trim();
    if clean.chars().count() <= max_chars {
        return clean.to_string();
    }
    let kept: String = clean.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

pub fn estimate_line_units(line: &str, tuning: &FitTuning) -> f32 {
    let len = strip_bullet(line).chars().count() as f32;
    (len / tuning.chars_per_unit).ceil().max(1.0)
}

pub fn estimate_section_units(section: &ResumeSection, tuning: &FitTuning) -> f32 {
    tuning.heading_units
        + section
            .lines
            .iter()
            .map(|line| estimate_line_units(line, tuning))
            .sum::<f32>()
}

fn total_units(sections: &[ResumeSection], tuning: &FitTuning) -> f32 {
    sections.iter().map(|s| estimate_section_units(s, tuning)).sum()
}

pub fn classify_density(units: f32, budget: f32) -> DensityClass {
    if units > budget * TIGHT_SHARE {
        DensityClass::Tight
    } else if units > budget * NORMAL_SHARE {
        DensityClass::Normal
    } else {
        DensityClass::Relaxed
    }
}

/// Index of the section to shrink next, or `None` once every section is at its floor.
fn next_trim_target(sections: &[ResumeSection], rules: &[SectionRule]) -> Option<usize> {
    sections
        .iter()
        .zip(rules)
        .enumerate()
        .filter(|(_, (section, rule))| section.lines.len() > rule.min_lines)
        // max_by_key keeps the last maximum, so reverse to favour document order on ties.
        .rev()
        .max_by_key(|(_, (_, rule))| rule.priority)
        .map(|(index, _)| index)
}

/// Fits `sections` into `budget` units. Headings come out canonicalized.
pub fn fit_sections(sections: &[ResumeSection], budget: f32, tuning: &FitTuning) -> FittedSections {
    let mut fitted: Vec<ResumeSection> = Vec::with_capacity(sections.len());
    let mut rules: Vec<SectionRule> = Vec::with_capacity(sections.len());

    for section in sections {
        let heading = normalize_heading(&section.heading);
        let rule = section_rule(&heading);
        let lines = section
            .lines
            .iter()
            .take(rule.max_lines)
            .map(|line| truncate_line(line, tuning.max_line_chars))
            .collect();
        fitted.push(ResumeSection::new(heading, lines));
        rules.push(rule);
    }

    let mut units = total_units(&fitted, tuning);
    let mut removed = 0usize;
    while units > budget {
        let Some(index) = next_trim_target(&fitted, &rules) else {
            debug!(units, budget, "Every section at its floor, leaving page over budget");
            break;
        };
        if let Some(line) = fitted[index].lines.pop() {
            units -= estimate_line_units(&line, tuning);
            removed += 1;
        }
    }

    let density = classify_density(units, budget);
    debug!(units, budget, removed, density = ?density, "Fitted sections to one page");

    FittedSections {
        sections: fitted,
        units,
        budget,
        density,
    }
}

/// [`fit_sections`] with the budget of the requested template.
pub fn fit_sections_for_template(
    sections: &[ResumeSection],
    template: TemplateChoice,
    tuning: &FitTuning,
) -> FittedSections {
    fit_sections(sections, template.unit_budget(), tuning)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
