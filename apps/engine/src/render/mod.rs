//! Rendering composition: layout inference, section rebuild, page fit, HTML.
//!
//! Layout comes from the *original* résumé text; content comes either from a structured CV
//! or from a free-text rewrite. Both paths share the same fit and render steps.

pub mod handlers;
pub mod html;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::cv::models::{Contact, StructuredCv};
use crate::layout::{
    fit_sections_for_template, map_layout_to_variant, resolve_style_config, DensityClass,
    FitTuning, LayoutCache, LayoutMetadata, TemplateChoice, TemplateVariant,
};
use crate::parsing::contact::{extract_contact, ContactScan};
use crate::parsing::normalize::{normalize_text, RENDER_HEADING_MAX_LEN};
use crate::parsing::sections::{normalize_heading, segment_sections, ResumeSection};
use crate::render::html::{classify_sidebar_headings, render_resume_html, RenderInput};

const SKILLS_PER_LINE: usize = 4;
const FALLBACK_NAME: &str = "Curriculum Vitae";

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub template: TemplateChoice,
    pub match_score: Option<u8>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedResume {
    pub html: String,
    pub variant: TemplateVariant,
    pub density: DensityClass,
    pub metadata: LayoutMetadata,
}

/// Contact scan plus body sections of a text, with contact lines kept out of the body.
fn body_sections(text: &str) -> (ContactScan, Vec<ResumeSection>) {
    let lines = normalize_text(text);
    let scan = extract_contact(&lines);
    let body: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| !scan.consumed.contains(index))
        .map(|(_, line)| line.as_str())
        .collect();
    let sections = segment_sections(&body, RENDER_HEADING_MAX_LEN);
    (scan, sections)
}

fn experience_lines(cv: &StructuredCv) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &cv.experiences {
        let header = [
            entry.title.as_str(),
            entry.company.as_str(),
            entry.location.as_deref().unwrap_or(""),
        ]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" — ");
        lines.push(header);
        if !entry.date.trim().is_empty() {
            lines.push(entry.date.clone());
        }
        lines.extend(entry.bullets.iter().map(|bullet| format!("- {bullet}")));
    }
    lines
}

/// Lays a structured CV out as sections in canonical order. Empty sections are omitted.
pub fn sections_from_structured(cv: &StructuredCv) -> Vec<ResumeSection> {
    let skills: Vec<String> = cv
        .skills
        .chunks(SKILLS_PER_LINE)
        .map(|chunk| chunk.join(", "))
        .collect();

    let candidates = [
        ("Summary", if cv.summary.trim().is_empty() { Vec::new() } else { vec![cv.summary.clone()] }),
        ("Experience", experience_lines(cv)),
        ("Education", cv.education.clone()),
        ("Skills", skills),
        ("Languages", cv.languages.clone()),
        ("Certifications", cv.additional.clone()),
    ];

    candidates
        .into_iter()
        .filter(|(_, lines)| !lines.is_empty())
        .map(|(heading, lines)| ResumeSection::new(heading, lines))
        .collect()
}

/// Orders `sections` by the original's heading sequence. `order` wins when non-empty,
/// otherwise the original sections' own order is used. Sections the skeleton does not
/// mention are appended in their own order; the first section per heading wins.
pub fn rebuild_sections_by_order(
    original: &[ResumeSection],
    sections: &[ResumeSection],
    order: &[String],
) -> Vec<ResumeSection> {
    let mut by_heading: HashMap<String, ResumeSection> = HashMap::new();
    let mut appearance: Vec<String> = Vec::new();
    for section in sections {
        let key = normalize_heading(&section.heading);
        if by_heading.contains_key(&key) {
            continue;
        }
        appearance.push(key.clone());
        by_heading.insert(key.clone(), ResumeSection::new(key, section.lines.clone()));
    }

    let skeleton: Vec<String> = if order.is_empty() {
        original.iter().map(|s| normalize_heading(&s.heading)).collect()
    } else {
        order.iter().map(|heading| normalize_heading(heading)).collect()
    };

    let mut rebuilt = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    for heading in skeleton {
        if used.contains(&heading) {
            continue;
        }
        if let Some(section) = by_heading.get(&heading).filter(|s| !s.lines.is_empty()) {
            rebuilt.push(section.clone());
            used.insert(heading);
        }
    }
    for heading in appearance {
        if !used.contains(&heading) {
            if let Some(section) = by_heading.remove(&heading) {
                rebuilt.push(section);
            }
        }
    }
    rebuilt
}

fn compose(
    name: &str,
    contact: &Contact,
    original_sections: &[ResumeSection],
    sections: Vec<ResumeSection>,
    metadata: LayoutMetadata,
    options: &RenderOptions,
    tuning: &FitTuning,
) -> RenderedResume {
    let variant = map_layout_to_variant(&metadata);
    let style = resolve_style_config(&metadata, variant);
    let ordered = rebuild_sections_by_order(original_sections, &sections, &metadata.section_order);
    let fitted = fit_sections_for_template(&ordered, options.template, tuning);
    let sidebar_headings = classify_sidebar_headings(&fitted.sections);

    debug!(
        variant = %variant,
        sections = fitted.sections.len(),
        units = fitted.units,
        "Composed resume document"
    );

    let html = render_resume_html(&RenderInput {
        name: if name.trim().is_empty() { FALLBACK_NAME } else { name },
        contact,
        sections: &fitted.sections,
        sidebar_headings: &sidebar_headings,
        metadata: &metadata,
        variant,
        style: &style,
        density: fitted.density,
        template: options.template,
        match_score: options.match_score,
        keywords: &options.keywords,
    });

    RenderedResume {
        html,
        variant,
        density: fitted.density,
        metadata,
    }
}

/// Renders a structured CV with the layout signature of `original_text`.
pub fn build_resume_document(
    cv: &StructuredCv,
    original_text: &str,
    options: &RenderOptions,
    cache: &LayoutCache,
    tuning: &FitTuning,
) -> RenderedResume {
    let metadata = cache.get_or_detect(original_text, Some(options.template));
    let (_, original_sections) = body_sections(original_text);
    compose(
        &cv.contact.full_name,
        &cv.contact,
        &original_sections,
        sections_from_structured(cv),
        metadata,
        options,
        tuning,
    )
}

/// Renders a free-text rewrite, rebuilding its sections in the original's order. Contact
/// details come from the original text.
pub fn build_resume_document_from_text(
    original_text: &str,
    rewritten_text: &str,
    options: &RenderOptions,
    cache: &LayoutCache,
    tuning: &FitTuning,
) -> RenderedResume {
    let metadata = cache.get_or_detect(original_text, Some(options.template));
    let (scan, original_sections) = body_sections(original_text);
    let (_, rewritten_sections) = body_sections(rewritten_text);
    compose(
        &scan.contact.full_name,
        &scan.contact,
        &original_sections,
        rewritten_sections,
        metadata,
        options,
        tuning,
    )
}
