//! HTML Renderer — turns fitted sections plus resolved style into one A4 HTML document.
//!
//! Pure string assembly: no I/O, no layout decisions beyond splitting main and sidebar
//! columns. Every piece of résumé text goes through [`escape_html`].

use std::collections::BTreeSet;

use crate::cv::models::Contact;
use crate::layout::detector::{HeadingCapitalization, LayoutMetadata, SidebarPosition};
use crate::layout::page_fit::DensityClass;
use crate::layout::style::{rhythm_section_gap, StyleConfig};
use crate::layout::template::TemplateChoice;
use crate::layout::variant::TemplateVariant;
use crate::parsing::experience::parse_experience_lines;
use crate::parsing::normalize::strip_bullet;
use crate::parsing::sections::{normalize_heading, ResumeSection};

/// The only sections that may leave the main column.
pub const SIDEBAR_HEADINGS: &[&str] = &["Skills", "Languages", "Certifications", "Interests"];

const MIN_SIDEBAR_FR: f32 = 0.25;
const MAX_KEYWORDS: usize = 10;
const MAX_RENDERED_BULLETS: usize = 4;

const CSS_TEMPLATE: &str = r#"
    @page { size: A4; margin: {padding_mm}mm; }
    *, *::before, *::after { box-sizing: border-box; }
    html, body { margin: 0; padding: 0; background: #fff; width: 100%; height: 100%; }
    body {
      font-family: {font_family};
      font-size: {base_font_size}px;
      line-height: {line_height};
      color: #0f172a;
      -webkit-print-color-adjust: exact;
      print-color-adjust: exact;
    }
    .cv-page {
      width: 100%;
      min-height: calc(297mm - {page_inset_mm}mm);
      max-height: calc(297mm - {page_inset_mm}mm);
      overflow: hidden;
      display: flex;
      flex-direction: column;
      gap: {section_gap}px;
    }
    .cv-header { border-bottom: 1px solid #d5dde8; padding-bottom: 6px; }
    .cv-name {
      margin: 0;
      font-size: {header_name_size}px;
      font-weight: 800;
      letter-spacing: 0.02em;
      line-height: 1.05;
      color: {primary_color};
    }
    .contact-row { margin-top: 4px; display: flex; flex-wrap: wrap; gap: 5px; font-size: 9.5px; color: #334155; }
    .sep { color: #94a3b8; }
    .meta-row { margin-top: 4px; display: flex; flex-wrap: wrap; gap: 8px; font-size: 9.2px; color: #475569; }
    .cv-content { display: flex; flex-direction: column; gap: {section_gap}px; }
    .cv-content.two-col { display: grid; grid-template-columns: {left_fr}fr {right_fr}fr; gap: {section_gap}px; align-items: start; }
    .main-col, .side-col { display: flex; flex-direction: column; gap: {section_gap}px; }
    .cv-section, .block-avoid, .xp-item { break-inside: avoid; page-break-inside: avoid; }
    .section-title {
      margin: 0 0 4px 0;
      padding-bottom: 3px;
      border-bottom: 1px solid #cbd5e1;
      font-size: {section_title_size}px;
      font-weight: 700;
      letter-spacing: 0.07em;
      color: #0f172a;
    }
    .section-list, .xp-bullets { list-style: none; margin: 0; padding: 0; display: flex; flex-direction: column; gap: 2px; }
    .section-list li, .xp-bullets li { margin: 0; color: #1e293b; line-height: 1.27; }
    .section-list li::before, .xp-bullets li::before { content: "• "; font-weight: 700; color: #1e293b; }
    .xp-list { display: flex; flex-direction: column; gap: {block_gap}px; }
    .xp-head { display: grid; grid-template-columns: 1fr auto; gap: 8px; align-items: baseline; margin-bottom: 1px; }
    .xp-company { margin: 0; font-weight: 700; color: #0f172a; }
    .xp-role { margin: 0; font-weight: 500; color: #334155; }
    .xp-date { margin: 0; font-size: 9.4px; color: #475569; text-align: right; white-space: nowrap; }
    .density-tight .section-list li, .density-tight .xp-bullets li { line-height: 1.22; }
    .density-relaxed .section-list li, .density-relaxed .xp-bullets li { line-height: 1.32; }

    .variant-template_executive_balanced .cv-header { border-bottom: none; border-radius: 10px; background: #0f172a; padding: 9px 11px 8px; }
    .variant-template_executive_balanced .cv-name { color: #fff; }
    .variant-template_executive_balanced .contact-row,
    .variant-template_executive_balanced .meta-row { color: #cbd5e1; }
    .variant-template_minimal_compact .cv-header { border-bottom: 2px solid #111827; }
    .variant-template_minimal_compact .section-title { border-bottom-color: #111827; }
    .variant-template_two_column_left_v2 .side-col .cv-section,
    .variant-template_two_column_right_v2 .side-col .cv-section { border: 1px solid #e2e8f0; border-radius: 8px; padding: 5px 6px; background: #f8fafc; }
    .variant-template_asymmetric_signature .cv-section { border-left: 2px solid {accent_color}; padding-left: 7px; }

    @media print {
      .cv-page, .cv-section, .xp-item, .xp-head { break-inside: avoid; page-break-inside: avoid; }
      p, li { orphans: 3; widows: 3; }
    }
"#;

/// Everything the renderer needs, already resolved.
pub struct RenderInput<'a> {
    pub name: &'a str,
    pub contact: &'a Contact,
    pub sections: &'a [ResumeSection],
    pub sidebar_headings: &'a BTreeSet<String>,
    pub metadata: &'a LayoutMetadata,
    pub variant: TemplateVariant,
    pub style: &'a StyleConfig,
    pub density: DensityClass,
    pub template: TemplateChoice,
    pub match_score: Option<u8>,
    pub keywords: &'a [String],
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn apply_heading_case(heading: &str, mode: HeadingCapitalization) -> String {
    match mode {
        HeadingCapitalization::Uppercase => heading.to_uppercase(),
        HeadingCapitalization::Titlecase => heading
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" "),
        HeadingCapitalization::Mixed => heading.to_string(),
    }
}

/// Headings among `sections` that belong in the side column. Only the fixed
/// [`SIDEBAR_HEADINGS`] qualify, however short other sections are.
pub fn classify_sidebar_headings(sections: &[ResumeSection]) -> BTreeSet<String> {
    sections
        .iter()
        .map(|section| normalize_heading(&section.heading))
        .filter(|heading| SIDEBAR_HEADINGS.contains(&heading.as_str()))
        .collect()
}

fn render_css(style: &StyleConfig, metadata: &LayoutMetadata) -> String {
    let side = style.sidebar_ratio.max(MIN_SIDEBAR_FR);
    let main = 1.0 - style.sidebar_ratio;
    let (left, right) = match metadata.sidebar_position {
        SidebarPosition::Left => (side, main),
        _ => (main, side),
    };
    CSS_TEMPLATE
        .replace("{padding_mm}", &style.page_padding_mm.to_string())
        .replace("{page_inset_mm}", &(style.page_padding_mm * 2.0).to_string())
        .replace("{font_family}", &style.font_family)
        .replace("{base_font_size}", &style.base_font_size.to_string())
        .replace("{line_height}", &style.line_height.to_string())
        .replace(
            "{section_gap}",
            &rhythm_section_gap(style, metadata.spacing_rhythm).to_string(),
        )
        .replace("{block_gap}", &style.block_gap.to_string())
        .replace("{header_name_size}", &style.header_name_size.to_string())
        .replace("{section_title_size}", &style.section_title_size.to_string())
        .replace("{primary_color}", &style.primary_color)
        .replace("{accent_color}", &style.accent_color)
        .replace("{left_fr}", &format!("{left:.2}"))
        .replace("{right_fr}", &format!("{right:.2}"))
}

fn render_contact(contact: &Contact) -> String {
    let chunks: Vec<String> = [&contact.email, &contact.phone, &contact.website, &contact.city]
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| format!("<span>{}</span>", escape_html(value)))
        .collect();
    if chunks.is_empty() {
        return String::new();
    }
    format!(
        r#"<div class="contact-row">{}</div>"#,
        chunks.join(r#"<span class="sep">•</span>"#)
    )
}

fn section_title(heading: &str, mode: HeadingCapitalization) -> String {
    format!(
        r#"<h2 class="section-title">{}</h2>"#,
        escape_html(&apply_heading_case(heading, mode))
    )
}

fn render_experience_section(section: &ResumeSection, mode: HeadingCapitalization) -> String {
    let mut out = String::new();
    out.push_str(r#"<section class="cv-section block-avoid">"#);
    out.push_str(&section_title(&section.heading, mode));
    out.push_str(r#"<div class="xp-list">"#);

    for entry in parse_experience_lines(&section.lines) {
        let subtitle = [entry.company.as_str(), entry.location.as_deref().unwrap_or("")]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" · ");

        out.push_str(r#"<article class="xp-item block-avoid"><div class="xp-head"><div>"#);
        out.push_str(&format!(r#"<p class="xp-company">{}</p>"#, escape_html(&entry.title)));
        if !subtitle.is_empty() {
            out.push_str(&format!(r#"<p class="xp-role">{}</p>"#, escape_html(&subtitle)));
        }
        out.push_str("</div>");
        if !entry.date.is_empty() {
            out.push_str(&format!(r#"<p class="xp-date">{}</p>"#, escape_html(&entry.date)));
        }
        out.push_str("</div>");

        let bullets: String = entry
            .bullets
            .iter()
            .take(MAX_RENDERED_BULLETS)
            .map(|bullet| format!("<li>{}</li>", escape_html(bullet)))
            .collect();
        if !bullets.is_empty() {
            out.push_str(&format!(r#"<ul class="xp-bullets">{bullets}</ul>"#));
        }
        out.push_str("</article>");
    }

    out.push_str("</div></section>");
    out
}

fn render_generic_section(section: &ResumeSection, mode: HeadingCapitalization) -> String {
    let items: String = section
        .lines
        .iter()
        .map(|line| format!("<li>{}</li>", escape_html(strip_bullet(line))))
        .collect();
    format!(
        r#"<section class="cv-section block-avoid">{}<ul class="section-list">{items}</ul></section>"#,
        section_title(&section.heading, mode)
    )
}

fn render_section(section: &ResumeSection, mode: HeadingCapitalization) -> String {
    if section.heading == "Experience" {
        render_experience_section(section, mode)
    } else {
        render_generic_section(section, mode)
    }
}

fn render_sections(sections: &[&ResumeSection], mode: HeadingCapitalization) -> String {
    sections
        .iter()
        .map(|section| render_section(section, mode))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_meta_row(input: &RenderInput<'_>) -> String {
    let mut out = String::from(r#"<div class="meta-row">"#);
    out.push_str(&format!("<span>Template: {}</span>", escape_html(input.template.label())));
    out.push_str(&format!("<span>Layout: {}</span>", input.metadata.layout_type.as_str()));
    let score = input
        .match_score
        .map_or_else(|| "N/A".to_string(), |score| score.to_string());
    out.push_str(&format!("<span>Match score: {score}%</span>"));

    let keywords = input
        .keywords
        .iter()
        .take(MAX_KEYWORDS)
        .map(|k| escape_html(k))
        .collect::<Vec<_>>()
        .join(" · ");
    if !keywords.is_empty() {
        out.push_str(&format!("<span>Keywords: {keywords}</span>"));
    }
    out.push_str("</div>");
    out
}

/// Renders the full document. Two columns only when the layout has them and at least
/// one section belongs in the sidebar.
pub fn render_resume_html(input: &RenderInput<'_>) -> String {
    let mode = input.metadata.heading_capitalization;
    let (side, main): (Vec<&ResumeSection>, Vec<&ResumeSection>) = input
        .sections
        .iter()
        .partition(|section| input.sidebar_headings.contains(&section.heading));
    let two_columns = input.metadata.column_count == 2 && !side.is_empty();

    let content = if two_columns {
        format!(
            r#"<section class="cv-content two-col"><div class="main-col">{}</div><aside class="side-col">{}</aside></section>"#,
            render_sections(&main, mode),
            render_sections(&side, mode)
        )
    } else {
        let all: Vec<&ResumeSection> = input.sections.iter().collect();
        format!(r#"<section class="cv-content">{}</section>"#, render_sections(&all, mode))
    };

    let mut out = String::with_capacity(16384);
    out.push_str("<!doctype html>\n<html lang=\"fr\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\" />\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    out.push_str(&format!("<style>{}</style>\n", render_css(input.style, input.metadata)));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!(
        "<main class=\"cv-page variant-{} {}\">\n",
        input.variant,
        input.density.css_class()
    ));
    out.push_str(r#"<header class="cv-header">"#);
    out.push_str(&format!(r#"<h1 class="cv-name">{}</h1>"#, escape_html(input.name)));
    out.push_str(&render_contact(input.contact));
    out.push_str(&render_meta_row(input));
    out.push_str("</header>\n");
    out.push_str(&content);
    out.push_str("\n</main>\n</body>\n</html>\n");
    out
}
