//! Section Segmenter — groups normalized lines under canonical headings.

use serde::{Deserialize, Serialize};

use crate::parsing::normalize::{
    canonical_heading, heading_text, is_bullet, is_heading, normalize_text,
    STRUCTURE_HEADING_MAX_LEN,
};

/// A heading and the content lines that follow it. Lines keep their bullet glyphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSection {
    pub heading: String,
    pub lines: Vec<String>,
}

impl ResumeSection {
    pub fn new(heading: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            lines,
        }
    }
}

/// Maps a heading to its canonical English name; unknown headings pass through verbatim
/// (minus a trailing colon) so custom sections survive.
pub fn normalize_heading(heading: &str) -> String {
    canonical_heading(heading)
        .map(String::from)
        .unwrap_or_else(|| heading_text(heading).to_string())
}

/// Splits lines into sections, starting from an implicit "Summary" so text above the first
/// heading is kept. Sections without content lines are dropped.
///
/// Inside Experience, a heading-shaped line that is not a known section name stays content
/// unless a bullet follows it: "Senior Engineer" / "Acme Corp" header blocks read as short
/// capitalised lines, while a custom section such as "Volunteer Work" opens onto bullets.
pub fn segment_sections<S: AsRef<str>>(lines: &[S], max_heading_len: usize) -> Vec<ResumeSection> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .collect();

    let mut sections = Vec::new();
    let mut current = ResumeSection::new("Summary", Vec::new());

    for (index, line) in lines.iter().enumerate() {
        let opens_section = is_heading(line, max_heading_len)
            && !(current.heading == "Experience"
                && canonical_heading(line).is_none()
                && lines.get(index + 1).is_some_and(|next| !is_bullet(next)));
        if opens_section {
            let finished = std::mem::replace(
                &mut current,
                ResumeSection::new(normalize_heading(line), Vec::new()),
            );
            if !finished.lines.is_empty() {
                sections.push(finished);
            }
            continue;
        }
        current.lines.push(line.to_string());
    }

    if !current.lines.is_empty() {
        sections.push(current);
    }
    sections
}

/// Normalizes and segments a raw text blob with the structuring heading ceiling.
pub fn parse_sections(text: &str) -> Vec<ResumeSection> {
    segment_sections(&normalize_text(text), STRUCTURE_HEADING_MAX_LEN)
}

/// Every line of every section whose heading is one of `headings`, in document order.
pub fn lines_under<'a>(sections: &'a [ResumeSection], headings: &[&str]) -> Vec<&'a str> {
    sections
        .iter()
        .filter(|section| headings.contains(&section.heading.as_str()))
        .flat_map(|section| section.lines.iter().map(String::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_heading_is_stable_across_languages() {
        assert_eq!(normalize_heading("Compétences"), "Skills");
        assert_eq!(normalize_heading("Skills"), "Skills");
        assert_eq!(normalize_heading("SKILLS:"), "Skills");
        assert_eq!(normalize_heading("Volunteer Work:"), "Volunteer Work");
    }

    #[test]
    fn test_content_before_first_heading_lands_in_summary() {
        let sections = parse_sections("Seasoned engineer, ten years.\nExperience\n- Did things");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], ResumeSection::new("Summary", vec!["Seasoned engineer, ten years.".into()]));
        assert_eq!(sections[1].heading, "Experience");
        assert_eq!(sections[1].lines, vec!["- Did things"]);
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let sections = parse_sections("## Experience\n\nEducation\nMSc CS — MIT");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Education");
    }

    #[test]
    fn test_text_without_headings_is_one_summary() {
        let sections = parse_sections("just some words, nothing else.\nand another line.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Summary");
        assert_eq!(sections[0].lines.len(), 2);
        assert!(parse_sections("").is_empty());
    }

    #[test]
    fn test_custom_headings_survive() {
        let sections = parse_sections("Volunteer Work\nRed Cross helper, 2019.");
        assert_eq!(sections[0].heading, "Volunteer Work");
    }

    #[test]
    fn test_experience_header_block_stays_in_experience() {
        let sections = parse_sections(
            "Experience\nSenior Engineer\nAcme Corp\n2020 - Present\n- Shipped X\nVolunteer Work\n- Red Cross\nEducation\nMSc CS — MIT",
        );
        let headings: Vec<&str> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Experience", "Volunteer Work", "Education"]);
        assert_eq!(
            sections[0].lines,
            vec!["Senior Engineer", "Acme Corp", "2020 - Present", "- Shipped X"]
        );
    }

    #[test]
    fn test_lines_under() {
        let sections = parse_sections("Skills\nRust, Go\nProjects\nA compiler.\nCertifications\nAWS SA.");
        assert_eq!(
            lines_under(&sections, &["Certifications", "Projects"]),
            vec!["A compiler.", "AWS SA."]
        );
    }
}
