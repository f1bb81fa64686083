pub mod contact;
pub mod experience;
pub mod normalize;
pub mod sections;

use tracing::debug;

use crate::cv::models::{Experience, StructuredCv};
use crate::cv::sanitize::sanitize_structured_cv;
use crate::parsing::contact::extract_contact;
use crate::parsing::experience::{parse_experience_lines, recover_experiences};
use crate::parsing::normalize::{
    normalize_text, strip_bullet, STRUCTURE_HEADING_MAX_LEN,
};
use crate::parsing::sections::{lines_under, segment_sections, ResumeSection};

const SUMMARY_MAX_LINES: usize = 3;
const FALLBACK_SUMMARY_MIN_LEN: usize = 32;

/// Splits "Python, Go, Rust • SQL" into its items. One-character fragments are dropped.
pub fn split_skill_line(line: &str) -> Vec<String> {
    strip_bullet(line)
        .split([',', '|', '•', '·'])
        .map(str::trim)
        .filter(|chunk| chunk.chars().count() > 1)
        .map(String::from)
        .collect()
}

fn stripped(lines: Vec<&str>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| strip_bullet(line).to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Long lines outside the Experience section, used when there is no Summary section.
fn fallback_summary(sections: &[ResumeSection]) -> String {
    sections
        .iter()
        .filter(|section| section.heading != "Experience")
        .flat_map(|section| section.lines.iter())
        .map(|line| strip_bullet(line))
        .filter(|line| line.chars().count() > FALLBACK_SUMMARY_MIN_LEN)
        .take(SUMMARY_MAX_LINES)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_experiences(sections: &[ResumeSection]) -> Vec<Experience> {
    let experience_lines = lines_under(sections, &["Experience"]);
    let experiences = parse_experience_lines(&experience_lines);
    if !experiences.is_empty() {
        return experiences;
    }
    debug!("No entries in the Experience section, scanning all sections");
    recover_experiences(sections)
}

/// Heuristic parse of a raw résumé into the flat structured shape. Never fails.
pub fn parse_structured_cv_from_text(text: &str) -> StructuredCv {
    let lines = normalize_text(text);
    let scan = extract_contact(&lines);
    let body: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| !scan.consumed.contains(index))
        .map(|(_, line)| line.as_str())
        .collect();
    let sections = segment_sections(&body, STRUCTURE_HEADING_MAX_LEN);

    let summary_lines = stripped(lines_under(&sections, &["Summary"]));
    let summary = if summary_lines.is_empty() {
        fallback_summary(&sections)
    } else {
        summary_lines
            .into_iter()
            .take(SUMMARY_MAX_LINES)
            .collect::<Vec<_>>()
            .join(" ")
    };

    let split_all = |headings: &[&str]| -> Vec<String> {
        lines_under(&sections, headings)
            .into_iter()
            .flat_map(split_skill_line)
            .collect()
    };

    let mut additional = split_all(&["Certifications"]);
    additional.extend(stripped(lines_under(&sections, &["Projects"])));
    additional.extend(split_all(&["Interests"]));

    let cv = StructuredCv {
        contact: scan.contact,
        summary,
        experiences: parse_experiences(&sections),
        education: stripped(lines_under(&sections, &["Education", "Projects"])),
        skills: split_all(&["Skills"]),
        languages: split_all(&["Languages"]),
        additional,
    };

    debug!(
        sections = sections.len(),
        experiences = cv.experiences.len(),
        "Parsed structured CV from text"
    );
    sanitize_structured_cv(&cv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::hybrid::map_structured_to_hybrid;

    const SCENARIO_A: &str = "John Doe\njohn@doe.com\n+33 6 12 34 56 78\nExperience\nSenior Engineer — Acme Corp\n2020 - Present\n- Shipped X\n- Led Y\nEducation\nMSc CS — MIT";

    #[test]
    fn test_scenario_a_end_to_end() {
        let cv = parse_structured_cv_from_text(SCENARIO_A);
        assert_eq!(cv.contact.full_name, "John Doe");
        assert_eq!(cv.contact.email, "john@doe.com");
        assert_eq!(cv.contact.phone, "+33 6 12 34 56 78");

        assert_eq!(cv.experiences.len(), 1);
        let entry = &cv.experiences[0];
        assert_eq!(entry.title, "Senior Engineer");
        assert_eq!(entry.company, "Acme Corp");
        assert_eq!(entry.date, "2020 - Present");
        assert_eq!(entry.bullets, vec!["Shipped X", "Led Y"]);
        assert_eq!(cv.education, vec!["MSc CS — MIT"]);

        let hybrid = map_structured_to_hybrid(&cv);
        assert!(hybrid.experience[0].is_current);
    }

    #[test]
    fn test_scenario_e_skill_line() {
        assert_eq!(
            split_skill_line("Python, Go, Rust • SQL"),
            vec!["Python", "Go", "Rust", "SQL"]
        );
        assert_eq!(split_skill_line("- C | R · Java"), vec!["Java"]);
    }

    #[test]
    fn test_sections_feed_lists() {
        let text = "Profil\nIngénieur backend passionné par les systèmes distribués.\nCompétences\nRust, Go, rust\nLangues\nFrançais, Anglais\nCertifications\nAWS SA, CKA\nProjets\nA tiny compiler, written in Rust.";
        let cv = parse_structured_cv_from_text(text);
        assert_eq!(cv.summary, "Ingénieur backend passionné par les systèmes distribués.");
        assert_eq!(cv.skills, vec!["Rust", "Go"]);
        assert_eq!(cv.languages, vec!["Français", "Anglais"]);
        assert_eq!(cv.additional, vec!["AWS SA", "CKA", "A tiny compiler, written in Rust."]);
        assert_eq!(cv.education, vec!["A tiny compiler, written in Rust."]);
    }

    #[test]
    fn test_projects_feed_education_and_additional() {
        let text = "Education\nMSc CS — MIT\nProjects\nA tiny compiler, written in Rust.";
        let cv = parse_structured_cv_from_text(text);
        assert_eq!(cv.education, vec!["MSc CS — MIT", "A tiny compiler, written in Rust."]);
        assert_eq!(cv.additional, vec!["A tiny compiler, written in Rust."]);
    }

    #[test]
    fn test_stacked_header_block_end_to_end() {
        let text = "Jane Roe\njane@roe.io\nExperience\nSenior Engineer\nAcme Corp\n2020 - Present\n- Shipped X\n- Led Y\nEducation\nMSc CS — MIT";
        let cv = parse_structured_cv_from_text(text);
        assert_eq!(cv.experiences.len(), 1);
        let entry = &cv.experiences[0];
        assert_eq!(entry.title, "Senior Engineer");
        assert_eq!(entry.company, "Acme Corp");
        assert_eq!(entry.date, "2020 - Present");
        assert_eq!(entry.bullets, vec!["Shipped X", "Led Y"]);
        assert_eq!(cv.education, vec!["MSc CS — MIT"]);
    }

    #[test]
    fn test_fallback_summary_and_experience_recovery() {
        let text = "Hands-on builder of data platforms for retail and logistics.\nSoftware Engineer at Initech, 2016 - 2019\n- Migrated billing to the cloud";
        let cv = parse_structured_cv_from_text(text);
        assert_eq!(cv.experiences.len(), 1);
        assert_eq!(cv.experiences[0].date, "2016 - 2019");
        assert_eq!(cv.experiences[0].bullets, vec!["Migrated billing to the cloud"]);
        assert!(cv.summary.starts_with("Hands-on builder"));
    }

    #[test]
    fn test_total_over_garbage_input() {
        for text in ["", "\n\n\t", "???", "—", "2020"] {
            let cv = parse_structured_cv_from_text(text);
            assert_eq!(sanitize_structured_cv(&cv), cv);
        }
    }
}
