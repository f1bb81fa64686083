//! Structured-CV sanitizer and the heuristic/AI merge.
//!
//! Both functions are total: any partially filled [`StructuredCv`] comes back trimmed,
//! deduplicated and capped. Sanitizing twice yields the same value as sanitizing once.

use std::collections::HashSet;

use tracing::debug;

use crate::cv::models::{
    Contact, Experience, StructuredCv, MAX_ADDITIONAL, MAX_BULLETS, MAX_EDUCATION,
    MAX_LANGUAGES, MAX_SKILLS,
};

/// Keeps the first occurrence of every value, comparing case-insensitively.
pub fn dedupe_case_insensitive<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.to_lowercase()))
        .collect()
}

/// Trims, drops empties, dedupes, then caps.
pub fn clean_list<I, S>(values: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let trimmed = values
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty());
    let mut cleaned = dedupe_case_insensitive(trimmed);
    cleaned.truncate(cap);
    cleaned
}

fn sanitize_contact(contact: &Contact) -> Contact {
    Contact {
        full_name: contact.full_name.trim().to_string(),
        email: contact.email.trim().to_string(),
        phone: contact.phone.trim().to_string(),
        city: contact.city.trim().to_string(),
        website: contact.website.trim().to_string(),
    }
}

fn sanitize_experience(entry: &Experience) -> Experience {
    Experience {
        title: entry.title.trim().to_string(),
        company: entry.company.trim().to_string(),
        date: entry.date.trim().to_string(),
        location: entry
            .location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(String::from),
        bullets: clean_list(&entry.bullets, MAX_BULLETS),
    }
}

pub fn sanitize_structured_cv(input: &StructuredCv) -> StructuredCv {
    StructuredCv {
        contact: sanitize_contact(&input.contact),
        summary: input.summary.trim().to_string(),
        experiences: input
            .experiences
            .iter()
            .map(sanitize_experience)
            .filter(|entry| !entry.title.is_empty())
            .collect(),
        education: clean_list(&input.education, MAX_EDUCATION),
        skills: clean_list(&input.skills, MAX_SKILLS),
        languages: clean_list(&input.languages, MAX_LANGUAGES),
        additional: clean_list(&input.additional, MAX_ADDITIONAL),
    }
}

fn prefer_text(ai: &str, heuristic: &str) -> String {
    let chosen = if ai.is_empty() { heuristic } else { ai };
    chosen.to_string()
}

fn prefer_list<T: Clone>(ai: &[T], heuristic: &[T]) -> Vec<T> {
    let chosen = if ai.is_empty() { heuristic } else { ai };
    chosen.to_vec()
}

/// Merges an optional AI extraction into the heuristic parse, field by field.
///
/// An AI field only wins when it is non-empty after sanitizing; otherwise the heuristic value
/// is kept. With no AI result the output is the sanitized heuristic parse.
pub fn merge_with_fallback(heuristic: &StructuredCv, ai: Option<&StructuredCv>) -> StructuredCv {
    let base = sanitize_structured_cv(heuristic);
    let Some(ai) = ai else {
        return base;
    };
    let ai = sanitize_structured_cv(ai);

    let merged = StructuredCv {
        contact: Contact {
            full_name: prefer_text(&ai.contact.full_name, &base.contact.full_name),
            email: prefer_text(&ai.contact.email, &base.contact.email),
            phone: prefer_text(&ai.contact.phone, &base.contact.phone),
            city: prefer_text(&ai.contact.city, &base.contact.city),
            website: prefer_text(&ai.contact.website, &base.contact.website),
        },
        summary: prefer_text(&ai.summary, &base.summary),
        experiences: prefer_list(&ai.experiences, &base.experiences),
        education: prefer_list(&ai.education, &base.education),
        skills: prefer_list(&ai.skills, &base.skills),
        languages: prefer_list(&ai.languages, &base.languages),
        additional: prefer_list(&ai.additional, &base.additional),
    };

    debug!(
        ai_experiences = ai.experiences.len(),
        heuristic_experiences = base.experiences.len(),
        "Merged AI extraction into heuristic parse"
    );

    sanitize_structured_cv(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messy_cv() -> StructuredCv {
        StructuredCv {
            contact: Contact {
                full_name: "  Jane Roe ".into(),
                email: " jane@roe.io".into(),
                ..Default::default()
            },
            summary: "  Backend engineer.  ".into(),
            experiences: vec![
                Experience {
                    title: "  Engineer ".into(),
                    company: " Acme ".into(),
                    date: " 2020 - 2022 ".into(),
                    location: Some("   ".into()),
                    bullets: vec![
                        " a ".into(),
                        "A".into(),
                        "".into(),
                        "b".into(),
                        "c".into(),
                        "d".into(),
                        "e".into(),
                    ],
                },
                Experience {
                    title: "   ".into(),
                    company: "Ghost".into(),
                    ..Default::default()
                },
            ],
            education: vec!["MSc".into(), "msc".into(), " BSc ".into()],
            skills: (0..40).map(|i| format!("skill{i}")).collect(),
            languages: vec!["French".into(), "FRENCH".into(), "English".into()],
            additional: vec!["".into(), "AWS".into()],
        }
    }

    #[test]
    fn test_sanitize_trims_caps_and_dedupes() {
        let cv = sanitize_structured_cv(&messy_cv());
        assert_eq!(cv.contact.full_name, "Jane Roe");
        assert_eq!(cv.summary, "Backend engineer.");
        assert_eq!(cv.experiences.len(), 1);

        let entry = &cv.experiences[0];
        assert_eq!(entry.title, "Engineer");
        assert_eq!(entry.location, None);
        assert_eq!(entry.bullets, vec!["a", "b", "c", "d"]);

        assert_eq!(cv.education, vec!["MSc", "BSc"]);
        assert_eq!(cv.skills.len(), MAX_SKILLS);
        assert_eq!(cv.languages, vec!["French", "English"]);
        assert_eq!(cv.additional, vec!["AWS"]);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_structured_cv(&messy_cv());
        let twice = sanitize_structured_cv(&once);
        assert_eq!(once, twice);

        let empty = sanitize_structured_cv(&StructuredCv::default());
        assert_eq!(empty, StructuredCv::default());
        assert_eq!(sanitize_structured_cv(&empty), empty);
    }

    #[test]
    fn test_sanitized_lists_have_no_case_insensitive_duplicates() {
        let cv = sanitize_structured_cv(&messy_cv());
        for list in [&cv.education, &cv.skills, &cv.languages, &cv.additional] {
            let lowered: HashSet<String> = list.iter().map(|v| v.to_lowercase()).collect();
            assert_eq!(lowered.len(), list.len());
        }
    }

    #[test]
    fn test_merge_without_ai_returns_sanitized_heuristic() {
        let heuristic = messy_cv();
        assert_eq!(
            merge_with_fallback(&heuristic, None),
            sanitize_structured_cv(&heuristic)
        );
    }

    #[test]
    fn test_merge_prefers_non_empty_ai_fields() {
        let heuristic = messy_cv();
        let ai = StructuredCv {
            contact: Contact {
                phone: "+33 6 00 00 00 00".into(),
                ..Default::default()
            },
            summary: "   ".into(),
            skills: vec!["Rust".into(), "Go".into()],
            ..Default::default()
        };

        let merged = merge_with_fallback(&heuristic, Some(&ai));
        assert_eq!(merged.contact.full_name, "Jane Roe");
        assert_eq!(merged.contact.phone, "+33 6 00 00 00 00");
        // Whitespace-only AI summary counts as empty.
        assert_eq!(merged.summary, "Backend engineer.");
        assert_eq!(merged.skills, vec!["Rust", "Go"]);
        assert_eq!(merged.education, vec!["MSc", "BSc"]);
        assert_eq!(merged.experiences.len(), 1);
    }
}
