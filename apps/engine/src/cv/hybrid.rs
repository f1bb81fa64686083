//! The hybrid form: the field-by-field editable résumé shape used during guided correction,
//! plus the adapters to and from [`StructuredCv`].

use serde::{Deserialize, Serialize};

use crate::cv::dates::{sort_experiences_most_recent, split_date_range};
use crate::cv::models::{null_default, Contact, Experience, StructuredCv};
use crate::cv::sanitize::{clean_list, dedupe_case_insensitive, sanitize_structured_cv};
use crate::parsing::normalize::split_parts;

pub const MAX_ACHIEVEMENTS: usize = 6;
pub const MAX_SKILL_ITEMS: usize = 30;
pub const MAX_EXTRA_ITEMS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HybridPersonalInfo {
    #[serde(deserialize_with = "null_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_default")]
    pub city: String,
    #[serde(deserialize_with = "null_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_default")]
    pub email: String,
    #[serde(deserialize_with = "null_default")]
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HybridExperience {
    #[serde(deserialize_with = "null_default")]
    pub job_title: String,
    #[serde(deserialize_with = "null_default")]
    pub company: String,
    #[serde(deserialize_with = "null_default")]
    pub location: String,
    #[serde(deserialize_with = "null_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_default")]
    pub is_current: bool,
    #[serde(deserialize_with = "null_default")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HybridEducation {
    #[serde(deserialize_with = "null_default")]
    pub degree: String,
    #[serde(deserialize_with = "null_default")]
    pub institution: String,
    #[serde(deserialize_with = "null_default")]
    pub location: String,
    #[serde(deserialize_with = "null_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_default")]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HybridLanguage {
    #[serde(deserialize_with = "null_default")]
    pub language: String,
    #[serde(deserialize_with = "null_default")]
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HybridCvForm {
    #[serde(deserialize_with = "null_default")]
    pub personal_info: HybridPersonalInfo,
    #[serde(deserialize_with = "null_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_default")]
    pub experience: Vec<HybridExperience>,
    #[serde(deserialize_with = "null_default")]
    pub education: Vec<HybridEducation>,
    #[serde(deserialize_with = "null_default")]
    pub hard_skills: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub soft_skills: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub languages: Vec<HybridLanguage>,
    #[serde(deserialize_with = "null_default")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub volunteering: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub interests: Vec<String>,
}

impl HybridCvForm {
    /// Characters across every text field, as counted against the boundary input limit.
    pub fn text_chars(&self) -> usize {
        let count = |value: &String| value.chars().count();
        let list = |values: &[String]| values.iter().map(count).sum::<usize>();
        let info = &self.personal_info;

        let personal = [&info.full_name, &info.city, &info.phone, &info.email, &info.linkedin]
            .into_iter()
            .map(count)
            .sum::<usize>();
        let experience = self
            .experience
            .iter()
            .map(|item| {
                [&item.job_title, &item.company, &item.location, &item.start_date, &item.end_date]
                    .into_iter()
                    .map(count)
                    .sum::<usize>()
                    + list(&item.achievements)
            })
            .sum::<usize>();
        let education = self
            .education
            .iter()
            .flat_map(|item| {
                [&item.degree, &item.institution, &item.location, &item.start_date, &item.end_date]
            })
            .map(count)
            .sum::<usize>();
        let languages = self
            .languages
            .iter()
            .map(|item| count(&item.language) + count(&item.level))
            .sum::<usize>();

        personal
            + count(&self.summary)
            + experience
            + education
            + languages
            + list(&self.hard_skills)
            + list(&self.soft_skills)
            + list(&self.certifications)
            + list(&self.volunteering)
            + list(&self.interests)
    }
}

/// A blank form with one empty experience slot, ready for manual entry.
pub fn create_empty_hybrid_cv_form() -> HybridCvForm {
    HybridCvForm {
        experience: vec![HybridExperience::default()],
        ..Default::default()
    }
}

fn normalize_date(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

pub fn sanitize_hybrid_cv_form(input: &HybridCvForm) -> HybridCvForm {
    let info = &input.personal_info;
    HybridCvForm {
        personal_info: HybridPersonalInfo {
            full_name: trimmed(&info.full_name),
            city: trimmed(&info.city),
            phone: trimmed(&info.phone),
            email: trimmed(&info.email),
            linkedin: trimmed(&info.linkedin),
        },
        summary: trimmed(&input.summary),
        experience: input
            .experience
            .iter()
            .map(|item| HybridExperience {
                job_title: trimmed(&item.job_title),
                company: trimmed(&item.company),
                location: trimmed(&item.location),
                start_date: normalize_date(&item.start_date),
                end_date: normalize_date(&item.end_date),
                is_current: item.is_current,
                achievements: clean_list(&item.achievements, MAX_ACHIEVEMENTS),
            })
            .filter(|item| {
                !item.job_title.is_empty()
                    || !item.company.is_empty()
                    || !item.start_date.is_empty()
                    || !item.end_date.is_empty()
                    || !item.achievements.is_empty()
            })
            .collect(),
        education: input
            .education
            .iter()
            .map(|item| HybridEducation {
                degree: trimmed(&item.degree),
                institution: trimmed(&item.institution),
                location: trimmed(&item.location),
                start_date: normalize_date(&item.start_date),
                end_date: normalize_date(&item.end_date),
            })
            .filter(|item| !item.degree.is_empty() || !item.institution.is_empty())
            .collect(),
        hard_skills: clean_list(&input.hard_skills, MAX_SKILL_ITEMS),
        soft_skills: clean_list(&input.soft_skills, MAX_SKILL_ITEMS),
        languages: input
            .languages
            .iter()
            .map(|item| HybridLanguage {
                language: trimmed(&item.language),
                level: trimmed(&item.level),
            })
            .filter(|item| !item.language.is_empty())
            .collect(),
        certifications: clean_list(&input.certifications, MAX_EXTRA_ITEMS),
        volunteering: clean_list(&input.volunteering, MAX_EXTRA_ITEMS),
        interests: clean_list(&input.interests, MAX_EXTRA_ITEMS),
    }
}

fn part(parts: &[String], index: usize) -> String {
    parts.get(index).cloned().unwrap_or_default()
}

fn education_from_line(line: &str) -> HybridEducation {
    let parts = split_parts(line);
    HybridEducation {
        degree: part(&parts, 0),
        institution: part(&parts, 1),
        location: parts.get(2..).map(|rest| rest.join(", ")).unwrap_or_default(),
        ..Default::default()
    }
}

fn language_from_line(line: &str) -> HybridLanguage {
    let parts = split_parts(line);
    HybridLanguage {
        language: part(&parts, 0),
        level: parts.get(1..).map(|rest| rest.join(" ")).unwrap_or_default(),
    }
}

/// Spreads a flat résumé over the hybrid form.
///
/// Date strings are split into start/end; "Degree — School — City" education lines and
/// "Language — Level" lines are split on their separators.
pub fn map_structured_to_hybrid(structured: &StructuredCv) -> HybridCvForm {
    let contact = &structured.contact;
    let form = HybridCvForm {
        personal_info: HybridPersonalInfo {
            full_name: contact.full_name.clone(),
            city: contact.city.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            linkedin: contact.website.clone(),
        },
        summary: structured.summary.clone(),
        experience: structured
            .experiences
            .iter()
            .map(|item| {
                let range = split_date_range(&item.date);
                HybridExperience {
                    job_title: item.title.clone(),
                    company: item.company.clone(),
                    location: item.location.clone().unwrap_or_default(),
                    start_date: range.start,
                    end_date: range.end,
                    is_current: range.is_current,
                    achievements: item.bullets.clone(),
                }
            })
            .collect(),
        education: structured
            .education
            .iter()
            .map(|line| education_from_line(line))
            .collect(),
        hard_skills: structured.skills.clone(),
        languages: structured
            .languages
            .iter()
            .map(|line| language_from_line(line))
            .collect(),
        certifications: structured.additional.clone(),
        ..Default::default()
    };
    sanitize_hybrid_cv_form(&form)
}

fn synthesize_date(item: &HybridExperience) -> String {
    if item.is_current {
        if item.start_date.is_empty() {
            return "Present".to_string();
        }
        return format!("{} - Present", item.start_date);
    }
    if item.end_date.is_empty() {
        return item.start_date.clone();
    }
    format!("{} - {}", item.start_date, item.end_date)
        .trim()
        .to_string()
}

fn join_filled(values: &[&str]) -> String {
    values
        .iter()
        .filter(|value| !value.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" — ")
}

/// Collapses the hybrid form back into the flat shape, most recent job first.
///
/// The `date` string is rebuilt from start/end and may not byte-match the original text.
pub fn map_hybrid_to_structured(input: &HybridCvForm) -> StructuredCv {
    let safe = sanitize_hybrid_cv_form(input);
    let info = &safe.personal_info;

    let experiences = sort_experiences_most_recent(&safe.experience)
        .iter()
        .map(|item| Experience {
            title: item.job_title.clone(),
            company: item.company.clone(),
            date: synthesize_date(item),
            location: Some(item.location.clone()),
            bullets: item.achievements.clone(),
        })
        .collect();

    let structured = StructuredCv {
        contact: Contact {
            full_name: info.full_name.clone(),
            email: info.email.clone(),
            phone: info.phone.clone(),
            city: info.city.clone(),
            website: info.linkedin.clone(),
        },
        summary: safe.summary.clone(),
        experiences,
        education: safe
            .education
            .iter()
            .map(|item| {
                join_filled(&[
                    item.degree.as_str(),
                    item.institution.as_str(),
                    item.location.as_str(),
                ])
            })
            .collect(),
        skills: dedupe_case_insensitive(
            safe.hard_skills.iter().chain(&safe.soft_skills).cloned(),
        ),
        languages: safe
            .languages
            .iter()
            .map(|item| join_filled(&[item.language.as_str(), item.level.as_str()]))
            .collect(),
        additional: dedupe_case_insensitive(
            safe.certifications
                .iter()
                .chain(&safe.volunteering)
                .chain(&safe.interests)
                .cloned(),
        ),
    };
    sanitize_structured_cv(&structured)
}

/// Folds per-experience AI summaries into the most-recent-first experience list.
///
/// Summary `i` goes to experience `i`. An entry without achievements gets the summary as its
/// only achievement; otherwise it is prepended unless already present.
pub fn apply_experience_summaries(base: &HybridCvForm, summaries: &[String]) -> HybridCvForm {
    let experience = sort_experiences_most_recent(&base.experience)
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            let Some(summary) = summaries
                .get(index)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
            else {
                return entry;
            };
            let lowered = summary.to_lowercase();
            if entry.achievements.is_empty() {
                entry.achievements = vec![summary.to_string()];
            } else if !entry
                .achievements
                .iter()
                .any(|item| item.to_lowercase() == lowered)
            {
                entry.achievements.insert(0, summary.to_string());
                entry.achievements.truncate(MAX_ACHIEVEMENTS);
            }
            entry
        })
        .collect();

    HybridCvForm {
        experience,
        ..base.clone()
    }
}
