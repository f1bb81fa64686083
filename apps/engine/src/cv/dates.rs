//! Date-Overlap Analyzer — orders loosely written résumé dates and finds overlapping jobs.
//!
//! Dates are compared on a `year * 100 + month` scale. Empty or yearless tokens sort below
//! every real date, "Present"-style tokens above every real date.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cv::hybrid::HybridExperience;

const MONTH_NAMES: &str = r"(?:jan(?:uary|v(?:ier)?)?|feb(?:ruary)?|f[ée]v(?:rier)?|mar(?:ch|s)?|apr(?:il)?|avr(?:il)?|may|mai|june?|juin|july?|juil(?:let)?|aug(?:ust)?|ao[uû]t|sept?(?:ember|embre)?|oct(?:ober|obre)?|nov(?:ember|embre)?|d[ée]c(?:ember|embre)?)";
const PRESENT_WORDS: &str =
    r"(?:pr[ée]sent|current|now|today|aujourd['’]hui|actuel(?:lement)?|en cours)";

/// A date range as written in résumés: "2019 - 2021", "03/2020 – Present", "Jan 2018 - 2020".
pub static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let point = format!(r"(?:(?:0?[1-9]|1[0-2])[/.]\s?|\b{MONTH_NAMES}\.?\s+)?\b(?:19|20)\d{{2}}\b");
    Regex::new(&format!(
        r"(?i){point}(?:\s*[-–—]\s*(?:{point}|\b{PRESENT_WORDS}\b))?"
    ))
    .unwrap()
});

pub static PRESENT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b{PRESENT_WORDS}\b")).unwrap());

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:19|20)\d{2}").unwrap());
static MONTH_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(0?[1-9]|1[0-2])(?:[/.\-]|\s|$)").unwrap());
static MONTH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:19|20)\d{2}[/.\-](0?[1-9]|1[0-2])\b").unwrap());
static MONTH_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({MONTH_NAMES})\b")).unwrap());
static SPACED_RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[–—]\s*|\s+-\s+").unwrap());

/// A point on the résumé timeline.
///
/// Variant order is the sort order: unknown dates first, then real months, then ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatePoint {
    Unknown,
    /// `year * 100 + month`
    Month(u32),
    Ongoing,
}

impl DatePoint {
    pub fn is_known(self) -> bool {
        self != DatePoint::Unknown
    }
}

/// A free-text date split into its two ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
    pub is_current: bool,
}

/// Parses one date token onto the comparable timeline.
pub fn parse_date_token(value: &str) -> DatePoint {
    let clean = value.trim().to_lowercase();
    if clean.is_empty() {
        return DatePoint::Unknown;
    }
    if PRESENT_TOKEN.is_match(&clean) {
        return DatePoint::Ongoing;
    }
    let Some(year) = YEAR.find(&clean).and_then(|m| m.as_str().parse::<u32>().ok()) else {
        return DatePoint::Unknown;
    };
    let month = month_of(&clean).unwrap_or(1);
    DatePoint::Month(year * 100 + month)
}

fn month_of(clean: &str) -> Option<u32> {
    let numeric = MONTH_SUFFIX
        .captures(clean)
        .or_else(|| MONTH_PREFIX.captures(clean))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    numeric.or_else(|| {
        MONTH_WORD
            .captures(clean)
            .and_then(|caps| caps.get(1))
            .map(|m| month_from_name(m.as_str()))
    })
}

fn month_from_name(name: &str) -> u32 {
    let name = name.to_lowercase();
    const PREFIXES: &[(&str, u32)] = &[
        ("jan", 1),
        ("feb", 2),
        ("fév", 2),
        ("fev", 2),
        ("mar", 3),
        ("apr", 4),
        ("avr", 4),
        ("may", 5),
        ("mai", 5),
        ("juil", 7),
        ("jul", 7),
        ("jun", 6),
        ("juin", 6),
        ("aug", 8),
        ("aoû", 8),
        ("aou", 8),
        ("sep", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
        ("déc", 12),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, month)| *month)
        .unwrap_or(1)
}

/// Splits a free-text range such as "2020 - Present" into start, end and current flag.
///
/// A spaced dash or an en/em dash always separates the ends. A tight hyphen ("2019-2021")
/// only does when both sides look like dates, so "2020-03" stays a single start date.
pub fn split_date_range(date: &str) -> DateRange {
    let date = date.trim();
    let is_current = PRESENT_TOKEN.is_match(date);

    let spaced: Vec<&str> = SPACED_RANGE_SEPARATOR
        .split(date)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let (start, end) = if spaced.len() >= 2 {
        (spaced[0], spaced[1])
    } else {
        match date.split_once('-') {
            Some((left, right)) if looks_like_point(left) && looks_like_point(right) => {
                (left.trim(), right.trim())
            }
            _ => (date, ""),
        }
    };

    DateRange {
        start: start.to_string(),
        end: end.to_string(),
        is_current,
    }
}

fn looks_like_point(value: &str) -> bool {
    let value = value.trim();
    (YEAR.is_match(value) && value.chars().count() >= 4) || PRESENT_TOKEN.is_match(value)
}

/// The point a job is ranked by: ongoing when current, else its end (or start) date.
fn effective_end(experience: &HybridExperience) -> DatePoint {
    if experience.is_current {
        return DatePoint::Ongoing;
    }
    let end = if experience.end_date.is_empty() {
        &experience.start_date
    } else {
        &experience.end_date
    };
    parse_date_token(end)
}

/// Stable sort, most recent first. Current jobs lead; unparseable dates trail.
pub fn sort_experiences_most_recent(experiences: &[HybridExperience]) -> Vec<HybridExperience> {
    let mut sorted = experiences.to_vec();
    sorted.sort_by(|a, b| effective_end(b).cmp(&effective_end(a)));
    sorted
}

/// Reports every pair of jobs whose date intervals intersect, as "A ↔ B".
pub fn detect_date_overlaps(experiences: &[HybridExperience]) -> Vec<String> {
    let intervals: Vec<(String, DatePoint, DatePoint)> = experiences
        .iter()
        .map(|item| {
            let label = format!(
                "{} @ {}",
                if item.job_title.is_empty() { "Poste" } else { &item.job_title },
                if item.company.is_empty() { "Entreprise" } else { &item.company },
            );
            (label, parse_date_token(&item.start_date), effective_end(item))
        })
        .filter(|(_, start, end)| start.is_known() && end.is_known())
        .collect();

    let mut overlaps = Vec::new();
    for (index, left) in intervals.iter().enumerate() {
        for right in &intervals[index + 1..] {
            if left.1 <= right.2 && right.1 <= left.2 {
                overlaps.push(format!("{} ↔ {}", left.0, right.0));
            }
        }
    }
    overlaps
}
