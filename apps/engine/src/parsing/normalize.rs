//! Text Normalizer — cleans raw résumé text into trimmed lines and classifies headings.
//!
//! Markdown decoration (`#`, `**`, `__`, backticks) and tabs are removed from every line.
//! Leading bullet glyphs are kept on the line so the experience parser can still tell
//! achievements from entry headers; [`strip_bullet`] removes them for every other consumer.

use once_cell::sync::Lazy;
use regex::Regex;

/// Heading length ceiling used when structuring a résumé.
pub const STRUCTURE_HEADING_MAX_LEN: usize = 54;
/// Heading length ceiling used when laying out free text for rendering.
pub const RENDER_HEADING_MAX_LEN: usize = 46;
/// Heading length ceiling used by the layout detector.
pub const LAYOUT_HEADING_MAX_LEN: usize = 42;

const BULLET_GLYPHS: &[char] = &['-', '•', '▪', '◦'];
const SENTENCE_PUNCTUATION: &str = ".,;!?";
const HEADING_SYMBOLS: &str = "&/'’";

/// Canonical section names, in the order the segmenter recognizes them.
pub const CANONICAL_HEADINGS: &[&str] = &[
    "Summary",
    "Experience",
    "Education",
    "Skills",
    "Projects",
    "Languages",
    "Certifications",
    "Interests",
];

/// English/French heading synonyms, lowercased, mapped to their canonical name.
const HEADING_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "Summary",
        &[
            "summary",
            "professional summary",
            "executive summary",
            "profile",
            "professional profile",
            "profil",
            "profil professionnel",
            "résumé",
            "resume",
            "about",
            "about me",
            "à propos",
            "a propos",
            "objective",
            "objectif",
        ],
    ),
    (
        "Experience",
        &[
            "experience",
            "experiences",
            "work experience",
            "professional experience",
            "expérience",
            "expériences",
            "expérience professionnelle",
            "expériences professionnelles",
            "employment",
            "employment history",
            "career",
            "parcours professionnel",
        ],
    ),
    (
        "Education",
        &[
            "education",
            "formation",
            "formations",
            "academic background",
            "diplômes",
            "études",
        ],
    ),
    (
        "Skills",
        &[
            "skills",
            "compétences",
            "competences",
            "technical skills",
            "core skills",
            "key skills",
            "compétences techniques",
            "competences techniques",
        ],
    ),
    (
        "Projects",
        &["project", "projects", "projet", "projets", "personal projects"],
    ),
    ("Languages", &["language", "languages", "langue", "langues"]),
    (
        "Certifications",
        &[
            "certification",
            "certifications",
            "certificat",
            "certificats",
            "license",
            "licenses",
            "licence",
            "licences",
        ],
    ),
    (
        "Interests",
        &[
            "interest",
            "interests",
            "hobbies",
            "loisirs",
            "centres d'intérêt",
            "centres d’intérêt",
            "centres d'interet",
        ],
    ),
];

static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s*").unwrap());
static PART_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[|@]\s+|\s+[—–]\s+|\s+-\s+").unwrap());

/// Removes markdown decoration from a single line.
pub fn strip_markdown(line: &str) -> String {
    let without_hashes = MARKDOWN_HEADING.replace(line.trim(), "");
    without_hashes
        .replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .trim()
        .to_string()
}

/// Cleans one raw line: tabs become spaces, markdown is stripped, whitespace trimmed.
pub fn clean_line(raw: &str) -> String {
    strip_markdown(&raw.replace('\t', " "))
}

/// Splits a text blob into cleaned, non-empty lines.
pub fn normalize_text(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn is_bullet(line: &str) -> bool {
    line.trim_start().starts_with(BULLET_GLYPHS)
}

/// Removes a single leading bullet glyph and the whitespace after it.
pub fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed
        .strip_prefix(BULLET_GLYPHS)
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Drops a trailing colon so "SKILLS:" and "Skills" compare equal.
pub fn heading_text(line: &str) -> &str {
    line.trim().trim_end_matches(':').trim()
}

/// Looks a heading up in the synonym table (case-insensitive, exact match).
pub fn canonical_heading(line: &str) -> Option<&'static str> {
    let lowered = heading_text(line).to_lowercase();
    HEADING_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&lowered.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Returns true when a cleaned line reads as a section heading.
///
/// Either the line is a known synonym, or it is short, starts with an uppercase letter,
/// has at most four words, carries no sentence punctuation and contains only letters,
/// spaces and `& / '`. Short content lines are sometimes misread as headings; that is
/// preferred over absorbing a real heading into the previous section.
pub fn is_heading(line: &str, max_len: usize) -> bool {
    if is_bullet(line) {
        return false;
    }
    let clean = heading_text(line);
    if clean.is_empty() || clean.chars().count() > max_len {
        return false;
    }
    if canonical_heading(clean).is_some() {
        return true;
    }

    let starts_upper = clean.chars().next().is_some_and(char::is_uppercase);
    let no_punctuation = !clean.chars().any(|c| SENTENCE_PUNCTUATION.contains(c));
    let few_words = clean.split_whitespace().count() <= 4;
    let heading_chars = clean
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || HEADING_SYMBOLS.contains(c));

    starts_upper && no_punctuation && few_words && heading_chars
}

/// Splits "Title — Company | Location" style text on its separator tokens.
pub fn split_parts(text: &str) -> Vec<String> {
    PART_SEPARATOR
        .split(text)
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Trims separator debris left at either end after a token was cut out of a line.
pub fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || "|·•-–—,()".contains(c))
}
