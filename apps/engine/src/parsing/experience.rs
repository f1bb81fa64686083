//! Experience Entry Parser.
//!
//! Each line of the Experience section is classified once, in a fixed priority order, into a
//! [`LineKind`]. The parser is a small state machine over those tags: a header opens an entry,
//! date and company lines complete the header block, bullets and plain lines fill it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::cv::dates::DATE_RANGE;
use crate::cv::models::{Experience, MAX_BULLETS};
use crate::parsing::normalize::{is_bullet, split_parts, strip_bullet, trim_separators};
use crate::parsing::sections::ResumeSection;

const HEADER_MAX_LEN: usize = 85;
const COMPANY_MAX_LEN: usize = 90;
const SHORT_COMPANY_LEN: usize = 60;
const DATE_LINE_REST_MAX_LEN: usize = 40;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s[|@]\s|\s[—–-]\s").unwrap());
static COMPANY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:inc|llc|gmbh|ltd|limited|corp|sas|sarl|sa|plc|ag|bv|group|groupe)\b\.?")
        .unwrap()
});
static ROLE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:manager|engineer|developer|consultant|analyst|lead|director|coordinator|specialist)\b",
    )
    .unwrap()
});

/// How a single Experience line is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Achievement text, glyph removed.
    Bullet(String),
    /// A line that only carries the open entry's date, plus an optional location.
    DateLine { date: String, location: String },
    /// A standalone company name completing the open entry.
    Company(String),
    /// Starts a new entry.
    Header(String),
    Plain(String),
}

/// The first date range found in a line, if any.
pub fn find_date(line: &str) -> Option<&str> {
    DATE_RANGE.find(line).map(|m| m.as_str())
}

fn without_date(line: &str, date: &str) -> String {
    trim_separators(&line.replacen(date, "", 1)).to_string()
}

#[derive(Debug, Default)]
struct Draft {
    title: String,
    company: String,
    date: String,
    location: String,
    bullets: Vec<String>,
}

impl Draft {
    /// Header lines may still follow: nothing but header fields has been collected yet.
    fn header_open(&self) -> bool {
        self.bullets.is_empty()
    }

    fn push_bullet(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || text == self.title || text == self.company {
            return;
        }
        self.bullets.push(text.to_string());
    }

    fn fill_header(&mut self, header: ParsedHeader) {
        self.title = header.title;
        self.company = header.company;
        if !header.location.is_empty() {
            self.location = header.location;
        }
        if !header.date.is_empty() {
            self.date = header.date;
        }
    }

    fn into_experience(self) -> Option<Experience> {
        if !is_valid_title(&self.title) {
            return None;
        }
        let mut bullets = self.bullets;
        bullets.truncate(MAX_BULLETS);
        Some(Experience {
            title: self.title,
            company: self.company,
            date: self.date,
            location: (!self.location.is_empty()).then_some(self.location),
            bullets,
        })
    }
}

fn is_valid_title(title: &str) -> bool {
    let title = title.trim();
    if title.chars().count() <= 1 {
        return false;
    }
    if !title.chars().any(char::is_alphabetic) {
        return false;
    }
    // "2020 - Present" or "Jan 2019" on its own is a date, not a role.
    DATE_RANGE
        .find(title)
        .map_or(true, |m| !trim_separators(&title.replacen(m.as_str(), "", 1)).is_empty())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ParsedHeader {
    title: String,
    company: String,
    date: String,
    location: String,
}

/// Splits "Title — Company | Location | 2020 - Present" into its fields.
fn parse_header(line: &str) -> ParsedHeader {
    let date = find_date(line).unwrap_or_default().to_string();
    let rest = if date.is_empty() {
        trim_separators(line).to_string()
    } else {
        without_date(line, &date)
    };

    let mut parts = split_parts(&rest).into_iter();
    let title = parts
        .next()
        .map(|part| trim_separators(&part).to_string())
        .unwrap_or_default();
    let company = parts.next().unwrap_or_default();
    let location = parts.collect::<Vec<_>>().join(", ");

    ParsedHeader {
        title,
        company,
        date,
        location,
    }
}

fn looks_like_company(line: &str) -> bool {
    if line.chars().any(|c| c.is_ascii_digit()) || line.chars().count() > COMPANY_MAX_LEN {
        return false;
    }
    SEPARATOR.is_match(line)
        || COMPANY_SUFFIX.is_match(line)
        || line.chars().count() <= SHORT_COMPANY_LEN
}

/// Classifies one line against the entry currently being built.
pub fn classify_line(line: &str, open_entry: Option<(&str, &str, &str)>) -> LineKind {
    let line = line.trim();
    if is_bullet(line) {
        return LineKind::Bullet(strip_bullet(line).to_string());
    }

    // `open_entry` is the (title, company, date) of the header block still being built.
    let date = find_date(line);
    if let Some(date) = date {
        let rest = without_date(line, date);
        let rest_is_location = rest.is_empty()
            || (split_parts(&rest).len() == 1 && rest.chars().count() <= DATE_LINE_REST_MAX_LEN);
        let accepts_date = open_entry.is_some_and(|(_, _, open_date)| open_date.is_empty());
        if rest_is_location && accepts_date {
            return LineKind::DateLine {
                date: date.to_string(),
                location: rest,
            };
        }
    }

    if let Some((title, company, _)) = open_entry {
        if date.is_none() && !title.is_empty() && company.is_empty() && looks_like_company(line) {
            return LineKind::Company(trim_separators(line).to_string());
        }
    }

    if date.is_some() || SEPARATOR.is_match(line) || line.chars().count() < HEADER_MAX_LEN {
        return LineKind::Header(line.to_string());
    }
    LineKind::Plain(line.to_string())
}

/// Segments the lines of an Experience section into entries.
pub fn parse_experience_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Experience> {
    let mut entries = Vec::new();
    let mut current: Option<Draft> = None;

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let open = current
            .as_ref()
            .filter(|draft| draft.header_open())
            .map(|draft| (draft.title.as_str(), draft.company.as_str(), draft.date.as_str()));

        match classify_line(line, open) {
            LineKind::Bullet(text) | LineKind::Plain(text) => match current.as_mut() {
                Some(draft) => draft.push_bullet(&text),
                None => {
                    current = Some(Draft {
                        title: text,
                        ..Default::default()
                    })
                }
            },
            LineKind::DateLine { date, location } => {
                if let Some(draft) = current.as_mut() {
                    draft.date = date;
                    if draft.location.is_empty() {
                        draft.location = location;
                    }
                }
            }
            LineKind::Company(company) => {
                if let Some(draft) = current.as_mut() {
                    draft.company = company;
                }
            }
            LineKind::Header(text) => {
                let header = parse_header(&text);
                match current.as_mut() {
                    // A leading date line opened this entry; the header completes it.
                    Some(draft) if draft.title.is_empty() && draft.bullets.is_empty() => {
                        draft.fill_header(header);
                    }
                    _ => {
                        if let Some(done) = current.take() {
                            entries.extend(done.into_experience());
                        }
                        let mut draft = Draft::default();
                        draft.fill_header(header);
                        current = Some(draft);
                    }
                }
            }
        }
    }

    if let Some(done) = current {
        entries.extend(done.into_experience());
    }
    entries
}

/// Last-resort entry recovery when the Experience section yields nothing.
///
/// Every non-Education line that carries a date or a role keyword opens an entry; bullet
/// lines that directly follow it in the same section become its achievements.
pub fn recover_experiences(sections: &[ResumeSection]) -> Vec<Experience> {
    let mut entries = Vec::new();

    for section in sections.iter().filter(|s| s.heading != "Education") {
        let mut current: Option<Draft> = None;
        for line in &section.lines {
            let candidate = !is_bullet(line) && (find_date(line).is_some() || ROLE_KEYWORD.is_match(line));
            if candidate {
                if let Some(done) = current.take() {
                    entries.extend(done.into_experience());
                }
                let mut draft = Draft::default();
                draft.fill_header(parse_header(line));
                current = Some(draft);
            } else if is_bullet(line) {
                if let Some(draft) = current.as_mut() {
                    draft.push_bullet(strip_bullet(line));
                }
            } else if let Some(done) = current.take() {
                entries.extend(done.into_experience());
            }
        }
        if let Some(done) = current {
            entries.extend(done.into_experience());
        }
    }

    debug!(recovered = entries.len(), "Experience fallback scan finished");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn test_title_company_then_date_line() {
        let entries = parse_experience_lines(&lines(
            "Senior Engineer — Acme Corp\n2020 - Present\n- Shipped X\n- Led Y",
        ));
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0],
            Experience {
                title: "Senior Engineer".into(),
                company: "Acme Corp".into(),
                date: "2020 - Present".into(),
                location: None,
                bullets: vec!["Shipped X".into(), "Led Y".into()],
            }
        );
    }

    #[test]
    fn test_inline_date_and_location() {
        let entries = parse_experience_lines(&lines(
            "Data Analyst | Beta Inc | Lyon | 01/2017 – 12/2019\n• Built dashboards\nBackend Developer - Gamma (2014-2016)\n- Wrote APIs",
        ));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Data Analyst");
        assert_eq!(entries[0].company, "Beta Inc");
        assert_eq!(entries[0].location.as_deref(), Some("Lyon"));
        assert_eq!(entries[0].date, "01/2017 – 12/2019");
        assert_eq!(entries[1].title, "Backend Developer");
        assert_eq!(entries[1].company, "Gamma");
        assert_eq!(entries[1].date, "2014-2016");
        assert_eq!(entries[1].bullets, vec!["Wrote APIs"]);
    }

    #[test]
    fn test_company_line_backfills_open_entry() {
        let entries = parse_experience_lines(&lines(
            "Product Manager\nGlobex GmbH\nMar 2018 - 2021 | Berlin\n- Ran discovery",
        ));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Globex GmbH");
        assert_eq!(entries[0].date, "Mar 2018 - 2021");
        assert_eq!(entries[0].location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_leading_date_line_attaches_to_following_header() {
        let entries =
            parse_experience_lines(&lines("2019 - 2021\nConsultant — Initech\n- Audited systems"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Consultant");
        assert_eq!(entries[0].date, "2019 - 2021");
    }

    #[test]
    fn test_bullets_capped_at_four_in_document_order() {
        let entries = parse_experience_lines(&lines(
            "Engineer — Acme\n- one\n- two\n- three\n- four\n- five\n- six",
        ));
        assert_eq!(entries[0].bullets, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_long_plain_lines_become_bullets() {
        let long = "Designed and operated a multi-region event pipeline processing two billion messages a day";
        assert!(long.len() >= HEADER_MAX_LEN);
        let entries = parse_experience_lines(&["Engineer — Acme 2019 - 2020".to_string(), long.to_string()]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bullets, vec![long]);
    }

    #[test]
    fn test_date_like_titles_are_discarded() {
        assert!(parse_experience_lines(&lines("X\n2020")).is_empty());
        assert!(!is_valid_title("2020 - Present"));
        assert!(!is_valid_title("A"));
        assert!(is_valid_title("Engineer"));
    }

    #[test]
    fn test_classifier_priority() {
        assert_eq!(classify_line("- Shipped 2020 - 2021 release", None), LineKind::Bullet("Shipped 2020 - 2021 release".into()));
        assert_eq!(
            classify_line("2020 - Present", Some(("Engineer", "Acme", ""))),
            LineKind::DateLine { date: "2020 - Present".into(), location: String::new() }
        );
        assert_eq!(
            classify_line("Acme Corp", Some(("Engineer", "", ""))),
            LineKind::Company("Acme Corp".into())
        );
        assert_eq!(
            classify_line("Acme Corp", Some(("Engineer", "Other", ""))),
            LineKind::Header("Acme Corp".into())
        );
    }

    #[test]
    fn test_recover_experiences_from_other_sections() {
        let sections = vec![
            ResumeSection::new(
                "Summary",
                vec![
                    "Lead Engineer at Hooli, 2018 - 2022".into(),
                    "- Scaled search".into(),
                    "Loves hiking and chess.".into(),
                ],
            ),
            ResumeSection::new("Education", vec!["MSc Physics 2012 - 2014".into()]),
        ];
        let recovered = recover_experiences(&sections);
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].date, "2018 - 2022");
        assert_eq!(recovered[0].bullets, vec!["Scaled search"]);
    }
}
