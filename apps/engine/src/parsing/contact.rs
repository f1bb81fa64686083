//! Contact Extractor — pulls name, email, phone, website and city out of the résumé header.
//!
//! Each field is matched independently over the same window of lines, so one pattern never
//! steals a line another pattern needs.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cv::dates::DATE_RANGE;
use crate::cv::models::Contact;
use crate::parsing::normalize::canonical_heading;

/// How many leading lines are scanned for contact details.
pub const CONTACT_WINDOW: usize = 12;

const NAME_MAX_LEN: usize = 42;
const LOCATION_LINE_MAX_LEN: usize = 48;
const PHONE_MIN_DIGITS: usize = 9;
const PHONE_MAX_DIGITS: usize = 15;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap());
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\+|00)?\(?\d[\d\s().-]{6,}\d").unwrap());
static WEBSITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?(?:linkedin\.com/[\w\-/%]+|github\.com/[\w\-]+|[\w-]+\.(?:dev|io|com|fr)\b)",
    )
    .unwrap()
});
static PROTOCOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());
static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(?:Paris|Lyon|Marseille|Toulouse|Nantes|Bordeaux|Lille|Nice|Strasbourg|Montpellier|",
        r"Rennes|Grenoble|London|Berlin|Madrid|Barcelona|Amsterdam|Bruxelles|Brussels|Genève|",
        r"Geneva|Lausanne|Zurich|Luxembourg|Montréal|Montreal|Remote|Télétravail|France|",
        r"Belgique|Belgium|Suisse|Switzerland|Canada)\b"
    ))
    .unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactScan {
    pub contact: Contact,
    /// Indices of lines that yielded a field; the segmenter skips them.
    pub consumed: BTreeSet<usize>,
}

fn is_name_word(word: &str) -> bool {
    let mut chars = word.chars();
    let starts_upper = chars.next().is_some_and(char::is_uppercase);
    let rest: Vec<char> = chars.collect();
    starts_upper
        && !rest.is_empty()
        && rest
            .iter()
            .all(|c| c.is_alphabetic() || matches!(c, '\'' | '’' | '-'))
}

/// True for "Jane Roe", "Jean-Luc Picard" or "MARIE CURIE": 2-4 capitalised words, no digits.
pub fn looks_like_name(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > NAME_MAX_LEN {
        return false;
    }
    if line.chars().any(|c| c == '@' || c.is_ascii_digit()) || canonical_heading(line).is_some() {
        return false;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    (2..=4).contains(&words.len()) && words.iter().all(|word| is_name_word(word))
}

fn find_phone(line: &str) -> Option<String> {
    PHONE
        .find_iter(line)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = candidate.chars().filter(char::is_ascii_digit).count();
            (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
        })
        .map(String::from)
}

fn find_website(line: &str) -> Option<String> {
    // Blank out emails first so "jane@roe.io" is not read as the site "roe.io".
    let without_emails = EMAIL.replace_all(line, " ");
    WEBSITE
        .find(&without_emails)
        .map(|m| PROTOCOL.replace(m.as_str(), "").to_string())
}

/// Scans the first [`CONTACT_WINDOW`] lines and keeps the first hit for each field.
pub fn extract_contact<S: AsRef<str>>(lines: &[S]) -> ContactScan {
    let mut scan = ContactScan::default();

    if let Some(first) = lines.first() {
        if looks_like_name(first.as_ref()) {
            scan.contact.full_name = first.as_ref().trim().to_string();
            scan.consumed.insert(0);
        }
    }

    for (index, line) in lines.iter().take(CONTACT_WINDOW).enumerate() {
        let line = line.as_ref();
        let contact = &mut scan.contact;

        if contact.email.is_empty() {
            if let Some(email) = EMAIL.find(line) {
                contact.email = email.as_str().to_string();
                scan.consumed.insert(index);
            }
        }
        if contact.phone.is_empty() {
            if let Some(phone) = find_phone(line) {
                contact.phone = phone;
                scan.consumed.insert(index);
            }
        }
        if contact.website.is_empty() {
            if let Some(site) = find_website(line) {
                contact.website = site;
                scan.consumed.insert(index);
            }
        }
        if contact.city.is_empty() {
            if let Some(city) = LOCATION.find(line) {
                contact.city = city.as_str().to_string();
                // Only a short, undated line is a pure location line.
                if line.chars().count() <= LOCATION_LINE_MAX_LEN && !DATE_RANGE.is_match(line) {
                    scan.consumed.insert(index);
                }
            }
        }
    }

    scan
}
