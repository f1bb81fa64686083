use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_BULLETS: usize = 4;
pub const MAX_EDUCATION: usize = 14;
pub const MAX_SKILLS: usize = 18;
pub const MAX_LANGUAGES: usize = 10;
pub const MAX_ADDITIONAL: usize = 12;

/// Treats an explicit JSON `null` like a missing field.
///
/// AI extractions regularly send `"company": null` or `"bullets": null`; those must land
/// on the default value instead of failing the whole document.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(deserialize_with = "null_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_default")]
    pub email: String,
    #[serde(deserialize_with = "null_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_default")]
    pub city: String,
    #[serde(deserialize_with = "null_default")]
    pub website: String,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
            && self.city.is_empty()
            && self.website.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub company: String,
    /// Free-text range exactly as written, e.g. "2020 - Present".
    #[serde(deserialize_with = "null_default")]
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub bullets: Vec<String>,
}

/// The canonical flat résumé shape produced by the heuristic parser and the AI extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredCv {
    #[serde(deserialize_with = "null_default")]
    pub contact: Contact,
    #[serde(deserialize_with = "null_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_default")]
    pub experiences: Vec<Experience>,
    #[serde(deserialize_with = "null_default")]
    pub education: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub languages: Vec<String>,
    /// Certifications and projects.
    #[serde(deserialize_with = "null_default")]
    pub additional: Vec<String>,
}
