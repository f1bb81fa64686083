use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The visual template a caller asks for. Drives colours, hierarchy and the page-fit budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemplateChoice {
    #[default]
    OriginalDesignEnhanced,
    ModernExecutive,
    MinimalAts,
}

impl TemplateChoice {
    pub fn label(self) -> &'static str {
        match self {
            TemplateChoice::OriginalDesignEnhanced => "Original Design Enhanced",
            TemplateChoice::ModernExecutive => "Modern Executive",
            TemplateChoice::MinimalAts => "Minimal ATS",
        }
    }

    /// Resolves a display name or one of its aliases. Unknown names fall back to the default.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "modern executive" | "modern sidebar" | "modern accent" => TemplateChoice::ModernExecutive,
            "minimal ats" => TemplateChoice::MinimalAts,
            _ => TemplateChoice::OriginalDesignEnhanced,
        }
    }

    /// Page-fit unit budget. Minimal ATS is the densest layout, so it gets the most room.
    pub fn unit_budget(self) -> f32 {
        match self {
            TemplateChoice::MinimalAts => 98.0,
            TemplateChoice::ModernExecutive => 93.0,
            TemplateChoice::OriginalDesignEnhanced => 95.0,
        }
    }
}

impl fmt::Display for TemplateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TemplateChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TemplateChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TemplateChoice::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_and_fallback() {
        assert_eq!(TemplateChoice::from_name("Modern Sidebar"), TemplateChoice::ModernExecutive);
        assert_eq!(TemplateChoice::from_name("minimal ats"), TemplateChoice::MinimalAts);
        assert_eq!(
            TemplateChoice::from_name("Executive Classic"),
            TemplateChoice::OriginalDesignEnhanced
        );
        assert_eq!(TemplateChoice::from_name("???"), TemplateChoice::OriginalDesignEnhanced);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&TemplateChoice::MinimalAts).unwrap();
        assert_eq!(json, "\"Minimal ATS\"");
        let parsed: TemplateChoice = serde_json::from_str("\"Modern Executive\"").unwrap();
        assert_eq!(parsed, TemplateChoice::ModernExecutive);
    }

    #[test]
    fn test_budgets() {
        assert!(TemplateChoice::MinimalAts.unit_budget() > TemplateChoice::OriginalDesignEnhanced.unit_budget());
        assert!(TemplateChoice::ModernExecutive.unit_budget() < TemplateChoice::OriginalDesignEnhanced.unit_budget());
    }
}
