use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::detector::{HierarchyStyle, LayoutMetadata, LayoutType};

/// Discrete render template picked from the layout signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateVariant {
    #[serde(rename = "template_two_column_left_v2")]
    TwoColumnLeft,
    #[serde(rename = "template_two_column_right_v2")]
    TwoColumnRight,
    #[serde(rename = "template_minimal_compact")]
    MinimalCompact,
    #[serde(rename = "template_executive_balanced")]
    ExecutiveBalanced,
    #[serde(rename = "template_asymmetric_signature")]
    AsymmetricSignature,
}

impl TemplateVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateVariant::TwoColumnLeft => "template_two_column_left_v2",
            TemplateVariant::TwoColumnRight => "template_two_column_right_v2",
            TemplateVariant::MinimalCompact => "template_minimal_compact",
            TemplateVariant::ExecutiveBalanced => "template_executive_balanced",
            TemplateVariant::AsymmetricSignature => "template_asymmetric_signature",
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout type decides first; single-column layouts fall through to the hierarchy style.
pub fn map_layout_to_variant(metadata: &LayoutMetadata) -> TemplateVariant {
    match metadata.layout_type {
        LayoutType::TwoColumnLeft => TemplateVariant::TwoColumnLeft,
        LayoutType::TwoColumnRight => TemplateVariant::TwoColumnRight,
        LayoutType::MultiBlockAsymmetric => TemplateVariant::AsymmetricSignature,
        LayoutType::SingleColumn if metadata.hierarchy_style == HierarchyStyle::Minimal => {
            TemplateVariant::MinimalCompact
        }
        LayoutType::SingleColumn => TemplateVariant::ExecutiveBalanced,
    }
}
