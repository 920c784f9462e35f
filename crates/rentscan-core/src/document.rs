//! The document classes a vision model can be asked to read.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One class of document or photo with its own prompt pair and response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    DriversLicense,
    InsuranceCard,
    DamageDetection,
    DashboardAnalysis,
    DamageComparison,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        Self::DriversLicense,
        Self::InsuranceCard,
        Self::DamageDetection,
        Self::DashboardAnalysis,
        Self::DamageComparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriversLicense => "drivers_license",
            Self::InsuranceCard => "insurance_card",
            Self::DamageDetection => "damage_detection",
            Self::DashboardAnalysis => "dashboard_analysis",
            Self::DamageComparison => "damage_comparison",
        }
    }

    /// Number of images sent with each request for this document.
    pub fn image_count(&self) -> usize {
        match self {
            Self::DamageComparison => 2,
            _ => 1,
        }
    }

    /// Whether the user prompt is rendered with a photo location label.
    pub fn uses_location(&self) -> bool {
        matches!(self, Self::DamageDetection | Self::DamageComparison)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
