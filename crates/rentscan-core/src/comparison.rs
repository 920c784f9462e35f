//! Before/after damage comparison record.

use serde::{Deserialize, Serialize};

use crate::damage::Severity;
use crate::lenient;
use crate::schema::{Checker, ResponseSchema};
use crate::DocumentKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparedLocation {
    pub zone: String,
    pub area: String,
}

/// Damage present in the "after" photo but not in the "before" photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedDamage {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub location: ComparedLocation,
    pub description: String,
    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
    /// USD, when the model could estimate it.
    #[serde(default, deserialize_with = "lenient::opt_float")]
    pub estimated_repair_cost: Option<f64>,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn similar() -> String {
    "similar".to_string()
}

/// Comparison of two photos of the same vehicle area, checkout then checkin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageComparisonResponse {
    pub new_damages: Vec<ComparedDamage>,
    /// Damages visible in both photos.
    #[serde(deserialize_with = "lenient::count")]
    pub pre_existing_count: u32,
    /// Damages visible before but not after (repaired).
    #[serde(deserialize_with = "lenient::count")]
    pub resolved_count: u32,
    pub comparison_quality: String,
    pub angle_match: String,
    /// similar, moderate, significant.
    pub lighting_difference: String,
    pub summary: String,
    #[serde(deserialize_with = "lenient::count")]
    pub total_new_damage_count: u32,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub estimated_total_repair_cost: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
    pub notes: String,
}

impl Default for DamageComparisonResponse {
    fn default() -> Self {
        Self {
            new_damages: Vec::new(),
            pre_existing_count: 0,
            resolved_count: 0,
            comparison_quality: unknown(),
            angle_match: unknown(),
            lighting_difference: similar(),
            summary: String::new(),
            total_new_damage_count: 0,
            estimated_total_repair_cost: None,
            confidence: 0.0,
            notes: String::new(),
        }
    }
}

impl DamageComparisonResponse {
    pub fn has_new_damage(&self) -> bool {
        !self.new_damages.is_empty()
    }

    /// Sum of the per-damage estimates the model provided, `None` if it gave none.
    pub fn new_damage_cost(&self) -> Option<f64> {
        self.new_damages
            .iter()
            .filter_map(|d| d.estimated_repair_cost)
            .fold(None, |acc, cost| Some(acc.unwrap_or(0.0) + cost))
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.new_damages.iter().map(|d| d.severity).max()
    }
}

impl ResponseSchema for DamageComparisonResponse {
    const KIND: DocumentKind = DocumentKind::DamageComparison;

    fn check(&self, checker: &mut Checker) {
        checker.confidence("confidence", self.confidence);
        if let Some(total) = self.estimated_total_repair_cost {
            checker.non_negative("estimated_total_repair_cost", total);
        }
        for (i, damage) in self.new_damages.iter().enumerate() {
            checker.confidence(format!("new_damages[{i}].confidence"), damage.confidence);
            if let Some(cost) = damage.estimated_repair_cost {
                checker.non_negative(format!("new_damages[{i}].estimated_repair_cost"), cost);
            }
        }
    }
}
