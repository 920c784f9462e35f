//! Vehicle damage detection record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::schema::{Checker, ResponseSchema};
use crate::DocumentKind;

/// Damage severity. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            _ => Err(format!(
                "unknown severity {value:?}, expected minor, moderate or severe"
            )),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in the image, as percentages of its width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePoint {
    #[serde(deserialize_with = "lenient::opt_float")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageLocation {
    /// front, back, driver_side, passenger_side, roof, hood, trunk, interior.
    pub zone: String,
    /// bumper, fender, door, wheel, windshield, ...
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub coordinates: Option<ImagePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionsEstimate {
    #[serde(deserialize_with = "lenient::opt_float")]
    pub length_cm: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub width_cm: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub depth_mm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedDamage {
    /// scratch, dent, crack, chip, stain, tear, missing, rust, other.
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub location: DamageLocation,
    #[serde(default)]
    pub dimensions_estimate: Option<DimensionsEstimate>,
    pub description: String,
    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageSummary {
    #[serde(deserialize_with = "lenient::count")]
    pub total_count: u32,
    #[serde(deserialize_with = "lenient::count_map")]
    pub by_type: BTreeMap<String, u32>,
    #[serde(deserialize_with = "lenient::count_map")]
    pub by_severity: BTreeMap<String, u32>,
}

fn unknown() -> String {
    "unknown".to_string()
}

/// Damage found in a single vehicle photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageDetectionResponse {
    pub damages: Vec<DetectedDamage>,
    /// excellent, good, fair, poor, damaged.
    pub overall_condition: String,
    pub summary: DamageSummary,
    pub image_quality: String,
    pub notes: String,
    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
}

impl Default for DamageDetectionResponse {
    fn default() -> Self {
        Self {
            damages: Vec::new(),
            overall_condition: unknown(),
            summary: DamageSummary::default(),
            image_quality: unknown(),
            notes: String::new(),
            confidence: 0.0,
        }
    }
}

impl DamageDetectionResponse {
    pub fn max_severity(&self) -> Option<Severity> {
        self.damages.iter().map(|d| d.severity).max()
    }

    /// Damages at or above `threshold` confidence.
    pub fn confident_damages(&self, threshold: f64) -> impl Iterator<Item = &DetectedDamage> {
        self.damages.iter().filter(move |d| d.confidence >= threshold)
    }

    /// Counts by severity computed from the damage list rather than trusted
    /// from the model's own summary.
    pub fn severity_counts(&self) -> BTreeMap<Severity, u32> {
        let mut counts = BTreeMap::new();
        for damage in &self.damages {
            *counts.entry(damage.severity).or_insert(0) += 1;
        }
        counts
    }
}

impl ResponseSchema for DamageDetectionResponse {
    const KIND: DocumentKind = DocumentKind::DamageDetection;

    fn check(&self, checker: &mut Checker) {
        checker.confidence("confidence", self.confidence);
        for (i, damage) in self.damages.iter().enumerate() {
            checker.confidence(format!("damages[{i}].confidence"), damage.confidence);
            if let Some(point) = &damage.location.coordinates {
                for (axis, value) in [("x", point.x), ("y", point.y)] {
                    if let Some(v) = value {
                        checker.range(format!("damages[{i}].location.coordinates.{axis}"), v, 0.0, 100.0);
                    }
                }
            }
            if let Some(dims) = &damage.dimensions_estimate {
                let sizes = [
                    ("length_cm", dims.length_cm),
                    ("width_cm", dims.width_cm),
                    ("depth_mm", dims.depth_mm),
                ];
                for (name, value) in sizes {
                    if let Some(v) = value {
                        checker.non_negative(format!("damages[{i}].dimensions_estimate.{name}"), v);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaError;

    const SAMPLE: &str = r#"{
        "damages": [
            {
                "type": "scratch",
                "severity": "minor",
                "location": {"zone": "front", "area": "bumper", "coordinates": {"x": 45, "y": 80}},
                "dimensions_estimate": {"length_cm": 6.0, "width_cm": 0.2},
                "description": "Light scratch on front bumper",
                "confidence": 0.92
            },
            {
                "type": "dent",
                "severity": "Moderate",
                "location": {"zone": "driver_side"},
                "description": "Dent on driver door",
                "confidence": 0.7
            }
        ],
        "overall_condition": "good",
        "summary": {"total_count": 2, "by_type": {"scratch": 1, "dent": 1}, "by_severity": {"minor": 1, "moderate": 1}},
        "image_quality": "good",
        "confidence": 0.9
    }"#;

    #[test]
    fn empty_object_takes_defaults() {
        let r = DamageDetectionResponse::from_json_str("{}").unwrap();
        assert!(r.damages.is_empty());
        assert_eq!(r.overall_condition, "unknown");
        assert_eq!(r.image_quality, "unknown");
        assert_eq!(r.summary.total_count, 0);
        assert!(r.summary.by_type.is_empty());
        assert_eq!(r.notes, "");
        assert!(r.max_severity().is_none());
    }

    #[test]
    fn sample_parses() {
        let r = DamageDetectionResponse::from_json_str(SAMPLE).unwrap();
        assert_eq!(r.damages.len(), 2);
        assert_eq!(r.damages[0].kind, "scratch");
        assert_eq!(r.damages[0].location.coordinates, Some(ImagePoint { x: Some(45.0), y: Some(80.0) }));
        assert_eq!(r.damages[1].severity, Severity::Moderate);
        assert_eq!(r.damages[1].location.area, "");
        assert!(r.damages[1].dimensions_estimate.is_none());
        assert_eq!(r.max_severity(), Some(Severity::Moderate));
        assert_eq!(r.confident_damages(0.9).count(), 1);
        assert_eq!(r.severity_counts().get(&Severity::Minor), Some(&1));
        assert_eq!(r.summary.by_type.get("dent"), Some(&1));
    }

    #[test]
    fn damage_requires_description() {
        let json = r#"{"damages": [{"type": "dent", "severity": "minor", "location": {"zone": "front"}, "confidence": 0.5}]}"#;
        let err = DamageDetectionResponse::from_json_str(json).unwrap_err();
        assert!(matches!(err, SchemaError::Shape { .. }));
        assert_eq!(err.fields(), vec!["description"]);
    }

    #[test]
    fn unknown_severity_rejected() {
        let json = r#"{"damages": [{"type": "dent", "severity": "catastrophic", "location": {"zone": "front"}, "description": "x", "confidence": 0.5}]}"#;
        let err = DamageDetectionResponse::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("unknown severity"), "{err}");
    }

    #[test]
    fn nested_confidence_named() {
        let json = r#"{"damages": [{"type": "dent", "severity": "minor", "location": {"zone": "front"}, "description": "x", "confidence": 1.0001}]}"#;
        let err = DamageDetectionResponse::from_json_str(json).unwrap_err();
        assert_eq!(err.fields(), vec!["damages[0].confidence"]);
    }

    #[test]
    fn coordinates_and_dimensions_checked() {
        let json = r#"{"damages": [{
            "type": "dent", "severity": "minor",
            "location": {"zone": "front", "coordinates": {"x": 120, "y": 50}},
            "dimensions_estimate": {"length_cm": -2.0},
            "description": "x", "confidence": 0.5
        }]}"#;
        let err = DamageDetectionResponse::from_json_str(json).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![
                "damages[0].location.coordinates.x",
                "damages[0].dimensions_estimate.length_cm"
            ]
        );
    }

    #[test]
    fn confidence_boundaries() {
        for ok in ["0.0", "1.0"] {
            let json = format!(r#"{{"confidence": {ok}}}"#);
            assert!(DamageDetectionResponse::from_json_str(&json).is_ok(), "{ok}");

            let json = format!(
                r#"{{"damages": [{{"type": "dent", "severity": "minor", "location": {{"zone": "front"}}, "description": "x", "confidence": {ok}}}]}}"#
            );
            assert!(DamageDetectionResponse::from_json_str(&json).is_ok(), "{ok}");
        }
        for bad in ["-0.0001", "1.0001"] {
            let json = format!(r#"{{"confidence": {bad}}}"#);
            let err = DamageDetectionResponse::from_json_str(&json).unwrap_err();
            assert_eq!(err.fields(), vec!["confidence"], "{bad}");

            let json = format!(
                r#"{{"damages": [{{"type": "dent", "severity": "minor", "location": {{"zone": "front"}}, "description": "x", "confidence": {bad}}}]}}"#
            );
            let err = DamageDetectionResponse::from_json_str(&json).unwrap_err();
            assert_eq!(err.fields(), vec!["damages[0].confidence"], "{bad}");
        }
    }

    #[test]
    fn coordinates_may_be_partial() {
        let json = r#"{"damages": [
            {"type": "dent", "severity": "minor", "location": {"zone": "front", "coordinates": {}}, "description": "x", "confidence": 0.5},
            {"type": "dent", "severity": "minor", "location": {"zone": "front", "coordinates": {"x": 45}}, "description": "y", "confidence": 0.5}
        ]}"#;
        let r = DamageDetectionResponse::from_json_str(json).unwrap();
        assert_eq!(r.damages[0].location.coordinates, Some(ImagePoint::default()));
        assert_eq!(r.damages[1].location.coordinates, Some(ImagePoint { x: Some(45.0), y: None }));

        let json = r#"{"damages": [{"type": "dent", "severity": "minor", "location": {"zone": "front", "coordinates": {"y": -1}}, "description": "x", "confidence": 0.5}]}"#;
        let err = DamageDetectionResponse::from_json_str(json).unwrap_err();
        assert_eq!(err.fields(), vec!["damages[0].location.coordinates.y"]);
    }

    #[test]
    fn numbers_as_strings() {
        let json = r#"{
            "damages": [{
                "type": "dent", "severity": "minor", "location": {"zone": "front"},
                "dimensions_estimate": {"length_cm": "4.5", "depth_mm": ""},
                "description": "x", "confidence": "0.8"
            }],
            "summary": {"total_count": "1", "by_type": {"dent": "1"}, "by_severity": {"minor": 1, "severe": null}},
            "confidence": "0.85"
        }"#;
        let r = DamageDetectionResponse::from_json_str(json).unwrap();
        assert_eq!(r.confidence, 0.85);
        assert_eq!(r.damages[0].confidence, 0.8);
        let dims = r.damages[0].dimensions_estimate.as_ref().unwrap();
        assert_eq!(dims.length_cm, Some(4.5));
        assert_eq!(dims.depth_mm, None);
        assert_eq!(r.summary.by_type.get("dent"), Some(&1));
        assert_eq!(r.summary.by_severity.get("severe"), Some(&0));
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Severe).unwrap(), "\"severe\"");
        assert!(Severity::Minor < Severity::Severe);
    }
}
