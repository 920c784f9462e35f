//! Dashboard / instrument cluster record: mileage, fuel, warning lights.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::schema::{Checker, ResponseSchema};
use crate::DocumentKind;

fn miles() -> String {
    "miles".to_string()
}

fn digital() -> String {
    "digital".to_string()
}

fn unknown() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdometerReading {
    #[serde(deserialize_with = "lenient::int")]
    pub reading: i64,
    /// miles or kilometers.
    #[serde(default = "miles")]
    pub unit: String,
    /// digital or analog.
    #[serde(default = "digital")]
    pub display_type: String,
    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
    /// Exactly what was visible on the odometer.
    #[serde(default)]
    pub raw_reading: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelGaugeReading {
    /// empty, 1/8, 1/4, 3/8, 1/2, 5/8, 3/4, 7/8, full.
    pub level: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub percentage: i64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub confidence: f64,
}

/// Warning light state. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LightStatus {
    On,
    Off,
    Blinking,
    Unknown,
}

impl LightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Blinking => "blinking",
            Self::Unknown => "unknown",
        }
    }

    /// Lit, steadily or blinking.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::On | Self::Blinking)
    }
}

impl TryFrom<String> for LightStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "blinking" => Ok(Self::Blinking),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!(
                "unknown light status {value:?}, expected on, off, blinking or unknown"
            )),
        }
    }
}

impl fmt::Display for LightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningLight {
    /// check_engine, oil_pressure, battery, tire_pressure, ...
    pub indicator: String,
    pub status: LightStatus,
    #[serde(default)]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::float")]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherIndicator {
    pub indicator: String,
    pub status: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardAnalysisResponse {
    /// `None` when the odometer was not visible or readable.
    pub odometer: Option<OdometerReading>,
    pub fuel_gauge: Option<FuelGaugeReading>,
    pub warning_lights: Vec<WarningLight>,
    pub other_indicators: Vec<OtherIndicator>,
    pub image_quality: String,
    pub notes: String,
    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
}

impl Default for DashboardAnalysisResponse {
    fn default() -> Self {
        Self {
            odometer: None,
            fuel_gauge: None,
            warning_lights: Vec::new(),
            other_indicators: Vec::new(),
            image_quality: unknown(),
            notes: String::new(),
            confidence: 0.0,
        }
    }
}

impl DashboardAnalysisResponse {
    /// Warning lights that are on or blinking.
    pub fn active_warnings(&self) -> impl Iterator<Item = &WarningLight> {
        self.warning_lights.iter().filter(|w| w.status.is_active())
    }

    pub fn mileage(&self) -> Option<i64> {
        self.odometer.as_ref().map(|o| o.reading)
    }
}

impl ResponseSchema for DashboardAnalysisResponse {
    const KIND: DocumentKind = DocumentKind::DashboardAnalysis;

    fn check(&self, checker: &mut Checker) {
        checker.confidence("confidence", self.confidence);
        if let Some(odometer) = &self.odometer {
            checker.confidence("odometer.confidence", odometer.confidence);
            if odometer.reading < 0 {
                checker.fail("odometer.reading", format!("{} is negative", odometer.reading));
            }
        }
        if let Some(fuel) = &self.fuel_gauge {
            checker.range("fuel_gauge.percentage", fuel.percentage as f64, 0.0, 100.0);
            checker.confidence("fuel_gauge.confidence", fuel.confidence);
        }
        for (i, light) in self.warning_lights.iter().enumerate() {
            checker.confidence(format!("warning_lights[{i}].confidence"), light.confidence);
        }
    }
}
