//! Auto insurance card OCR record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::schema::{Checker, ResponseSchema};
use crate::DocumentKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveredVehicle {
    #[serde(deserialize_with = "lenient::opt_int")]
    pub year: Option<i64>,
    pub make: String,
    pub model: String,
    pub vin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceOcrResponse {
    pub company_name: String,
    pub policy_number: String,
    pub group_number: String,

    #[serde(deserialize_with = "lenient::opt_date")]
    pub effective_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub expiration_date: Option<NaiveDate>,

    pub policyholder_name: String,
    /// self, spouse, dependent, or empty.
    pub policyholder_relationship: String,

    /// liability, collision, comprehensive, full, or a description.
    pub coverage_type: String,
    /// As printed, e.g. `100/300/100`.
    pub liability_limits: String,

    pub covered_vehicles: Vec<CoveredVehicle>,

    pub agent_name: String,
    pub agent_phone: String,
    pub company_phone: String,

    pub naic_number: String,
    pub state: String,

    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
    pub raw_text: String,
}

impl InsuranceOcrResponse {
    /// Whether coverage is in force on `day`. Missing bounds are treated as open.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.effective_date.is_none_or(|from| from <= day)
            && self.expiration_date.is_none_or(|until| day <= until)
    }

    /// Look up a covered vehicle by VIN, ignoring case and surrounding spaces.
    pub fn vehicle_by_vin(&self, vin: &str) -> Option<&CoveredVehicle> {
        let vin = vin.trim();
        self.covered_vehicles
            .iter()
            .find(|v| !v.vin.is_empty() && v.vin.trim().eq_ignore_ascii_case(vin))
    }
}

impl ResponseSchema for InsuranceOcrResponse {
    const KIND: DocumentKind = DocumentKind::InsuranceCard;

    fn check(&self, checker: &mut Checker) {
        checker.confidence("confidence", self.confidence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let r = InsuranceOcrResponse::from_json_str("{}").unwrap();
        assert_eq!(r, InsuranceOcrResponse::default());
        assert!(r.covered_vehicles.is_empty());
        assert!(r.effective_date.is_none());
    }

    #[test]
    fn vehicles_and_dates() {
        let json = r#"{
            "company_name": "State Farm",
            "policy_number": "SF123456789",
            "effective_date": "2024-01-01",
            "expiration_date": "2025-01-01",
            "covered_vehicles": [
                {"year": 2023, "make": "Toyota", "model": "Camry", "vin": "1HGBH41JXMN109186"},
                {"year": "2019", "make": "Honda"}
            ],
            "confidence": 0.92
        }"#;
        let r = InsuranceOcrResponse::from_json_str(json).unwrap();
        assert_eq!(r.covered_vehicles.len(), 2);
        assert_eq!(r.covered_vehicles[1].year, Some(2019));
        assert_eq!(r.covered_vehicles[1].vin, "");
        assert_eq!(
            r.vehicle_by_vin(" 1hgbh41jxmn109186 ").map(|v| v.model.as_str()),
            Some("Camry")
        );
        assert!(r.vehicle_by_vin("").is_none());

        let inside = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(r.covers(inside));
        assert!(!r.covers(after));
    }

    #[test]
    fn null_dates_and_year() {
        let json = r#"{"effective_date": null, "covered_vehicles": [{"year": null}]}"#;
        let r = InsuranceOcrResponse::from_json_str(json).unwrap();
        assert!(r.effective_date.is_none());
        assert_eq!(r.covered_vehicles[0].year, None);
        assert!(r.covers(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn confidence_boundaries() {
        assert!(InsuranceOcrResponse::from_json_str(r#"{"confidence": 1.0}"#).is_ok());
        assert!(InsuranceOcrResponse::from_json_str(r#"{"confidence": 0.0}"#).is_ok());
        assert!(InsuranceOcrResponse::from_json_str(r#"{"confidence": 1.0001}"#).is_err());
        assert!(InsuranceOcrResponse::from_json_str(r#"{"confidence": -0.0001}"#).is_err());
    }
}
