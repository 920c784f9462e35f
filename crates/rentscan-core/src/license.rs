//! Driver's license OCR record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::schema::{Checker, ResponseSchema};
use crate::DocumentKind;

fn usa() -> String {
    "USA".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for LicenseAddress {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: usa(),
        }
    }
}

/// Location of the holder's photo, as percentages of the image dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoRegion {
    #[serde(deserialize_with = "lenient::opt_float")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub y: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub height: Option<f64>,
}

/// Fields read from the front of a driver's license.
///
/// Every field is optional in the model's answer; anything omitted takes
/// its default (empty string, `None`, `USA` for the country).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseOcrResponse {
    pub country: String,
    pub issuing_authority: String,

    pub license_number: String,
    pub license_class: String,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub expiration_date: Option<NaiveDate>,

    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub date_of_birth: Option<NaiveDate>,

    pub address: LicenseAddress,

    pub gender: String,
    pub height: String,
    pub weight: String,
    pub eye_color: String,
    pub hair_color: String,

    pub restrictions: String,
    pub endorsements: String,
    pub donor_status: Option<bool>,

    #[serde(deserialize_with = "lenient::float")]
    pub confidence: f64,
    pub raw_text: String,

    pub has_photo: bool,
    pub photo_region: Option<PhotoRegion>,
}

impl Default for LicenseOcrResponse {
    fn default() -> Self {
        Self {
            country: usa(),
            issuing_authority: String::new(),
            license_number: String::new(),
            license_class: String::new(),
            issue_date: None,
            expiration_date: None,
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            address: LicenseAddress::default(),
            gender: String::new(),
            height: String::new(),
            weight: String::new(),
            eye_color: String::new(),
            hair_color: String::new(),
            restrictions: String::new(),
            endorsements: String::new(),
            donor_status: None,
            confidence: 0.0,
            raw_text: String::new(),
            has_photo: false,
            photo_region: None,
        }
    }
}

impl LicenseOcrResponse {
    /// Whether the license expired before `today`. Unknown expiry is not expired.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|exp| exp < today)
    }

    /// First, middle and last name joined with single spaces.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ResponseSchema for LicenseOcrResponse {
    const KIND: DocumentKind = DocumentKind::DriversLicense;

    fn check(&self, checker: &mut Checker) {
        checker.confidence("confidence", self.confidence);
        if let Some(region) = &self.photo_region {
            let members = [
                ("x", region.x),
                ("y", region.y),
                ("width", region.width),
                ("height", region.height),
            ];
            for (name, value) in members {
                if let Some(v) = value {
                    checker.range(format!("photo_region.{name}"), v, 0.0, 100.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaError;

    #[test]
    fn empty_object_takes_defaults() {
        let r = LicenseOcrResponse::from_json_str("{}").unwrap();
        assert_eq!(r.country, "USA");
        assert_eq!(r.address.country, "USA");
        assert_eq!(r.first_name, "");
        assert!(r.issue_date.is_none());
        assert!(r.donor_status.is_none());
        assert!(!r.has_photo);
        assert!(r.photo_region.is_none());
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r, LicenseOcrResponse::default());
    }

    #[test]
    fn full_record() {
        let json = r#"{
            "country": "USA",
            "issuing_authority": "Texas",
            "license_number": "DL12345678",
            "license_class": "C",
            "issue_date": "2020-01-15",
            "expiration_date": "2028-01-15",
            "first_name": "John",
            "middle_name": "Robert",
            "last_name": "Doe",
            "date_of_birth": "1985-05-15",
            "address": {"street": "123 Main St", "city": "Austin", "state": "TX", "zip_code": "78701"},
            "gender": "M",
            "height": "5'10\"",
            "donor_status": true,
            "confidence": 0.95,
            "has_photo": true,
            "photo_region": {"x": 5, "y": 10, "width": 30, "height": 45}
        }"#;
        let r = LicenseOcrResponse::from_json_str(json).unwrap();
        assert_eq!(r.full_name(), "John Robert Doe");
        assert_eq!(r.address.city, "Austin");
        assert_eq!(r.address.country, "USA");
        assert_eq!(r.donor_status, Some(true));
        assert_eq!(r.photo_region.unwrap().height, Some(45.0));
        assert_eq!(r.date_of_birth, NaiveDate::from_ymd_opt(1985, 5, 15));

        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(!r.is_expired(today));
        let later = NaiveDate::from_ymd_opt(2028, 1, 16).unwrap();
        assert!(r.is_expired(later));
    }

    #[test]
    fn confidence_boundaries() {
        for ok in ["0.0", "1.0"] {
            let json = format!(r#"{{"confidence": {ok}}}"#);
            assert!(LicenseOcrResponse::from_json_str(&json).is_ok(), "{ok}");
        }
        for bad in ["-0.0001", "1.0001"] {
            let json = format!(r#"{{"confidence": {bad}}}"#);
            let err = LicenseOcrResponse::from_json_str(&json).unwrap_err();
            assert_eq!(err.fields(), vec!["confidence"], "{bad}");
        }
    }

    #[test]
    fn photo_region_out_of_range() {
        let json = r#"{"photo_region": {"x": 5, "y": 10, "width": 130, "height": 45}}"#;
        let err = LicenseOcrResponse::from_json_str(json).unwrap_err();
        assert_eq!(err.fields(), vec!["photo_region.width"]);
    }

    #[test]
    fn photo_region_members_may_be_missing() {
        let json = r#"{"has_photo": true, "photo_region": {"x": 5, "width": null}}"#;
        let region = LicenseOcrResponse::from_json_str(json).unwrap().photo_region.unwrap();
        assert_eq!(region.x, Some(5.0));
        assert_eq!(region.y, None);
        assert_eq!(region.width, None);

        let empty = LicenseOcrResponse::from_json_str(r#"{"photo_region": {}}"#).unwrap();
        assert_eq!(empty.photo_region, Some(PhotoRegion::default()));

        let err = LicenseOcrResponse::from_json_str(r#"{"photo_region": {"y": 101}}"#).unwrap_err();
        assert_eq!(err.fields(), vec!["photo_region.y"]);
    }

    #[test]
    fn confidence_as_string() {
        let r = LicenseOcrResponse::from_json_str(r#"{"confidence": "0.95"}"#).unwrap();
        assert_eq!(r.confidence, 0.95);

        let err = LicenseOcrResponse::from_json_str(r#"{"confidence": "1.5"}"#).unwrap_err();
        assert_eq!(err.fields(), vec!["confidence"]);
        let err = LicenseOcrResponse::from_json_str(r#"{"confidence": "high"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Shape { .. }));
    }

    #[test]
    fn bad_date_is_a_shape_error() {
        let err = LicenseOcrResponse::from_json_str(r#"{"issue_date": "Jan 2020"}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Shape { .. }));
    }

    #[test]
    fn wrong_type_is_a_shape_error() {
        let err = LicenseOcrResponse::from_json_str(r#"{"first_name": 42}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Shape { .. }));
    }
}
