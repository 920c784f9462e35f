//! Document response schemas and prompt catalog shared by the rentscan crates.

pub mod comparison;
pub mod damage;
pub mod dashboard;
pub mod document;
pub mod insurance;
mod lenient;
pub mod license;
pub mod prompts;
pub mod schema;

pub use comparison::{ComparedDamage, ComparedLocation, DamageComparisonResponse};
pub use damage::{
    DamageDetectionResponse, DamageLocation, DamageSummary, DetectedDamage, DimensionsEstimate,
    ImagePoint, Severity,
};
pub use dashboard::{
    DashboardAnalysisResponse, FuelGaugeReading, LightStatus, OdometerReading, OtherIndicator,
    WarningLight,
};
pub use document::DocumentKind;
pub use insurance::{CoveredVehicle, InsuranceOcrResponse};
pub use license::{LicenseAddress, LicenseOcrResponse, PhotoRegion};
pub use prompts::{DEFAULT_LOCATION, PromptPair};
pub use schema::{Checker, ResponseSchema, SchemaError, Violation};
