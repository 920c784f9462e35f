//! Vision model layer: an OpenRouter-style chat-completions client and the
//! document parsers built on it.

pub mod client;
pub mod config;
mod error;
mod extract;
pub mod parser;
mod request;
pub mod transport;
mod wire;

#[cfg(test)]
mod testing;

pub use client::{BlockingVisionClient, VisionClient};
pub use config::ClientConfig;
pub use error::{FailureKind, VisionError};
pub use extract::extract_json;
pub use parser::{
    ComparisonDocument, ComparisonParser, DamageParser, DashboardParser, DocumentParser,
    InsuranceParser, LicenseParser, ParseOptions, SingleImageDocument,
};
#[cfg(feature = "blocking")]
pub use parser::{
    BlockingComparisonParser, BlockingDamageParser, BlockingDashboardParser,
    BlockingInsuranceParser, BlockingLicenseParser,
};
pub use request::{
    DEFAULT_MEDIA_TYPE, ImageInput, SendOptions, Usage, VisionRequest, VisionResponse,
    media_type_for_path,
};
pub use transport::{BlockingTransport, HttpReply, HttpRequest, ReqwestTransport, Transport};
#[cfg(feature = "blocking")]
pub use transport::BlockingReqwestTransport;
