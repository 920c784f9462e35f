//! Document parsers.
//!
//! One generic [`DocumentParser`] serves every document class: the schema
//! type picks the prompts (through its `DocumentKind`) and the record the
//! model's answer is validated into.

use std::marker::PhantomData;

use rentscan_core::prompts::{self, DEFAULT_LOCATION};
use rentscan_core::{
    DamageComparisonResponse, DamageDetectionResponse, DashboardAnalysisResponse,
    InsuranceOcrResponse, LicenseOcrResponse, ResponseSchema,
};
use tracing::{debug, info, warn};

use crate::client::{BlockingVisionClient, VisionClient};
#[cfg(feature = "blocking")]
use crate::transport::BlockingReqwestTransport;
use crate::transport::{BlockingTransport, ReqwestTransport, Transport};
use crate::{ImageInput, VisionError, VisionRequest, VisionResponse, extract_json};

/// Documents analysed from a single photo.
pub trait SingleImageDocument: ResponseSchema {}

impl SingleImageDocument for LicenseOcrResponse {}
impl SingleImageDocument for InsuranceOcrResponse {}
impl SingleImageDocument for DamageDetectionResponse {}
impl SingleImageDocument for DashboardAnalysisResponse {}

/// Documents analysed from a checkout photo and a checkin photo.
pub trait ComparisonDocument: ResponseSchema {}

impl ComparisonDocument for DamageComparisonResponse {}

/// Per-call settings. Unset fields fall back to the parser's defaults.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Vehicle area the photo shows, e.g. `driver_side`. Only used by
    /// documents whose prompt mentions a location.
    pub location: Option<String>,
    pub model: Option<String>,
}

impl ParseOptions {
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

pub struct DocumentParser<D, C> {
    client: C,
    location: String,
    model: Option<String>,
    _document: PhantomData<fn() -> D>,
}

impl<D, C: Clone> Clone for DocumentParser<D, C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            location: self.location.clone(),
            model: self.model.clone(),
            _document: PhantomData,
        }
    }
}

pub type LicenseParser<T = ReqwestTransport> = DocumentParser<LicenseOcrResponse, VisionClient<T>>;
pub type InsuranceParser<T = ReqwestTransport> =
    DocumentParser<InsuranceOcrResponse, VisionClient<T>>;
pub type DamageParser<T = ReqwestTransport> =
    DocumentParser<DamageDetectionResponse, VisionClient<T>>;
pub type DashboardParser<T = ReqwestTransport> =
    DocumentParser<DashboardAnalysisResponse, VisionClient<T>>;
pub type ComparisonParser<T = ReqwestTransport> =
    DocumentParser<DamageComparisonResponse, VisionClient<T>>;

#[cfg(feature = "blocking")]
pub type BlockingLicenseParser<T = BlockingReqwestTransport> =
    DocumentParser<LicenseOcrResponse, BlockingVisionClient<T>>;
#[cfg(feature = "blocking")]
pub type BlockingInsuranceParser<T = BlockingReqwestTransport> =
    DocumentParser<InsuranceOcrResponse, BlockingVisionClient<T>>;
#[cfg(feature = "blocking")]
pub type BlockingDamageParser<T = BlockingReqwestTransport> =
    DocumentParser<DamageDetectionResponse, BlockingVisionClient<T>>;
#[cfg(feature = "blocking")]
pub type BlockingDashboardParser<T = BlockingReqwestTransport> =
    DocumentParser<DashboardAnalysisResponse, BlockingVisionClient<T>>;
#[cfg(feature = "blocking")]
pub type BlockingComparisonParser<T = BlockingReqwestTransport> =
    DocumentParser<DamageComparisonResponse, BlockingVisionClient<T>>;

impl<D: ResponseSchema, C> DocumentParser<D, C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            location: DEFAULT_LOCATION.to_string(),
            model: None,
            _document: PhantomData,
        }
    }

    /// Location used when a call does not name one.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Model used when a call does not name one, instead of the client's.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn request(&self, images: Vec<ImageInput>, options: &ParseOptions) -> Result<VisionRequest, VisionError> {
        let expected = D::KIND.image_count();
        if images.len() != expected {
            return Err(VisionError::InvalidRequest(format!(
                "{} takes {expected} image(s), got {}",
                D::KIND,
                images.len()
            )));
        }
        let pair = prompts::catalog(D::KIND);
        let user = if D::KIND.uses_location() {
            let location = options.location.as_deref().unwrap_or(self.location.as_str());
            pair.render_user(location)
        } else {
            pair.user_template.to_string()
        };
        let request = VisionRequest::with_images(pair.system, user, images)?;
        Ok(match options.model.as_ref().or(self.model.as_ref()) {
            Some(model) => request.with_model(model.clone()),
            None => request,
        })
    }
}

/// Turn a completion into a validated record.
fn finish<D: ResponseSchema>(response: VisionResponse) -> Result<D, VisionError> {
    let object = extract_json(&response.content).inspect_err(|_| {
        debug!(document = %D::KIND, raw = %response.content, "no JSON object in model output");
    })?;
    let record = D::from_json(object).map_err(|e| {
        warn!(document = %D::KIND, fields = ?e.fields(), error = %e, "model output failed validation");
        debug!(document = %D::KIND, raw = %response.content, "rejected model output");
        VisionError::from(e)
    })?;
    info!(
        document = %D::KIND,
        model = %response.model,
        total_tokens = response.usage.total_tokens,
        "document parsed"
    );
    Ok(record)
}

impl<D: ResponseSchema> DocumentParser<D, VisionClient> {
    /// Parser over a fresh client with default settings.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, VisionError> {
        Ok(Self::new(VisionClient::from_api_key(api_key)?))
    }
}

#[cfg(feature = "blocking")]
impl<D: ResponseSchema> DocumentParser<D, BlockingVisionClient<BlockingReqwestTransport>> {
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, VisionError> {
        Ok(Self::new(BlockingVisionClient::from_api_key(api_key)?))
    }
}

impl<D: SingleImageDocument, T: Transport> DocumentParser<D, VisionClient<T>> {
    pub async fn parse(&self, image: impl Into<ImageInput>) -> Result<D, VisionError> {
        self.parse_with(image, &ParseOptions::default()).await
    }

    pub async fn parse_with(
        &self,
        image: impl Into<ImageInput>,
        options: &ParseOptions,
    ) -> Result<D, VisionError> {
        let request = self.request(vec![image.into()], options)?;
        finish(self.client.send(&request).await?)
    }
}

impl<D: ComparisonDocument, T: Transport> DocumentParser<D, VisionClient<T>> {
    /// Compare a checkout photo (`before`) with a checkin photo (`after`).
    pub async fn compare(
        &self,
        before: impl Into<ImageInput>,
        after: impl Into<ImageInput>,
    ) -> Result<D, VisionError> {
        self.compare_with(before, after, &ParseOptions::default()).await
    }

    pub async fn compare_with(
        &self,
        before: impl Into<ImageInput>,
        after: impl Into<ImageInput>,
        options: &ParseOptions,
    ) -> Result<D, VisionError> {
        let request = self.request(vec![before.into(), after.into()], options)?;
        finish(self.client.send(&request).await?)
    }
}

impl<D: SingleImageDocument, T: BlockingTransport> DocumentParser<D, BlockingVisionClient<T>> {
    pub fn parse(&self, image: impl Into<ImageInput>) -> Result<D, VisionError> {
        self.parse_with(image, &ParseOptions::default())
    }

    pub fn parse_with(
        &self,
        image: impl Into<ImageInput>,
        options: &ParseOptions,
    ) -> Result<D, VisionError> {
        let request = self.request(vec![image.into()], options)?;
        finish(self.client.send(&request)?)
    }
}

impl<D: ComparisonDocument, T: BlockingTransport> DocumentParser<D, BlockingVisionClient<T>> {
    pub fn compare(
        &self,
        before: impl Into<ImageInput>,
        after: impl Into<ImageInput>,
    ) -> Result<D, VisionError> {
        self.compare_with(before, after, &ParseOptions::default())
    }

    pub fn compare_with(
        &self,
        before: impl Into<ImageInput>,
        after: impl Into<ImageInput>,
        options: &ParseOptions,
    ) -> Result<D, VisionError> {
        let request = self.request(vec![before.into(), after.into()], options)?;
        finish(self.client.send(&request)?)
    }
}

impl<T> VisionClient<T> {
    /// A parser for document `D` sharing this client.
    pub fn parser<D: ResponseSchema>(&self) -> DocumentParser<D, Self> {
        DocumentParser::new(self.clone())
    }
}

impl<T> BlockingVisionClient<T> {
    pub fn parser<D: ResponseSchema>(&self) -> DocumentParser<D, Self> {
        DocumentParser::new(self.clone())
    }
}
