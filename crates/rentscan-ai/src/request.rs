//! Vision request and response types.

use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;

use crate::VisionError;

pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Media type for an image file, judged by its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

/// Raw image bytes and their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub data: Vec<u8>,
    pub media_type: String,
}

impl ImageInput {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Read an image file, inferring the media type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::new(data, media_type_for_path(path)))
    }

    /// `data:<media type>;base64,<payload>` URL for the request body.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.data))
    }
}

impl From<Vec<u8>> for ImageInput {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data, DEFAULT_MEDIA_TYPE)
    }
}

impl From<&[u8]> for ImageInput {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec(), DEFAULT_MEDIA_TYPE)
    }
}

/// One call to the vision model: prompts plus one or more images.
///
/// Holds at least one image by construction. Settings left unset fall back
/// to the client's configured defaults.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    images: Vec<ImageInput>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

impl VisionRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        image: impl Into<ImageInput>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            images: vec![image.into()],
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Build a request from a list of images, which must not be empty.
    pub fn with_images(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        images: Vec<ImageInput>,
    ) -> Result<Self, VisionError> {
        if images.is_empty() {
            return Err(VisionError::InvalidRequest(
                "at least one image is required".into(),
            ));
        }
        Ok(Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            images,
            model: None,
            max_tokens: None,
            temperature: None,
        })
    }

    /// Append another image; images are sent in the order added.
    pub fn with_image(mut self, image: impl Into<ImageInput>) -> Self {
        self.images.push(image.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sampling temperature, clamped to [0.0, 1.0].
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(clamp_temperature(temperature));
        self
    }

    pub fn images(&self) -> &[ImageInput] {
        &self.images
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }
}

/// Per-call overrides for [`VisionClient::send_single_image`] and
/// [`VisionClient::send_multi_image`]. Unset fields use the client's
/// configuration.
///
/// [`VisionClient::send_single_image`]: crate::VisionClient::send_single_image
/// [`VisionClient::send_multi_image`]: crate::VisionClient::send_multi_image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl SendOptions {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub(crate) fn apply(&self, mut request: VisionRequest) -> VisionRequest {
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}

pub(crate) fn clamp_temperature(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Token accounting reported by the provider.
///
/// Counts that are missing, null, negative or not numbers are zero. Usage
/// never decides whether a completion succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    /// Read the `usage` object of a completion, if any.
    pub fn from_value(usage: Option<&Value>) -> Self {
        let count = |name: &str| -> u64 {
            let Some(value) = usage.and_then(|u| u.get(name)) else {
                return 0;
            };
            value
                .as_u64()
                .or_else(|| {
                    value
                        .as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        };
        Self {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// The model's completion text.
    pub content: String,
    /// Model that actually answered.
    pub model: String,
    pub usage: Usage,
    /// The provider's full reply.
    pub raw: Value,
}
