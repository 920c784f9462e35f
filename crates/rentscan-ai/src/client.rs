//! Vision model clients.
//!
//! [`VisionClient`] and [`BlockingVisionClient`] share request building and
//! reply interpretation (see `wire`); they differ only in how the HTTP call
//! is made. Both are cheap to clone and safe to share between threads.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ClientConfig;
#[cfg(feature = "blocking")]
use crate::transport::BlockingReqwestTransport;
use crate::transport::{BlockingTransport, ReqwestTransport, Transport};
use crate::{ImageInput, SendOptions, VisionError, VisionRequest, VisionResponse, wire};

pub struct VisionClient<T = ReqwestTransport> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
}

impl<T> Clone for VisionClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl VisionClient {
    pub fn new(config: ClientConfig) -> Result<Self, VisionError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Client with default settings for the given API key.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, VisionError> {
        Self::new(ClientConfig::new(api_key))
    }
}

impl<T: Transport> VisionClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one image with the given prompts. `options` overrides the
    /// configured model, token limit and temperature for this call.
    pub async fn send_single_image(
        &self,
        image: impl Into<ImageInput>,
        system_prompt: &str,
        user_prompt: &str,
        options: &SendOptions,
    ) -> Result<VisionResponse, VisionError> {
        let request = options.apply(VisionRequest::new(system_prompt, user_prompt, image));
        self.send(&request).await
    }

    /// Send several images in order, followed by the prompt text.
    /// Fails with [`VisionError::InvalidRequest`] before any network call if
    /// `images` is empty.
    pub async fn send_multi_image(
        &self,
        images: Vec<ImageInput>,
        system_prompt: &str,
        user_prompt: &str,
        options: &SendOptions,
    ) -> Result<VisionResponse, VisionError> {
        let request = VisionRequest::with_images(system_prompt, user_prompt, images)?;
        self.send(&options.apply(request)).await
    }

    /// Send a request. One round trip, no retries.
    pub async fn send(&self, request: &VisionRequest) -> Result<VisionResponse, VisionError> {
        let (http, model) = wire::prepare(&self.config, request)?;
        info!(model = %model, images = request.images().len(), "sending vision request");
        let reply = self.transport.post(http).await?;
        let response = wire::interpret(reply, &model)?;
        debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "vision response received"
        );
        Ok(response)
    }
}

pub struct BlockingVisionClient<T> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
}

impl<T> Clone for BlockingVisionClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

#[cfg(feature = "blocking")]
impl BlockingVisionClient<BlockingReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, VisionError> {
        let transport = BlockingReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, VisionError> {
        Self::new(ClientConfig::new(api_key))
    }
}

impl<T: BlockingTransport> BlockingVisionClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn send_single_image(
        &self,
        image: impl Into<ImageInput>,
        system_prompt: &str,
        user_prompt: &str,
        options: &SendOptions,
    ) -> Result<VisionResponse, VisionError> {
        let request = options.apply(VisionRequest::new(system_prompt, user_prompt, image));
        self.send(&request)
    }

    pub fn send_multi_image(
        &self,
        images: Vec<ImageInput>,
        system_prompt: &str,
        user_prompt: &str,
        options: &SendOptions,
    ) -> Result<VisionResponse, VisionError> {
        let request = VisionRequest::with_images(system_prompt, user_prompt, images)?;
        self.send(&options.apply(request))
    }

    pub fn send(&self, request: &VisionRequest) -> Result<VisionResponse, VisionError> {
        let (http, model) = wire::prepare(&self.config, request)?;
        info!(model = %model, images = request.images().len(), "sending vision request");
        let reply = self.transport.post(http)?;
        let response = wire::interpret(reply, &model)?;
        debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "vision response received"
        );
        Ok(response)
    }
}
