//! HTTP transports: the only part of the client that differs between the
//! async and blocking variants.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::VisionError;

/// A fully built POST request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Status and body of the provider's reply, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: HttpRequest) -> Result<HttpReply, VisionError>;
}

pub trait BlockingTransport: Send + Sync {
    fn post(&self, request: HttpRequest) -> Result<HttpReply, VisionError>;
}

/// Async transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpReply, VisionError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        debug!(url = %request.url, bytes = request.body.len(), "posting vision request");
        let resp = builder.body(request.body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpReply { status, body })
    }
}

/// Blocking transport over `reqwest::blocking`. Must not be used from
/// inside an async runtime.
#[cfg(feature = "blocking")]
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "blocking")]
impl BlockingReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, VisionError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[cfg(feature = "blocking")]
impl BlockingTransport for BlockingReqwestTransport {
    fn post(&self, request: HttpRequest) -> Result<HttpReply, VisionError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        debug!(url = %request.url, bytes = request.body.len(), "posting vision request");
        let resp = builder.body(request.body).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(HttpReply { status, body })
    }
}
