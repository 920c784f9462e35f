//! Stub transport for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::VisionError;
use crate::transport::{BlockingTransport, HttpReply, HttpRequest, Transport};

enum Reply {
    Http { status: u16, body: String },
    Fail(fn() -> VisionError),
}

/// Answers every request with the same reply and records what was sent.
/// Clones share the record.
#[derive(Clone)]
pub(crate) struct StubTransport {
    reply: Arc<Reply>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl StubTransport {
    fn with(reply: Reply) -> Self {
        Self {
            reply: Arc::new(reply),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn ok(body: String) -> Self {
        Self::with(Reply::Http { status: 200, body })
    }

    pub(crate) fn reply(status: u16, body: &str) -> Self {
        Self::with(Reply::Http {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn failing(make: fn() -> VisionError) -> Self {
        Self::with(Reply::Fail(make))
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request sent")
    }

    pub(crate) fn last_body(&self) -> Value {
        serde_json::from_str(&self.last_request().body).unwrap()
    }

    fn answer(&self, request: HttpRequest) -> Result<HttpReply, VisionError> {
        self.seen.lock().unwrap().push(request);
        match &*self.reply {
            Reply::Http { status, body } => Ok(HttpReply {
                status: *status,
                body: body.clone(),
            }),
            Reply::Fail(make) => Err(make()),
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpReply, VisionError> {
        self.answer(request)
    }
}

impl BlockingTransport for StubTransport {
    fn post(&self, request: HttpRequest) -> Result<HttpReply, VisionError> {
        self.answer(request)
    }
}

/// A chat completion reply body carrying `content`.
pub(crate) fn completion(content: &str) -> String {
    json!({
        "id": "gen-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 1200, "completion_tokens": 80, "total_tokens": 1280}
    })
    .to_string()
}
