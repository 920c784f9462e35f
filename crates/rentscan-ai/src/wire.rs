//! Chat-completions wire format, shared by the async and blocking clients.
//!
//! [`prepare`] turns a [`VisionRequest`] into the HTTP request to send and
//! [`interpret`] turns the HTTP reply into a [`VisionResponse`] or a typed
//! failure. The transports only move bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::ClientConfig;
use crate::request::{Usage, VisionRequest, VisionResponse};
use crate::transport::{HttpReply, HttpRequest};
use crate::VisionError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum Message<'a> {
    System { content: &'a str },
    User { content: Vec<ContentPart<'a>> },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Request headers. Attribution headers only when configured.
pub(crate) fn headers(config: &ClientConfig) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Authorization".to_string(), format!("Bearer {}", config.api_key)),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];
    if let Some(url) = &config.site_url {
        headers.push(("HTTP-Referer".to_string(), url.clone()));
    }
    if let Some(name) = &config.site_name {
        headers.push(("X-Title".to_string(), name.clone()));
    }
    headers
}

/// Build the HTTP request for `request`. Returns it with the model id used.
pub(crate) fn prepare(
    config: &ClientConfig,
    request: &VisionRequest,
) -> Result<(HttpRequest, String), VisionError> {
    let model = request.model().unwrap_or(config.model.as_str());

    let mut content: Vec<ContentPart<'_>> = request
        .images()
        .iter()
        .map(|image| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: image.data_url(),
            },
        })
        .collect();
    content.push(ContentPart::Text {
        text: &request.user_prompt,
    });

    let body = ChatRequest {
        model,
        max_tokens: request.max_tokens().unwrap_or(config.max_tokens),
        temperature: request.temperature().unwrap_or(config.temperature),
        messages: [
            Message::System {
                content: &request.system_prompt,
            },
            Message::User { content },
        ],
    };
    let body = serde_json::to_string(&body).map_err(|e| {
        VisionError::InvalidRequest(format!("request body could not be encoded: {e}"))
    })?;

    let http = HttpRequest {
        url: config.endpoint.clone(),
        headers: headers(config),
        body,
    };
    Ok((http, model.to_string()))
}

/// Map an HTTP reply to a response or a typed failure.
pub(crate) fn interpret(reply: HttpReply, requested_model: &str) -> Result<VisionResponse, VisionError> {
    let HttpReply { status, body } = reply;

    if !(200..300).contains(&status) {
        let message = error_message(&body);
        warn!(status, message = %message, "provider rejected vision request");
        return Err(match status {
            401 => VisionError::Authentication { message, body },
            429 => VisionError::RateLimited { message, body },
            _ => VisionError::Api {
                status,
                message,
                body,
            },
        });
    }

    let malformed = |reason: &str| VisionError::Api {
        status,
        message: format!("malformed completion: {reason}"),
        body: body.clone(),
    };

    let raw: Value = serde_json::from_str(&body).map_err(|_| malformed("not JSON"))?;
    let completion: ChatCompletion =
        serde_json::from_value(raw.clone()).map_err(|_| malformed("unreadable choices"))?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no choices"))?;
    let content = choice
        .message
        .content
        .ok_or_else(|| malformed("no message content"))?;

    // Model and usage are informational; odd values fall back instead of failing.
    let model = raw
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(requested_model)
        .to_string();
    let usage = Usage::from_value(raw.get("usage"));

    Ok(VisionResponse {
        content,
        model,
        usage,
        raw,
    })
}

/// `error.message` from a JSON error body, or the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| body.to_string())
}
