// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat API.
//!
//! Handles GET /health, GET /chat and POST /chat.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use gemchat_agent::{EntryParams, Upload};
use gemchat_context::extract_display_text;
use gemchat_core::{ChatError, Fragment, Message, MessageContent, Role, SessionContext};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::GatewayState;
use crate::sse;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

/// One uploaded file, base64-encoded.
#[derive(Debug, Deserialize)]
pub struct AttachmentUpload {
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

/// Response body for a completed POST /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub persisted: bool,
}

/// Response body for GET /chat.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub username: String,
    pub prompt: Option<String>,
    pub messages: Vec<DisplayMessage>,
    /// Set when the opening greeting could not be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// A message as rendered by a client. `text` is null for image-only content.
#[derive(Debug, Serialize, PartialEq)]
pub struct DisplayMessage {
    pub role: Role,
    pub text: Option<String>,
    pub attachments: Vec<AttachmentSummary>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AttachmentSummary {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Response body for GET /chat?clearall.
#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /chat
///
/// With `clearall` the user's history is deleted and nothing else happens.
/// Otherwise the history is loaded, greeting first if it is empty.
pub async fn get_chat(
    State(state): State<GatewayState>,
    Query(params): Query<EntryParams>,
) -> Response {
    let ctx = match state.runtime.session_context(&params) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(e),
    };
    let mut conversation = state.lock_conversation(&ctx).await;

    if ctx.clear_all {
        conversation.clear().await;
        info!(username = %ctx.username, "history cleared via gateway");
        return Json(ClearedResponse { cleared: true }).into_response();
    }

    conversation.load().await;
    let notice = match conversation.greet(|_| {}).await {
        Ok(_) => None,
        Err(e) => {
            warn!(username = %ctx.username, error = %e, "greeting failed");
            Some(e.to_string())
        }
    };

    Json(HistoryResponse {
        username: ctx.username.clone(),
        prompt: ctx.prompt_name.clone(),
        messages: display_messages(conversation.messages()),
        notice,
    })
    .into_response()
}

/// POST /chat
///
/// Runs one turn. If the Accept header contains "text/event-stream", the
/// reply is streamed as SSE instead.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Query(params): Query<EntryParams>,
    headers: HeaderMap,
    Json(body): Json<ChatRequest>,
) -> Response {
    let ctx = match state.runtime.session_context(&params) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(e),
    };
    let input = match decode_input(&state, &body) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let accept = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if accept.contains("text/event-stream") {
        return sse::stream_turn(state, ctx, input).into_response();
    }

    run_turn(&state, &ctx, input).await
}

async fn run_turn(state: &GatewayState, ctx: &SessionContext, input: MessageContent) -> Response {
    let mut conversation = state.lock_conversation(ctx).await;
    match conversation.send(input, |_| {}).await {
        Ok(outcome) => Json(ChatResponse {
            response: outcome.response,
            persisted: outcome.persisted,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn decode_input(state: &GatewayState, body: &ChatRequest) -> Result<MessageContent, Response> {
    let mut uploads = Vec::with_capacity(body.attachments.len());
    for attachment in &body.attachments {
        let data = BASE64.decode(attachment.data.as_bytes()).map_err(|e| {
            error_with_status(
                StatusCode::BAD_REQUEST,
                format!("attachment {} is not valid base64: {e}", attachment.filename),
            )
        })?;
        uploads.push(Upload {
            filename: attachment.filename.clone(),
            mime_type: attachment.mime_type.clone(),
            data,
        });
    }
    Ok(state.runtime.build_input(&body.text, &uploads))
}

/// Converts history to the client view, leaving out the system message.
pub fn display_messages(messages: &[Message]) -> Vec<DisplayMessage> {
    messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| DisplayMessage {
            role: m.role,
            text: extract_display_text(m).map(str::to_string),
            attachments: attachment_summaries(&m.content),
        })
        .collect()
}

fn attachment_summaries(content: &MessageContent) -> Vec<AttachmentSummary> {
    let MessageContent::Fragments(fragments) = content else {
        return Vec::new();
    };
    fragments
        .iter()
        .filter_map(|f| match f {
            Fragment::Text(_) => None,
            Fragment::Image { mime_type, .. } => Some(AttachmentSummary {
                kind: "image",
                filename: None,
                mime_type: Some(mime_type.clone()),
            }),
            Fragment::ExtractedDoc { filename, .. } => Some(AttachmentSummary {
                kind: "document",
                filename: Some(filename.clone()),
                mime_type: None,
            }),
        })
        .collect()
}

/// HTTP status for each error kind.
pub fn status_for(error: &ChatError) -> StatusCode {
    match error {
        ChatError::Config(_) => StatusCode::BAD_REQUEST,
        ChatError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ChatError::Provider { .. } => StatusCode::BAD_GATEWAY,
        ChatError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ChatError::Storage { .. } | ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: ChatError) -> Response {
    error_with_status(status_for(&error), error.to_string())
}

fn error_with_status(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(req.text, "Hello");
        assert!(req.attachments.is_empty());
    }

    #[test]
    fn attachment_upload_deserializes() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"text": "", "attachments": [{"filename": "a.png", "mime_type": "image/png", "data": "AAEC"}]}"#,
        )
        .unwrap();
        assert_eq!(req.attachments[0].filename, "a.png");
        assert_eq!(req.attachments[0].mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn display_skips_system_and_nulls_image_only_text() {
        let messages = vec![
            Message::system("Be kind."),
            Message::user(vec![Fragment::Image {
                data: vec![1],
                mime_type: "image/png".into(),
            }]),
            Message::assistant("Nice picture."),
        ];
        let view = display_messages(&messages);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].text, None);
        assert_eq!(view[0].attachments[0].kind, "image");
        assert_eq!(view[1].text.as_deref(), Some("Nice picture."));
        let json = serde_json::to_value(&view[0]).unwrap();
        assert!(json["text"].is_null());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn error_kinds_map_to_statuses() {
        assert_eq!(status_for(&ChatError::Config("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&ChatError::Provider {
                message: "x".into(),
                source: None
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ChatError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
