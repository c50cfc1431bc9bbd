// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for POST /chat.
//!
//! When clients send Accept: text/event-stream, each model chunk is
//! forwarded as it arrives.
//!
//! SSE event format:
//! ```text
//! event: text_delta
//! data: {"text": "partial content here"}
//!
//! event: message_stop
//! data: {"response": "full content", "persisted": true}
//! ```
//!
//! A failed turn ends with a single `error` event instead of `message_stop`.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use gemchat_core::{MessageContent, SessionContext};
use tokio::sync::mpsc;

use crate::server::GatewayState;

/// Runs one turn in a background task and streams its chunks.
///
/// The task holds the user's conversation lock until the turn completes,
/// even if the client disconnects, so the turn is still persisted.
pub fn stream_turn(
    state: GatewayState,
    ctx: SessionContext,
    input: MessageContent,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        let mut conversation = state.lock_conversation(&ctx).await;
        let delta_tx = tx.clone();
        let result = conversation
            .send(input, move |chunk| {
                let _ = delta_tx.send(text_delta(chunk));
            })
            .await;

        let last = match result {
            Ok(outcome) => Event::default().event("message_stop").data(
                serde_json::json!({
                    "response": outcome.response,
                    "persisted": outcome.persisted,
                })
                .to_string(),
            ),
            Err(e) => {
                tracing::warn!(username = %ctx.username, error = %e, "streamed turn failed");
                error_event(&e.to_string())
            }
        };
        let _ = tx.send(last);
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok(event), rx))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn text_delta(chunk: &str) -> Event {
    Event::default()
        .event("text_delta")
        .data(serde_json::json!({ "text": chunk }).to_string())
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(serde_json::json!({ "error": message }).to_string())
}
