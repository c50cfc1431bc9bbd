// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for gemchat.
//!
//! Exposes the chat loop over HTTP: history and greeting on GET /chat,
//! turns on POST /chat (JSON or SSE), and a health check. The query
//! parameters `username`, `pname` and `clearall` select the session.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{GatewayState, router, start_server};
