// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use dashmap::DashMap;
use gemchat_agent::{ChatRuntime, Conversation};
use gemchat_config::model::GatewayConfig;
use gemchat_core::{ChatError, SessionContext};
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::handlers;

/// Exclusive access to one user's conversation for the length of a request.
pub type ConversationGuard = OwnedMappedMutexGuard<Option<Conversation>, Conversation>;

/// A user's cache slot. The mutex lives as long as the slot, whatever prompt
/// the conversation inside it was opened with.
struct CachedConversation {
    slot: Arc<Mutex<Option<Conversation>>>,
    last_used: Instant,
}

impl CachedConversation {
    fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            last_used: Instant::now(),
        }
    }

    /// Only the map holds the slot: no request is using or waiting on it.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.slot) == 1
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub runtime: ChatRuntime,
    /// One slot per username; its mutex serializes that user's turns.
    conversations: Arc<DashMap<String, CachedConversation>>,
    max_conversations: usize,
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(runtime: ChatRuntime) -> Self {
        let max_conversations = runtime.config().gateway.max_conversations;
        Self {
            runtime,
            conversations: Arc::new(DashMap::new()),
            max_conversations,
            start_time: Instant::now(),
        }
    }

    pub fn with_max_conversations(mut self, max_conversations: usize) -> Self {
        self.max_conversations = max_conversations.max(1);
        self
    }

    /// Locks the user's conversation, reopening it if the prompt preset changed.
    ///
    /// Waits while another request for the same username is running.
    pub async fn lock_conversation(&self, ctx: &SessionContext) -> ConversationGuard {
        let slot = self.slot_for(&ctx.username);
        let mut guard = slot.lock_owned().await;
        if guard
            .as_ref()
            .is_some_and(|c| c.context().prompt_name != ctx.prompt_name)
        {
            debug!(username = %ctx.username, "prompt changed, reopening conversation");
            *guard = None;
        }
        let runtime = &self.runtime;
        OwnedMutexGuard::map(guard, |cached| {
            cached.get_or_insert_with(|| runtime.conversation(ctx.clone()))
        })
    }

    pub fn active_conversations(&self) -> usize {
        self.conversations.len()
    }

    fn slot_for(&self, username: &str) -> Arc<Mutex<Option<Conversation>>> {
        if let Some(mut cached) = self.conversations.get_mut(username) {
            cached.last_used = Instant::now();
            return Arc::clone(&cached.slot);
        }
        self.evict_idle(self.max_conversations.saturating_sub(1));
        let mut cached = self
            .conversations
            .entry(username.to_string())
            .or_insert_with(CachedConversation::new);
        cached.last_used = Instant::now();
        Arc::clone(&cached.slot)
    }

    /// Drops least recently used idle slots until at most `keep` remain.
    ///
    /// Busy slots are never evicted, so the cache may exceed its bound while
    /// more users than that are mid-request.
    fn evict_idle(&self, keep: usize) {
        let len = self.conversations.len();
        if len <= keep {
            return;
        }
        let mut idle: Vec<(String, Instant)> = self
            .conversations
            .iter()
            .filter(|entry| entry.is_idle())
            .map(|entry| (entry.key().clone(), entry.last_used))
            .collect();
        idle.sort_by_key(|(_, last_used)| *last_used);

        for (username, _) in idle.into_iter().take(len - keep) {
            if self
                .conversations
                .remove_if(&username, |_, cached| cached.is_idle())
                .is_some()
            {
                debug!(username = %username, "evicted idle conversation");
            }
        }
    }
}

/// Builds the application router.
///
/// - GET /health
/// - GET /chat?username=&pname=&clearall
/// - POST /chat?username=&pname=
pub fn router(state: GatewayState) -> Router {
    // Base64 inflates uploads by a third; leave room for several files per turn.
    let body_limit = state
        .runtime
        .config()
        .extract
        .max_attachment_bytes
        .saturating_mul(4);

    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/chat", get(handlers::get_chat).post(handlers::post_chat))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds to the configured host:port and serves until the task is dropped.
pub async fn start_server(config: &GatewayConfig, state: GatewayState) -> Result<(), ChatError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChatError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ChatError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
