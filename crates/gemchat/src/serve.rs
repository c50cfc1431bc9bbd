// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gemchat serve` command implementation.
//!
//! Wires the Gemini provider, the SQLite conversation store and the
//! attachment extractor into a runtime, then serves the HTTP gateway until
//! Ctrl+C.

use std::sync::Arc;

use gemchat_agent::ChatRuntime;
use gemchat_config::ChatConfig;
use gemchat_core::{ChatError, HealthStatus, PluginAdapter};
use gemchat_gateway::{GatewayState, start_server};
use gemchat_gemini::GeminiProvider;
use gemchat_storage::SqliteConversationStore;
use tracing::{info, warn};

/// Runs the `gemchat serve` command.
pub async fn run_serve(config: ChatConfig) -> Result<(), ChatError> {
    crate::init_tracing(&config.app.log_level);
    info!(name = %config.app.name, "starting gemchat serve");

    let runtime = build_runtime(config).await?;
    let gateway = runtime.config().gateway.clone();
    let state = GatewayState::new(runtime.clone());

    tokio::select! {
        result = start_server(&gateway, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    if let Err(e) = runtime.provider().shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    info!("gemchat stopped");
    Ok(())
}

/// Builds the production runtime: Gemini provider plus SQLite store.
///
/// Fails when no API key is configured. An unusable data directory is only
/// logged; every store operation degrades on its own.
pub(crate) async fn build_runtime(config: ChatConfig) -> Result<ChatRuntime, ChatError> {
    let provider = GeminiProvider::new(&config.gemini).inspect_err(|_| {
        eprintln!(
            "error: Gemini API key required. Set [gemini] api_key in gemchat.toml or the {} env var",
            gemchat_gemini::API_KEY_ENV
        );
    })?;
    info!(model = %config.gemini.model, "gemini provider ready");

    let store = Arc::new(SqliteConversationStore::new(config.storage.clone()));
    report_store_health(&store).await;
    Ok(ChatRuntime::new(config, store, Arc::new(provider)))
}

/// Logs the store's health once at startup.
async fn report_store_health(store: &SqliteConversationStore) {
    match store.health_check().await {
        Ok(HealthStatus::Healthy) => info!("conversation store ready"),
        Ok(status) => warn!(?status, "conversation store degraded"),
        Err(e) => warn!(error = %e, "conversation store health check failed"),
    }
}
