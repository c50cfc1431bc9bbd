// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express:
//! sampling ranges, non-empty paths, bindable addresses.

use crate::diagnostic::ConfigError;
use crate::model::ChatConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns every collected validation error rather than failing fast.
pub fn validate_config(config: &ChatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let gemini = &config.gemini;
    if gemini.model.trim().is_empty() {
        fail("gemini.model must not be empty".to_string());
    }
    if !gemini.base_url.starts_with("http://") && !gemini.base_url.starts_with("https://") {
        fail(format!(
            "gemini.base_url `{}` must start with http:// or https://",
            gemini.base_url
        ));
    }
    if !(0.0..=2.0).contains(&gemini.temperature) {
        fail(format!(
            "gemini.temperature must be between 0.0 and 2.0, got {}",
            gemini.temperature
        ));
    }
    if !(0.0..=1.0).contains(&gemini.top_p) {
        fail(format!(
            "gemini.top_p must be between 0.0 and 1.0, got {}",
            gemini.top_p
        ));
    }
    if gemini.max_output_tokens == 0 {
        fail("gemini.max_output_tokens must be at least 1".to_string());
    }
    if gemini.request_timeout_secs == 0 {
        fail("gemini.request_timeout_secs must be at least 1".to_string());
    }

    if config.storage.data_dir.as_os_str().is_empty() {
        fail("storage.data_dir must not be empty".to_string());
    }
    let ext = &config.storage.extension;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        fail(format!(
            "storage.extension `{ext}` must be a non-empty alphanumeric string"
        ));
    }

    if config.prompts.fallback.trim().is_empty() {
        fail("prompts.fallback must not be empty".to_string());
    }
    for (name, text) in &config.prompts.presets {
        if name.trim().is_empty() {
            fail("prompts.presets contains an empty preset name".to_string());
        } else if text.trim().is_empty() {
            fail(format!("prompts.presets.{name} must not be empty"));
        }
    }

    if config.extract.max_attachment_bytes == 0 {
        fail("extract.max_attachment_bytes must be at least 1".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.max_conversations == 0 {
        fail("gateway.max_conversations must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ChatConfig::default()).is_ok());
    }

    #[test]
    fn out_of_range_sampling_fails() {
        let mut config = ChatConfig::default();
        config.gemini.temperature = 3.5;
        config.gemini.top_p = -0.1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "gemini.temperature"));
        assert!(has_error(&errors, "gemini.top_p"));
    }

    #[test]
    fn empty_data_dir_fails() {
        let mut config = ChatConfig::default();
        config.storage.data_dir = std::path::PathBuf::new();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "storage.data_dir"));
    }

    #[test]
    fn dotted_extension_fails() {
        let mut config = ChatConfig::default();
        config.storage.extension = ".db".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "storage.extension"));
    }

    #[test]
    fn empty_preset_text_fails() {
        let mut config = ChatConfig::default();
        config
            .prompts
            .presets
            .insert("blank".to_string(), "  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "prompts.presets.blank"));
    }

    #[test]
    fn bad_host_fails() {
        let mut config = ChatConfig::default();
        config.gateway.host = "local host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "gateway.host"));
    }

    #[test]
    fn zero_conversation_cache_fails() {
        let mut config = ChatConfig::default();
        config.gateway.max_conversations = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "gateway.max_conversations"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ChatConfig::default();
        config.gemini.model = String::new();
        config.gemini.max_output_tokens = 0;
        config.extract.max_attachment_bytes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
