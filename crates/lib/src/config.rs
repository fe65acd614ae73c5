//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.callrelay/config.json`) and
//! environment. Every section defaults, so the demo runs with no file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Expected header values for webhook deliveries.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Gateway bind, port, and endpoint paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP and WebSocket (default 17170).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Path the event distribution system POSTs deliveries to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Path agents open their WebSocket channel on.
    #[serde(default = "default_channel_path")]
    pub channel_path: String,
}

fn default_gateway_port() -> u16 {
    17170
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

fn default_channel_path() -> String {
    "/channel".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            webhook_path: default_webhook_path(),
            channel_path: default_channel_path(),
        }
    }
}

/// Shared-secret values a delivery must present. The distribution system is
/// configured with the same pair when the webhook subscription is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Expected subscription name (compared case-insensitively). Overridden
    /// by CALLRELAY_SUBSCRIPTION_NAME env when set.
    #[serde(default = "default_subscription_name")]
    pub subscription_name: String,

    /// Expected secret (compared exactly). Overridden by
    /// CALLRELAY_WEBHOOK_SECRET env when set.
    #[serde(default = "default_webhook_secret")]
    pub secret: String,
}

fn default_subscription_name() -> String {
    "egt-demo-relay-sub".to_string()
}

fn default_webhook_secret() -> String {
    "123456".to_string()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            subscription_name: default_subscription_name(),
            secret: default_webhook_secret(),
        }
    }
}

/// Resolve the expected subscription name: env CALLRELAY_SUBSCRIPTION_NAME
/// overrides config.
pub fn resolve_subscription_name(config: &Config) -> String {
    std::env::var("CALLRELAY_SUBSCRIPTION_NAME")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.webhook.subscription_name.trim().to_string())
}

/// Resolve the expected webhook secret: env CALLRELAY_WEBHOOK_SECRET
/// overrides config.
pub fn resolve_webhook_secret(config: &Config) -> String {
    std::env::var("CALLRELAY_WEBHOOK_SECRET")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.webhook.secret.trim().to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CALLRELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".callrelay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or CALLRELAY_CONFIG_PATH). Missing file
/// => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 17170);
        assert_eq!(g.bind, "127.0.0.1");
        assert_eq!(g.webhook_path, "/webhook");
        assert_eq!(g.channel_path, "/channel");
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(config.gateway.port, 17170);
        assert_eq!(config.webhook.subscription_name, "egt-demo-relay-sub");
        assert_eq!(config.webhook.secret, "123456");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"gateway":{"port":9000},"webhook":{"secret":"s3cret"}}"#)
                .expect("parse partial config");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.webhook.secret, "s3cret");
        assert_eq!(config.webhook.subscription_name, "egt-demo-relay-sub");
    }
}
