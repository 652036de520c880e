//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Billing (payment provider) configuration.
    #[serde(default)]
    pub billing: BillingConfig,
    /// Options-flow upload configuration.
    #[serde(default)]
    pub flow: FlowConfig,
    /// Vision-model configuration for screenshot extraction.
    #[serde(default)]
    pub vision: VisionConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration values.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Payment-provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Base URL of the payment provider API.
    #[serde(default = "default_billing_base_url")]
    pub base_url: String,
    /// Provider secret key.
    #[serde(default)]
    pub secret_key: String,
    /// URL the provider redirects to after a successful checkout.
    #[serde(default)]
    pub success_url: String,
    /// URL the provider redirects to on cancel.
    #[serde(default)]
    pub cancel_url: String,
}

fn default_billing_base_url() -> String {
    "https://api.stripe.com/v1".to_string()
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            base_url: default_billing_base_url(),
            secret_key: String::new(),
            success_url: String::new(),
            cancel_url: String::new(),
        }
    }
}

/// Options-flow ingestion settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
    /// Local storage root for uploads (used when no S3 config is present).
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
}

fn default_max_upload_mb() -> u64 {
    10
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: default_max_upload_mb(),
            storage_root: default_storage_root(),
        }
    }
}

impl FlowConfig {
    /// Maximum upload size in bytes.
    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Vision-model settings for extracting flow tables from screenshots.
///
/// Extraction is disabled while the API key is empty; image flow uploads
/// are then stored without a parsed table.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    /// API key for the vision provider.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the OpenAI-style API.
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,
    /// Model used for extraction.
    #[serde(default = "default_vision_model")]
    pub model: String,
}

fn default_vision_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_vision_model() -> String {
    "gpt-4.1-mini".to_string()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_vision_base_url(),
            model: default_vision_model(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TRADELOG").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_upload_cap_in_bytes() {
        let flow = FlowConfig {
            max_upload_mb: 2,
            storage_root: "/tmp".into(),
        };
        assert_eq!(flow.max_upload_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_billing_defaults() {
        let billing = BillingConfig::default();
        assert!(billing.base_url.starts_with("https://"));
        assert!(billing.secret_key.is_empty());
    }

    #[test]
    fn test_vision_disabled_by_default() {
        let vision = VisionConfig::default();
        assert!(vision.api_key.is_empty());
        assert!(!vision.model.is_empty());
    }
}
