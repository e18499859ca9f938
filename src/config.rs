use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::auth::DEFAULT_MAX_SKEW_MS;
use crate::providers::{Feature, Provider};
use crate::utils::get_env_with_prefix;

/// Main configuration for the Keys Pay platform
///
/// Built once at startup (typically via [`ConfigBuilder::from_env`]) and
/// treated as immutable for the process lifetime. Secrets are held as
/// [`SecretString`] so they redact in Debug output and never serialize.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Client-call authentication settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for client request signatures (`HMAC_SHARED_SECRET`).
    pub client_secret: SecretString,
    /// Replay window: maximum |now - x-timestamp| in milliseconds.
    pub max_skew_ms: i64,
}

/// Per-provider feature flags and webhook secrets.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub ramp_enabled: bool,
    pub nium_enabled: bool,
    pub openpayd_enabled: bool,
    pub ramp_webhook_secret: SecretString,
    pub nium_webhook_secret: SecretString,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            auth: AuthConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secret: SecretString::new(String::new()),
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        // Providers are dark until an operator enables them; a disabled
        // provider's routes answer 403 without touching verification.
        Self {
            ramp_enabled: false,
            nium_enabled: false,
            openpayd_enabled: false,
            ramp_webhook_secret: SecretString::new(String::new()),
            nium_webhook_secret: SecretString::new(String::new()),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB: signed API payloads and webhook events are small
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Whether the given feature flag is enabled.
    pub fn feature_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Ramp => self.providers.ramp_enabled,
            Feature::Nium => self.providers.nium_enabled,
            Feature::OpenPayd => self.providers.openpayd_enabled,
        }
    }

    /// The webhook signing secret for the given provider.
    pub fn webhook_secret(&self, provider: Provider) -> &SecretString {
        match provider {
            Provider::Ramp => &self.providers.ramp_webhook_secret,
            Provider::Nium => &self.providers.nium_webhook_secret,
        }
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Set the shared secret clients sign requests with.
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.client_secret = SecretString::new(secret.into());
        self
    }

    /// Override the replay window (milliseconds).
    pub fn with_max_skew_ms(mut self, max_skew_ms: i64) -> Self {
        self.config.auth.max_skew_ms = max_skew_ms;
        self
    }

    pub fn with_feature_enabled(mut self, feature: Feature, enabled: bool) -> Self {
        match feature {
            Feature::Ramp => self.config.providers.ramp_enabled = enabled,
            Feature::Nium => self.config.providers.nium_enabled = enabled,
            Feature::OpenPayd => self.config.providers.openpayd_enabled = enabled,
        }
        self
    }

    pub fn with_webhook_secret(mut self, provider: Provider, secret: impl Into<String>) -> Self {
        let secret = SecretString::new(secret.into());
        match provider {
            Provider::Ramp => self.config.providers.ramp_webhook_secret = secret,
            Provider::Nium => self.config.providers.nium_webhook_secret = secret,
        }
        self
    }

    /// Load configuration from environment variables
    ///
    /// Every variable is checked with the `KEYSPAY_` prefix first, then
    /// unprefixed: `HMAC_SHARED_SECRET`, `AUTH_MAX_SKEW_MS`, `RAMP_ENABLED`,
    /// `NIUM_ENABLED`, `OPENPAYD_ENABLED`, `RAMP_WEBHOOK_SECRET`,
    /// `NIUM_WEBHOOK_SECRET`, plus `HOST`, `PORT`, `MAX_BODY_SIZE`,
    /// `LOG_LEVEL`, `LOG_JSON`.
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(max_body_size) = get_env_with_prefix("MAX_BODY_SIZE") {
            if let Ok(size) = max_body_size.parse() {
                self.config.server.max_body_size = size;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        if let Some(secret) = get_env_with_prefix("HMAC_SHARED_SECRET") {
            self.config.auth.client_secret = SecretString::new(secret);
        }
        if let Some(skew) = get_env_with_prefix("AUTH_MAX_SKEW_MS") {
            if let Ok(ms) = skew.parse() {
                self.config.auth.max_skew_ms = ms;
            }
        }

        if let Some(enabled) = get_env_with_prefix("RAMP_ENABLED") {
            self.config.providers.ramp_enabled = enabled.parse().unwrap_or(false);
        }
        if let Some(enabled) = get_env_with_prefix("NIUM_ENABLED") {
            self.config.providers.nium_enabled = enabled.parse().unwrap_or(false);
        }
        if let Some(enabled) = get_env_with_prefix("OPENPAYD_ENABLED") {
            self.config.providers.openpayd_enabled = enabled.parse().unwrap_or(false);
        }
        if let Some(secret) = get_env_with_prefix("RAMP_WEBHOOK_SECRET") {
            self.config.providers.ramp_webhook_secret = SecretString::new(secret);
        }
        if let Some(secret) = get_env_with_prefix("NIUM_WEBHOOK_SECRET") {
            self.config.providers.nium_webhook_secret = SecretString::new(secret);
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid:
    /// - Invalid server address or zero port / body size
    /// - Invalid log level
    /// - Non-positive replay window
    /// - Missing client secret
    /// - Missing webhook secret for an enabled provider
    pub fn build(self) -> crate::error::Result<Config> {
        self.config.server.addr().map_err(|e| {
            crate::error::KeysPayError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(crate::error::KeysPayError::bad_request(
                "Server port must be greater than 0",
            ));
        }

        if self.config.server.max_body_size == 0 {
            return Err(crate::error::KeysPayError::bad_request(
                "Maximum body size must be greater than 0",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(crate::error::KeysPayError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.auth.max_skew_ms <= 0 {
            return Err(crate::error::KeysPayError::bad_request(
                "Replay window must be greater than 0 milliseconds",
            ));
        }

        // Missing secrets are a startup error, not a silent verification
        // mismatch at request time.
        if self.config.auth.client_secret.expose_secret().is_empty() {
            return Err(crate::error::KeysPayError::bad_request(
                "HMAC_SHARED_SECRET must be set",
            ));
        }

        for provider in Provider::ALL {
            if self.config.feature_enabled(provider.feature())
                && self.config.webhook_secret(provider).expose_secret().is_empty()
            {
                return Err(crate::error::KeysPayError::bad_request(format!(
                    "{}_WEBHOOK_SECRET must be set when {} is enabled",
                    provider.name().to_uppercase(),
                    provider.name()
                )));
            }
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_builder() -> ConfigBuilder {
        Config::builder().with_client_secret("test-secret")
    }

    #[test]
    fn test_default_config_shape() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.max_skew_ms, DEFAULT_MAX_SKEW_MS);
        assert!(!config.providers.ramp_enabled);
        assert!(!config.providers.nium_enabled);
        assert!(!config.providers.openpayd_enabled);
    }

    #[test]
    fn test_build_requires_client_secret() {
        let err = Config::builder().build().unwrap_err();
        assert!(err.to_string().contains("HMAC_SHARED_SECRET"));
    }

    #[test]
    fn test_build_requires_secret_for_enabled_provider() {
        let err = minimal_builder()
            .with_feature_enabled(Feature::Ramp, true)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("RAMP_WEBHOOK_SECRET"));

        // A disabled provider needs no secret
        let config = minimal_builder().build().unwrap();
        assert!(!config.feature_enabled(Feature::Ramp));
    }

    #[test]
    fn test_build_accepts_enabled_provider_with_secret() {
        let config = minimal_builder()
            .with_feature_enabled(Feature::Nium, true)
            .with_webhook_secret(Provider::Nium, "nium-secret")
            .build()
            .unwrap();
        assert!(config.feature_enabled(Feature::Nium));
        assert_eq!(
            config.webhook_secret(Provider::Nium).expose_secret(),
            "nium-secret"
        );
    }

    #[test]
    fn test_openpayd_flag_needs_no_webhook_secret() {
        // OpenPayd gates client-facing routes only; it has no webhook row.
        let config = minimal_builder()
            .with_feature_enabled(Feature::OpenPayd, true)
            .build()
            .unwrap();
        assert!(config.feature_enabled(Feature::OpenPayd));
    }

    #[test]
    fn test_build_rejects_invalid_log_level() {
        let err = minimal_builder().with_log_level("verbose").build().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_build_rejects_zero_skew() {
        let err = minimal_builder().with_max_skew_ms(0).build().unwrap_err();
        assert!(err.to_string().contains("Replay window"));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = minimal_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-secret"));
    }

    #[test]
    fn test_from_env_reads_secrets_and_flags() {
        unsafe {
            std::env::set_var("KEYSPAY_HMAC_SHARED_SECRET", "env-client-secret");
            std::env::set_var("KEYSPAY_RAMP_ENABLED", "true");
            std::env::set_var("KEYSPAY_RAMP_WEBHOOK_SECRET", "env-ramp-secret");
        }

        let config = Config::builder().from_env().build().unwrap();

        unsafe {
            std::env::remove_var("KEYSPAY_HMAC_SHARED_SECRET");
            std::env::remove_var("KEYSPAY_RAMP_ENABLED");
            std::env::remove_var("KEYSPAY_RAMP_WEBHOOK_SECRET");
        }

        assert_eq!(config.auth.client_secret.expose_secret(), "env-client-secret");
        assert!(config.providers.ramp_enabled);
        assert_eq!(
            config.webhook_secret(Provider::Ramp).expose_secret(),
            "env-ramp-secret"
        );
    }
}
