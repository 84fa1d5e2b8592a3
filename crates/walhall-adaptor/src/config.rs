//! Configuration for the Walhall API adaptor.
//!
//! All upstream addressing is explicit configuration passed into the server
//! at construction; resolution logic never reads ambient state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AdaptorError, AdaptorResult};

/// Adaptor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptorConfig {
    /// Listener settings.
    pub server: ServerSettings,
    /// Upstream Walhall Core settings.
    pub upstream: UpstreamSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
}

impl AdaptorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AdaptorConfigBuilder {
        AdaptorConfigBuilder::default()
    }

    /// Load configuration from a TOML or JSON file.
    pub fn from_file(path: impl Into<PathBuf>) -> AdaptorResult<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| AdaptorError::config(format!("failed to read config file: {e}")))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match extension {
            "toml" => toml::from_str(&content)
                .map_err(|e| AdaptorError::config(format!("invalid TOML: {e}"))),
            "json" => serde_json::from_str(&content)
                .map_err(|e| AdaptorError::config(format!("invalid JSON: {e}"))),
            _ => Err(AdaptorError::config(format!(
                "unsupported config format: {extension}"
            ))),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// `WALHALL_API_PREFIX` sets the upstream base URL, `WALHALL_REGISTRY`
    /// the registry name used in public image references, and `PORT` the
    /// listen port.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(prefix) = std::env::var("WALHALL_API_PREFIX") {
            self.upstream.api_prefix = prefix;
        }

        if let Ok(registry) = std::env::var("WALHALL_REGISTRY") {
            self.upstream.registry = registry;
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.listen_port = port;
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AdaptorResult<()> {
        if self.upstream.api_prefix.is_empty() {
            return Err(AdaptorError::config("upstream api_prefix is required"));
        }

        if !self.upstream.api_prefix.starts_with("http://")
            && !self.upstream.api_prefix.starts_with("https://")
        {
            return Err(AdaptorError::config(
                "upstream api_prefix must start with http:// or https://",
            ));
        }

        Ok(())
    }
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to.
    pub listen_addr: String,
    /// Port the adaptor listens on.
    pub listen_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
        }
    }
}

/// Upstream Walhall Core settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Base URL every upstream path is prefixed with.
    pub api_prefix: String,
    /// Registry name used when shaping public image references.
    pub registry: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_prefix: String::new(),
            registry: "registry.walhall.io".to_string(),
        }
    }
}

/// Telemetry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Builder for [`AdaptorConfig`].
#[derive(Debug, Default)]
pub struct AdaptorConfigBuilder {
    config: AdaptorConfig,
}

impl AdaptorConfigBuilder {
    /// Set the listen address.
    #[must_use]
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server.listen_addr = addr.into();
        self
    }

    /// Set the listen port.
    #[must_use]
    pub fn listen_port(mut self, port: u16) -> Self {
        self.config.server.listen_port = port;
        self
    }

    /// Set the upstream base URL.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.upstream.api_prefix = prefix.into();
        self
    }

    /// Set the registry name.
    #[must_use]
    pub fn registry(mut self, registry: impl Into<String>) -> Self {
        self.config.upstream.registry = registry.into();
        self
    }

    /// Build the configuration, validating it.
    pub fn build(self) -> AdaptorResult<AdaptorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
