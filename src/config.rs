//! Configuration Management
//!
//! Endpoints, token and timeouts persisted as JSON under the user config
//! directory.

use crate::cloud::{Endpoint, HttpTransport, ServiceType, Session, TransportOptions};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding the configured token
pub const TOKEN_ENV: &str = "STACKSDK_TOKEN";

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint of each service, keyed by service type
    #[serde(default)]
    pub endpoints: HashMap<ServiceType, Endpoint>,
    /// Token passed through as `X-Auth-Token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total time allowed for one request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            token: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stacksdk").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective token (environment > config)
    pub fn effective_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }

    /// Set the endpoint of a service
    pub fn set_endpoint(&mut self, service: ServiceType, endpoint: Endpoint) {
        self.endpoints.insert(service, endpoint);
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            token: self.effective_token(),
        }
    }

    /// Build a session over an HTTP transport
    pub fn session(&self) -> Result<Session> {
        if self.endpoints.is_empty() {
            return Err(Error::Config("no endpoints configured".to_string()));
        }

        let transport = HttpTransport::new(self.transport_options())?;
        let mut session = Session::new(Arc::new(transport));
        for (service, endpoint) in &self.endpoints {
            let mut normalized = Endpoint::new(&endpoint.url);
            normalized.microversion = endpoint.microversion;
            session = session.with_endpoint(*service, normalized);
        }

        Ok(session)
    }
}
