//! Client configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional file
//! (TOML or YAML), then `EVA_*` environment variables.

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for talking to the events API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base endpoint every request path is resolved against
    pub base_url: String,
    /// Transport timeout in seconds; 0 disables it
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Default API endpoint
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000/api/";

    /// Load configuration with defaults, an optional file and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("EVA"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Transport timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 0,
            user_agent: concat!("eva-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
