//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::waiter::WaitOptions;

/// Compute endpoint and polling defaults derived from environment variables
/// and configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "NOVA",
    discovery(
        app_name = "nova-wait",
        env_var = "NOVA_CONFIG_PATH",
        config_file_name = "nova.toml",
        dotfile_name = ".nova.toml",
        project_file_name = "nova.toml"
    )
)]
pub struct ComputeConfig {
    /// Base URL of the Compute API including the project segment, for
    /// example `https://compute.example.com/v2.1/<project>`.
    pub endpoint: String,
    /// Pre-issued Keystone token sent as `X-Auth-Token`.
    pub auth_token: String,
    /// Seconds between status polls. Defaults to 5.
    #[ortho_config(default = 5)]
    pub poll_interval_secs: u64,
    /// Seconds before a wait gives up. Unset waits indefinitely.
    pub wait_timeout_secs: Option<u64>,
    /// Per-request HTTP timeout in seconds. Defaults to 30.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to nova.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

impl ComputeConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    const fn require_positive(value: u64, field: &'static str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                field,
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("nova-wait")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and configuration key that supply each missing value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::InvalidValue`] for zero intervals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.endpoint,
            &FieldMetadata::new("Compute API endpoint", "NOVA_ENDPOINT", "endpoint"),
        )?;
        Self::require_field(
            &self.auth_token,
            &FieldMetadata::new("authentication token", "NOVA_AUTH_TOKEN", "auth_token"),
        )?;
        Self::require_positive(self.poll_interval_secs, "poll_interval_secs")?;
        Self::require_positive(self.request_timeout_secs, "request_timeout_secs")?;
        Ok(())
    }

    /// Delay between status polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Overall wait deadline, if one is configured.
    #[must_use]
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs.map(Duration::from_secs)
    }

    /// Timeout applied to each HTTP request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Wait options seeded with the configured interval and timeout.
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .refresh_delay(self.poll_interval())
            .maybe_timeout(self.wait_timeout())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value outside its allowed range.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Configuration key that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
