//! Tracker configuration.
//!
//! Defaults suit an HTTP service emitting random identifiers with strict
//! inbound validation. Override via environment variables, a YAML file, or
//! the `with_*` builders.

use std::path::Path;

use ctrk_core::{Family, IdentifierError};
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::Tracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Family generated when no identifier is supplied.
    pub family: Family,
    /// Origin recorded by `establish` when the caller gives none.
    pub default_origin_type: String,
    /// Service name recorded on the correlation span.
    pub service_name: String,
    /// Accept only well-formed identifiers from inbound sources.
    pub strict_format: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            family: Family::Random,
            default_origin_type: "http".to_string(),
            service_name: "unknown".to_string(),
            strict_format: true,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CTRK_ID_FAMILY` (`4`, `7`, `random`, `time_ordered`; default: `random`)
    /// - `CTRK_DEFAULT_ORIGIN` (default: `http`)
    /// - `CTRK_SERVICE_NAME` (default: `unknown`)
    /// - `CTRK_STRICT_FORMAT` (`true`/`false`/`1`/`0`; default: `true`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`TrackerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("CTRK_ID_FAMILY") {
            config.family = raw.parse().map_err(|source| ConfigError::InvalidFamily {
                var: "CTRK_ID_FAMILY".to_string(),
                source,
            })?;
        }
        if let Some(origin) = lookup("CTRK_DEFAULT_ORIGIN") {
            config.default_origin_type = origin;
        }
        if let Some(name) = lookup("CTRK_SERVICE_NAME") {
            config.service_name = name;
        }
        if let Some(raw) = lookup("CTRK_STRICT_FORMAT") {
            config.strict_format = parse_bool("CTRK_STRICT_FORMAT", &raw)?;
        }
        Ok(config)
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Set the family used when no custom generator is installed.
    pub fn with_family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    /// Set the origin recorded when a unit of work does not supply one.
    pub fn with_default_origin_type(mut self, origin: impl Into<String>) -> Self {
        self.default_origin_type = origin.into();
        self
    }

    /// Set the service name attached to correlation spans.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Choose whether inbound identifiers must be well formed.
    pub fn with_strict_format(mut self, strict: bool) -> Self {
        self.strict_format = strict;
        self
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A family variable or key names no supported family.
    #[error("invalid identifier family in {var}: {source}")]
    InvalidFamily {
        var: String,
        #[source]
        source: IdentifierError,
    },
    /// A boolean variable holds something other than a recognised spelling.
    #[error("invalid boolean for {var}: \"{value}\"")]
    InvalidBool { var: String, value: String },
    /// The YAML document is malformed or has a mistyped key.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The configuration file could not be read.
    #[error("cannot read configuration file {path}: {message}")]
    Io { path: String, message: String },
}
