//! # Ledger Configuration
//!
//! YAML-loadable settings for an [`AccumulatorEngine`](crate::AccumulatorEngine).
//! Every field has a default, so an empty document is a valid config.
//!
//! ```yaml
//! ledger_principal: cagg-ledger
//! allow_post_disclosure_submit: false
//! access_admins: [registrar]
//! event_capacity: 256
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cagg_core::Principal;

/// Default capacity of the notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Default name of the ledger's own principal.
pub const DEFAULT_LEDGER_PRINCIPAL: &str = "cagg-ledger";

/// Error loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The document is not valid YAML for this schema.
    #[error("invalid config document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// The principal the ledger computes as. Proofs are bound to it and it
    /// keeps access to every accumulator.
    pub ledger_principal: Principal,

    /// Whether a disclosed bucket keeps accepting contributions. When
    /// `false` such submissions fail and the disclosed sum stays frozen;
    /// when `true` they are folded and the new sum is made public again.
    pub allow_post_disclosure_submit: bool,

    /// Principals besides the ledger that may extend access lists.
    pub access_admins: Vec<Principal>,

    /// Capacity of the notification channel. Slow subscribers that fall
    /// further behind than this miss events.
    pub event_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_principal: Principal::new(DEFAULT_LEDGER_PRINCIPAL),
            allow_post_disclosure_submit: false,
            access_admins: Vec::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        let config = if document.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(document)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&document)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger_principal.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ledger_principal must not be empty".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `principal` may extend a bucket's access list.
    pub fn may_grant(&self, principal: &Principal) -> bool {
        *principal == self.ledger_principal || self.access_admins.contains(principal)
    }
}
