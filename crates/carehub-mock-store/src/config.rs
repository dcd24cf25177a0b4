//! Store configuration loaded from TOML.
//!
//! Every key is optional; missing keys fall back to the defaults below.
//!
//! ```toml
//! credential_check = "dev-permissive"
//!
//! [latency]
//! read_ms = 300
//! write_ms = 500
//! sign_in_ms = 500
//! sign_out_ms = 300
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use carehub_contracts::error::{StoreError, StoreResult};

/// Artificial delays applied before each operation resolves.
///
/// They exist so UI code can exercise its loading states against the mock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyProfile {
    pub read_ms: u64,
    pub write_ms: u64,
    pub sign_in_ms: u64,
    pub sign_out_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            read_ms: 300,
            write_ms: 500,
            sign_in_ms: 500,
            sign_out_ms: 300,
        }
    }
}

impl LatencyProfile {
    /// No delay at all.
    pub fn instant() -> Self {
        Self {
            read_ms: 0,
            write_ms: 0,
            sign_in_ms: 0,
            sign_out_ms: 0,
        }
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub fn write(&self) -> Duration {
        Duration::from_millis(self.write_ms)
    }

    pub fn sign_in(&self) -> Duration {
        Duration::from_millis(self.sign_in_ms)
    }

    pub fn sign_out(&self) -> Duration {
        Duration::from_millis(self.sign_out_ms)
    }
}

/// How the sign-in stub treats the password once the email matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialCheck {
    /// The stored password must equal the supplied one.
    #[default]
    Strict,
    /// Any password is accepted for a known email. Development only; every
    /// accepted mismatch is logged at warn level.
    DevPermissive,
}

/// Top-level store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub latency: LatencyProfile,
    pub credential_check: CredentialCheck,
}

impl StoreConfig {
    /// Default credential checking with every delay set to zero.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::instant(),
            ..Self::default()
        }
    }

    /// Parse `s` as TOML.
    ///
    /// Returns `StoreError::ConfigError` if the TOML is malformed or carries
    /// keys this configuration does not know.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::ConfigError {
            reason: format!("failed to parse store config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::ConfigError {
            reason: format!("failed to read store config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
