//! Injector configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. Project config: `fieldwire.toml`
//! 3. Environment variables: `FIELDWIRE_*`
//!
//! # Example
//!
//! ```toml
//! # fieldwire.toml
//! preserve_populated = true
//! max_depth = 32
//! ```
//!
//! The same settings can be overridden with `FIELDWIRE_PRESERVE_POPULATED=false`
//! or `FIELDWIRE_MAX_DEPTH=128`. Leaving `max_depth` unset imposes no depth cap.

use std::ops::Deref;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default project config file name.
pub const CONFIG_FILE: &str = "fieldwire.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FIELDWIRE_";

/// Failure to assemble an [`InjectorConfig`] from its layers. Boxed so
/// `Result<InjectorConfig, _>` stays small.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Behaviour switches for an [`Injector`](crate::Injector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// Keep values already present in marked fields instead of replacing them
    /// with registry output. Populated fields are still scanned recursively.
    pub preserve_populated: bool,
    /// Optional cap on the nesting of pre-populated values and decorator
    /// payloads below the root target. Unset means no cap; cycles are still
    /// cut by identity.
    pub max_depth: Option<usize>,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            preserve_populated: false,
            max_depth: None,
        }
    }
}

impl InjectorConfig {
    /// Load config with layered resolution (defaults → `fieldwire.toml` → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`load`](Self::load) but reads the TOML layer from `path`.
    /// A missing file is skipped.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(Toml::file(path.as_ref()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Extract from a caller-assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }
}
