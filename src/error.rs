//! Injection error types.

use thiserror::Error;

/// Errors raised while wiring values into marked fields.
#[derive(Error, Debug)]
pub enum InjectionError {
    // Matching errors
    #[error(
        "#[inject] cannot be applied to field `{owner}.{field}` of type {declared}. \
         Supported types are: {supported:?}"
    )]
    UnsupportedFieldType {
        owner: &'static str,
        field: &'static str,
        declared: &'static str,
        supported: Vec<&'static str>,
    },

    #[error("Cannot access {target}: {source}")]
    AccessFailure {
        target: String,
        #[source]
        source: SlotError,
    },

    #[error("Injection depth limit of {limit} exceeded while entering {owner}")]
    DepthExceeded { limit: usize, owner: &'static str },

    // Construction errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type registered more than once: {0}")]
    DuplicateRegistration(&'static str),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Low-level failures reading or writing a single slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("expected a value of type {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("lock poisoned by a panicking holder")]
    Poisoned,
}
