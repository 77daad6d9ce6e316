//! Execution context gating registry-sourced injection.

use std::borrow::Cow;

/// Execution context passed alongside every injection root.
///
/// Registry values are only handed out while a context is active. Without
/// one, marked fields are accepted solely when they already hold a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    name: Option<Cow<'static, str>>,
}

impl Context {
    /// Creates an active context. The name shows up in log spans.
    pub fn active(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Creates a context with no active scope.
    pub fn inactive() -> Self {
        Self { name: None }
    }

    pub fn is_active(&self) -> bool {
        self.name.is_some()
    }

    /// Returns the context name, or `"<none>"` when inactive.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<none>")
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::inactive()
    }
}
