// Configuration errors.
//
// The game core itself never fails at runtime: odd inputs degrade into odd
// visuals. The only fallible boundary is loading and validating a
// `GameConfig`.

use thiserror::Error;

/// Errors produced while loading or validating a [`crate::config::GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON could not be parsed into a config.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field parsed but holds a value the game cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Dotted path of the offending field, for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Parse(_) => None,
            Self::Invalid { field, .. } => Some(field),
        }
    }
}
