//! Model configuration.

use crate::error::{PpmError, Result};

use super::MAX_CONTEXT_LENGTH;

/// How the model picks its starting context after each byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContextSearch {
    /// Binary search over context lengths, preferring the shortest
    /// deterministic context and otherwise the longest non-deterministic one.
    ///
    /// Assumes determinism is monotone in context length, which does not
    /// always hold, so this can pick a different context than an exhaustive
    /// scan would. Encoder and decoder still agree.
    #[default]
    Binary,
    /// Scan from the longest available length down to the first context with
    /// children, then collapse through shorter deterministic contexts.
    LongestFirst,
}

impl ContextSearch {
    /// Wire tag used in frame headers.
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Binary => 0,
            Self::LongestFirst => 1,
        }
    }

    /// Inverse of [`to_byte`](Self::to_byte).
    pub const fn from_byte(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Binary),
            1 => Some(Self::LongestFirst),
            _ => None,
        }
    }
}

/// Options for [`PpmModel`](super::PpmModel).
///
/// # Example
///
/// ```rust
/// use ppm_model::{ContextSearch, PpmConfig};
///
/// let config = PpmConfig {
///     max_context_length: 6,
///     search: ContextSearch::LongestFirst,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PpmConfig {
    /// Longest context (in bytes) the model conditions on.
    pub max_context_length: usize,
    /// Starting-context selection strategy.
    pub search: ContextSearch,
}

impl PpmConfig {
    /// Order used by [`Default`].
    pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 4;

    /// Config with `max_context_length` and the default search.
    pub const fn with_max_context_length(max_context_length: usize) -> Self {
        Self {
            max_context_length,
            search: ContextSearch::Binary,
        }
    }

    /// Reject lengths outside `1..=MAX_CONTEXT_LENGTH`.
    pub fn validate(&self) -> Result<()> {
        if (1..=MAX_CONTEXT_LENGTH).contains(&self.max_context_length) {
            Ok(())
        } else {
            Err(PpmError::InvalidConfig {
                requested: self.max_context_length,
                max: MAX_CONTEXT_LENGTH,
            })
        }
    }
}

impl Default for PpmConfig {
    fn default() -> Self {
        Self::with_max_context_length(Self::DEFAULT_MAX_CONTEXT_LENGTH)
    }
}
