//! Adaptive PPM (Prediction by Partial Matching) context model.
//!
//! The model predicts the next byte from up to `max_context_length` bytes of
//! history and hands an arithmetic coder the cumulative interval it needs to
//! code one symbol.
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | [`ContextTrie`] | Arena of context nodes, first-child / next-sibling linked |
//! | [`Frequencies`] | Method-C intervals over one context, honoring exclusions |
//! | [`ExclusionSet`] | Bytes ruled out earlier in the current escape chain |
//! | [`BackoffModel`] | Order -1 unigram fallback, also carries `Eof` |
//! | [`History`] | Ring buffer of the most recent bytes |
//! | [`PpmModel`] | Selects the active context and ties the above together |
//!
//! ## Coding loop
//!
//! ```text
//! encode b:                          decode:
//!   while escaped(b):                  loop:
//!     code interval(Escape)              count = coder(total_count())
//!   code interval(Byte(b))               s = point_to_symbol(count)
//!   increment(b)                         code interval(s)
//!                                        if s == Escape: continue
//!                                        if s == Eof: stop
//!                                        increment(s); emit s
//! ```
//!
//! Computing an interval never mutates the statistics; only
//! [`PpmModel::increment`] does. Asking for the escape interval advances the
//! escape chain, so the coder's next query sees the shorter context.

mod backoff;
mod config;
mod exclusion;
mod frequency;
mod history;
mod model;
mod trie;

pub use backoff::BackoffModel;
pub use config::{ContextSearch, PpmConfig};
pub use exclusion::ExclusionSet;
pub use frequency::Frequencies;
pub use history::History;
pub use model::PpmModel;
pub use trie::{ContextTrie, NodeId, NodeTable};

/// Shortest context length the model predicts from; below it the backoff
/// model takes over.
pub const MIN_CONTEXT_LENGTH: usize = 1;

/// Longest supported context length.
pub const MAX_CONTEXT_LENGTH: usize = 64;

/// Ceiling on a table's total before its counts are halved.
///
/// Stays below the range coder's `BOT` so every scale divides the range.
pub const MAX_TOTAL: u32 = 1 << 14;

/// A symbol the coder can ask the model about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A literal byte value.
    Byte(u8),
    /// "Not predictable here, fall back to a shorter context."
    Escape,
    /// End of stream.
    Eof,
}

impl From<u8> for Symbol {
    fn from(byte: u8) -> Self {
        Self::Byte(byte)
    }
}

/// Cumulative-count interval for one coded symbol.
///
/// The symbol occupies `[low_count, high_count)` out of `scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubRange {
    /// Cumulative count below the symbol.
    pub low_count: u32,
    /// Cumulative count up to and including the symbol.
    pub high_count: u32,
    /// Total of the table the interval was taken from.
    pub scale: u32,
}

impl SubRange {
    /// Width of the interval.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.high_count - self.low_count
    }

    /// Whether `count` falls inside the interval.
    #[inline]
    pub const fn contains(&self, count: u32) -> bool {
        self.low_count <= count && count < self.high_count
    }
}
