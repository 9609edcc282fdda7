//! Adaptive PPM context model for byte-oriented arithmetic coding.
//!
//! [`PpmModel`] keeps variable-order statistics in a context trie, escapes
//! from long contexts to shorter ones with Method C escape weights and full
//! exclusion, and falls back to an order -1 model that can code every byte
//! plus end of stream. The coder asks the model for cumulative intervals;
//! the model never touches the bit stream itself.
//!
//! A carryless range coder and a framed [`compress`]/[`decompress`] pair
//! are included so the model can be driven end to end.
//!
//! ## Features
//! - Core library depends only on `thiserror` and `log`
//! - `parallel` - Independent-block compression on the rayon pool

mod crc32;
pub mod codec;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod ppm;
pub mod range_coder;


pub use codec::{compress, decode, decompress, encode, FrameHeader};
pub use error::{PpmError, Result};
pub use ppm::{
    BackoffModel, ContextSearch, ContextTrie, ExclusionSet, Frequencies, History, NodeId,
    NodeTable, PpmConfig, PpmModel, SubRange, Symbol, MAX_CONTEXT_LENGTH, MAX_TOTAL,
    MIN_CONTEXT_LENGTH,
};
pub use range_coder::{RangeDecoder, RangeEncoder};

#[cfg(feature = "parallel")]
pub use parallel::{compress_blocks, decompress_blocks};
