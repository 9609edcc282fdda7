//! PPM model orchestrator.
//!
//! Holds the context trie, the backoff model, the history window and the
//! exclusion set, and moves between two states:
//!
//! - **context**: predicting from a trie node of length `>= 1`;
//! - **backoff**: predicting from the order -1 unigram.
//!
//! Escapes walk strictly downward from context towards backoff. Each
//! [`increment`](PpmModel::increment) clears the exclusions and selects a
//! fresh starting context.

use log::{debug, trace};

use super::{
    BackoffModel, ContextSearch, ContextTrie, ExclusionSet, Frequencies, History, NodeId,
    PpmConfig, SubRange, Symbol, MIN_CONTEXT_LENGTH,
};
use crate::error::{PpmError, Result};

/// Adaptive PPM model with Method-C escapes and full exclusion.
///
/// One model serves exactly one coding session. Call
/// [`reset`](Self::reset) before reusing it for another stream.
///
/// # Example
///
/// ```rust
/// use ppm_model::{PpmModel, Symbol};
///
/// let mut model = PpmModel::new(3)?;
/// for &b in b"abracadabr" {
///     model.increment(b);
/// }
///
/// // "abr" has only ever been followed by 'a'.
/// assert!(!model.escaped(Symbol::Byte(b'a')));
/// assert!(model.escaped(Symbol::Byte(b'z')));
/// # Ok::<(), ppm_model::PpmError>(())
/// ```
#[derive(Clone, Debug)]
pub struct PpmModel {
    config: PpmConfig,
    trie: ContextTrie,
    backoff: BackoffModel,
    history: History,
    excluded: ExclusionSet,
    /// Length of the active context, 0 in the backoff state.
    context_length: usize,
    /// Active context node, `None` in the backoff state.
    context: Option<NodeId>,
}

impl PpmModel {
    /// Model conditioning on up to `max_context_length` bytes, with binary
    /// context search.
    pub fn new(max_context_length: usize) -> Result<Self> {
        Self::with_config(PpmConfig::with_max_context_length(max_context_length))
    }

    /// Model built from `config`.
    pub fn with_config(config: PpmConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "new PPM model: max_context_length={} search={:?}",
            config.max_context_length, config.search
        );
        Ok(Self {
            config,
            trie: ContextTrie::new(),
            backoff: BackoffModel::new(),
            history: History::new(config.max_context_length + 1),
            excluded: ExclusionSet::new(),
            context_length: 0,
            context: None,
        })
    }

    /// Forget all statistics and history for a new session.
    pub fn reset(&mut self) {
        debug!("resetting PPM model ({} trie nodes)", self.trie.len());
        self.trie.clear();
        self.backoff.reset();
        self.history.clear();
        self.excluded.clear();
        self.context_length = 0;
        self.context = None;
    }

    /// Configuration the model was built with.
    pub const fn config(&self) -> &PpmConfig {
        &self.config
    }

    /// Longest context the model conditions on.
    pub const fn max_context_length(&self) -> usize {
        self.config.max_context_length
    }

    /// Whether `symbol` must be preceded by an escape from the active
    /// context.
    ///
    /// Always `false` in the backoff state. With an active context, `Eof` is
    /// always escaped and a byte is escaped unless it is a visible child.
    pub fn escaped(&self, symbol: Symbol) -> bool {
        let Some(node) = self.context else {
            return false;
        };
        match symbol {
            Symbol::Byte(byte) => !self.trie.table(node).contains(byte, &self.excluded),
            Symbol::Eof => true,
            Symbol::Escape => false,
        }
    }

    /// Exclude `byte` from the rest of the current escape chain.
    pub fn exclude(&mut self, byte: u8) {
        self.excluded.insert(byte);
    }

    /// Exclude every byte of `set` from the rest of the current escape chain.
    pub fn exclude_set(&mut self, set: &ExclusionSet) {
        self.excluded.extend_from(set);
    }

    /// Interval for coding `symbol` in the current state.
    ///
    /// Bytes and `Eof` leave the model untouched. `Escape` also performs the
    /// escape: the active context's children join the exclusion set and the
    /// model walks down to the next usable context (or to backoff).
    pub fn interval(&mut self, symbol: Symbol) -> Result<SubRange> {
        match (symbol, self.context) {
            (Symbol::Byte(byte), Some(node)) => self
                .trie
                .table(node)
                .interval(byte, &self.excluded)
                .ok_or(PpmError::InvalidState(
                    "byte is not predicted by the active context",
                )),
            (Symbol::Byte(byte), None) => self
                .backoff
                .interval(byte, &self.excluded)
                .ok_or(PpmError::InvalidState("byte is excluded from the backoff model")),
            (Symbol::Escape, Some(node)) => {
                let range = self.trie.table(node).interval_reserved(&self.excluded);
                self.escape(node);
                Ok(range)
            }
            (Symbol::Escape, None) => Err(PpmError::InvalidState(
                "escape requested in the backoff state",
            )),
            (Symbol::Eof, None) => Ok(self.backoff.interval_eof(&self.excluded)),
            (Symbol::Eof, Some(_)) => Err(PpmError::InvalidState(
                "end of stream requested while a context is active",
            )),
        }
    }

    /// Symbol whose interval contains `count`, for the decoder.
    ///
    /// `count` must be below [`total_count`](Self::total_count).
    pub fn point_to_symbol(&self, count: u32) -> Result<Symbol> {
        if count >= self.total_count() {
            return Err(PpmError::InvalidState("point lies outside the current total"));
        }
        Ok(match self.context {
            Some(node) => self
                .trie
                .table(node)
                .point_to_symbol(count, &self.excluded)
                .map_or(Symbol::Escape, Symbol::Byte),
            None => self
                .backoff
                .point_to_symbol(count, &self.excluded)
                .map_or(Symbol::Eof, Symbol::Byte),
        })
    }

    /// Total of the active table under the current exclusions. Never zero.
    pub fn total_count(&self) -> u32 {
        match self.context {
            Some(node) => self.trie.table(node).fast_total(&self.excluded),
            None => self.backoff.total(&self.excluded),
        }
    }

    /// Commit one observed byte.
    ///
    /// Records `byte` under every context length from 0 up to
    /// `min(max_context_length, history length)`, updates the backoff
    /// model, slides the history, clears the exclusions and selects the
    /// starting context for the next symbol.
    pub fn increment(&mut self, byte: u8) {
        let orders = self.history.len().min(self.config.max_context_length);
        for order in 0..=orders {
            self.trie
                .increment(self.history.tail(order).chain(std::iter::once(byte)));
        }
        self.backoff.increment(byte);
        self.history.push(byte);
        self.excluded.clear();
        self.select_context();
    }

    /// Active context as `(length, node)`, `None` in the backoff state.
    pub fn active_context(&self) -> Option<(usize, NodeId)> {
        self.context.map(|node| (self.context_length, node))
    }

    /// Current exclusion set.
    pub const fn excluded(&self) -> &ExclusionSet {
        &self.excluded
    }

    /// Context trie, for inspection.
    pub const fn trie(&self) -> &ContextTrie {
        &self.trie
    }

    /// Backoff model, for inspection.
    pub const fn backoff(&self) -> &BackoffModel {
        &self.backoff
    }

    /// History window.
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Trie node for the most recent `length` bytes of history.
    pub fn lookup_context(&self, length: usize) -> Option<NodeId> {
        if length > self.history.len() {
            return None;
        }
        self.trie.lookup(self.history.tail(length))
    }

    /// Escape out of `node`: exclude its children and walk downward.
    fn escape(&mut self, node: NodeId) {
        if self.context_length >= MIN_CONTEXT_LENGTH {
            for byte in self.trie.table(node).bytes() {
                self.excluded.insert(byte);
            }
        }
        trace!(
            "escape from length {} ({} excluded)",
            self.context_length,
            self.excluded.len()
        );
        self.context_length -= 1;
        self.walk_long_to_short();
    }

    /// Starting at `context_length`, settle on the longest context that
    /// still has a visible child, then collapse through consecutive shorter
    /// contexts while both ends stay deterministic. Falls to backoff below
    /// [`MIN_CONTEXT_LENGTH`].
    fn walk_long_to_short(&mut self) {
        while self.context_length >= MIN_CONTEXT_LENGTH {
            let node = match self.lookup_context(self.context_length) {
                Some(node) if !self.trie.table(node).is_childless(&self.excluded) => node,
                _ => {
                    self.context_length -= 1;
                    continue;
                }
            };

            let mut node = node;
            while self.context_length > MIN_CONTEXT_LENGTH
                && self.trie.table(node).is_deterministic(&self.excluded)
            {
                match self.lookup_context(self.context_length - 1) {
                    Some(shorter) if self.trie.table(shorter).is_deterministic(&self.excluded) => {
                        node = shorter;
                        self.context_length -= 1;
                    }
                    _ => break,
                }
            }
            self.context = Some(node);
            return;
        }

        trace!("falling back to order -1");
        self.context_length = 0;
        self.context = None;
    }

    fn select_context(&mut self) {
        let available = self.history.len().min(self.config.max_context_length);
        match self.config.search {
            ContextSearch::Binary => self.binary_search(available),
            ContextSearch::LongestFirst => {
                self.context_length = available;
                self.walk_long_to_short();
            }
        }
    }

    /// Binary search over lengths `1..=available`.
    ///
    /// Deterministic hits shrink the upper bound looking for a shorter one;
    /// non-deterministic hits grow the lower bound looking for a longer one,
    /// and are only kept while no deterministic context has been seen.
    fn binary_search(&mut self, available: usize) {
        let mut low = 1usize;
        let mut high = available;
        let mut best: Option<(usize, NodeId)> = None;
        let mut found_deterministic = false;

        while low <= high {
            let mid = (low + high) / 2;
            let Some(node) = self.lookup_context(mid) else {
                high = mid - 1;
                continue;
            };
            let table = self.trie.table(node);
            if table.is_childless(&self.excluded) {
                high = mid - 1;
            } else if table.is_deterministic(&self.excluded) {
                best = Some((mid, node));
                found_deterministic = true;
                high = mid - 1;
            } else {
                if !found_deterministic {
                    best = Some((mid, node));
                }
                low = mid + 1;
            }
        }

        match best {
            Some((length, node)) => {
                self.context_length = length;
                self.context = Some(node);
            }
            None => {
                self.context_length = 0;
                self.context = None;
            }
        }
    }
}
