//! Order -1 backoff model.

use log::trace;

use super::{ExclusionSet, Frequencies, SubRange, MAX_TOTAL};

/// Weight of the `Eof` band at the top of the backoff range.
const EOF_WEIGHT: u32 = 1;

/// Adaptive unigram over all 256 byte values.
///
/// Every byte starts at count 1, so the backoff model can code any byte the
/// current escape chain has not excluded, and it never escapes. `Eof` lives
/// in the reserved band above byte 255.
#[derive(Clone, Debug)]
pub struct BackoffModel {
    counts: [u32; 256],
    sum: u32,
}

impl BackoffModel {
    /// Uniform model.
    pub const fn new() -> Self {
        Self {
            counts: [1; 256],
            sum: 256,
        }
    }

    /// Back to uniform.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Count one observation of `byte`, halving everything once the total
    /// passes [`MAX_TOTAL`].
    pub fn increment(&mut self, byte: u8) {
        self.counts[byte as usize] += 1;
        self.sum += 1;
        if self.sum + EOF_WEIGHT > MAX_TOTAL {
            self.rescale();
        }
    }

    /// Current count of `byte`.
    #[inline]
    pub fn count(&self, byte: u8) -> u32 {
        self.counts[byte as usize]
    }

    /// Interval of `Eof`.
    pub fn interval_eof(&self, excluded: &ExclusionSet) -> SubRange {
        self.interval_reserved(excluded)
    }

    fn rescale(&mut self) {
        let before = self.sum;
        self.sum = 0;
        for count in &mut self.counts {
            *count = count.div_ceil(2);
            self.sum += *count;
        }
        trace!("rescaled backoff model: {} -> {}", before, self.sum);
    }
}

impl Default for BackoffModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Frequencies for BackoffModel {
    fn entries(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        (0..=255u8).zip(self.counts.iter().copied())
    }

    fn reserved_weight(&self, _distinct: u32) -> u32 {
        EOF_WEIGHT
    }

    fn total(&self, excluded: &ExclusionSet) -> u32 {
        if excluded.is_empty() {
            self.sum + EOF_WEIGHT
        } else {
            let (sum, _) = self.tally(excluded);
            sum + EOF_WEIGHT
        }
    }

    fn contains(&self, byte: u8, excluded: &ExclusionSet) -> bool {
        !excluded.contains(byte)
    }
}
