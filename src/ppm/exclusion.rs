//! Exclusion set for one escape chain.

/// Set of byte values already tried and failed while coding the current
/// symbol.
///
/// Grows monotonically along an escape chain and is cleared once per coded
/// byte. Stored as a 256-bit mask plus a cardinality so membership and size
/// are both O(1).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    mask: [u64; 4],
    len: u16,
}

impl ExclusionSet {
    /// Empty set.
    pub const fn new() -> Self {
        Self {
            mask: [0; 4],
            len: 0,
        }
    }

    /// Add `byte`. Returns `true` if it was not already present.
    #[inline]
    pub fn insert(&mut self, byte: u8) -> bool {
        let (word, bit) = Self::slot(byte);
        if self.mask[word] & bit != 0 {
            return false;
        }
        self.mask[word] |= bit;
        self.len += 1;
        true
    }

    /// Add every byte of `other`.
    pub fn extend_from(&mut self, other: &Self) {
        for (mine, theirs) in self.mask.iter_mut().zip(other.mask) {
            *mine |= theirs;
        }
        self.len = self.mask.iter().map(|w| w.count_ones() as u16).sum();
    }

    /// Whether `byte` is excluded.
    #[inline]
    pub const fn contains(&self, byte: u8) -> bool {
        let (word, bit) = Self::slot(byte);
        self.mask[word] & bit != 0
    }

    /// Number of excluded bytes (0..=256).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether nothing is excluded.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove everything.
    #[inline]
    pub fn clear(&mut self) {
        self.mask = [0; 4];
        self.len = 0;
    }

    /// Excluded bytes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }

    #[inline]
    const fn slot(byte: u8) -> (usize, u64) {
        ((byte >> 6) as usize, 1u64 << (byte & 63))
    }
}

impl FromIterator<u8> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        for byte in iter {
            set.insert(byte);
        }
        set
    }
}

impl std::fmt::Debug for ExclusionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
