//! Sliding window of recent bytes.

/// Fixed-capacity ring buffer of the most recently observed bytes.
///
/// Once full, each push drops the oldest byte. Indexing and
/// [`tail`](Self::tail) are oldest-first, the order context paths are stored
/// in the trie.
#[derive(Clone, Debug)]
pub struct History {
    buf: Box<[u8]>,
    /// Slot of the oldest byte.
    start: usize,
    len: usize,
}

impl History {
    /// Empty window holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            start: 0,
            len: 0,
        }
    }

    /// Maximum number of bytes kept.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes currently held.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been pushed since construction or [`clear`](Self::clear).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `byte`, evicting the oldest when full.
    pub fn push(&mut self, byte: u8) {
        let cap = self.buf.len();
        if self.len < cap {
            self.buf[(self.start + self.len) % cap] = byte;
            self.len += 1;
        } else {
            self.buf[self.start] = byte;
            self.start = (self.start + 1) % cap;
        }
    }

    /// Byte at `index`, 0 being the oldest held.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        (index < self.len).then(|| self.buf[(self.start + index) % self.buf.len()])
    }

    /// The most recent `length` bytes, oldest first. Clamped to [`len`](Self::len).
    pub fn tail(&self, length: usize) -> impl Iterator<Item = u8> + '_ {
        let length = length.min(self.len);
        (self.len - length..self.len).map(move |i| self.buf[(self.start + i) % self.buf.len()])
    }

    /// All held bytes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.tail(self.len)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_then_slides() {
        let mut history = History::new(3);
        assert!(history.is_empty());
        history.push(1);
        history.push(2);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![1, 2]);

        for b in 3..=5 {
            history.push(b);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(history.get(0), Some(3));
        assert_eq!(history.get(3), None);
    }

    #[test]
    fn test_tail_is_oldest_first_and_clamped() {
        let mut history = History::new(4);
        for b in b"abcdef" {
            history.push(*b);
        }
        assert_eq!(history.tail(2).collect::<Vec<_>>(), b"ef".to_vec());
        assert_eq!(history.tail(10).collect::<Vec<_>>(), b"cdef".to_vec());
        assert_eq!(history.tail(0).count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(2);
        history.push(9);
        history.clear();
        assert!(history.is_empty());
        history.push(7);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![7]);
    }
}
