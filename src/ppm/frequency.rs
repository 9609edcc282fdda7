//! Method-C cumulative frequencies over one prediction table.

use super::{ExclusionSet, SubRange};

/// Read side of a frequency table: the observed bytes of one context and
/// a reserved band (escape for trie contexts, `Eof` for the backoff model)
/// placed at the top of the cumulative range.
///
/// Every query skips bytes in the caller's [`ExclusionSet`]. Cumulative
/// order is the order of [`entries`](Self::entries); implementors must
/// yield each byte at most once and never with a zero count.
pub trait Frequencies {
    /// Observed `(byte, count)` pairs in cumulative order.
    fn entries(&self) -> impl Iterator<Item = (u8, u32)> + '_;

    /// Weight of the reserved band when `distinct` bytes remain visible.
    ///
    /// Must be at least 1 so the reserved symbol stays codable even when
    /// every byte is excluded.
    fn reserved_weight(&self, distinct: u32) -> u32;

    /// Sum of visible counts and number of visible bytes.
    fn tally(&self, excluded: &ExclusionSet) -> (u32, u32) {
        self.entries()
            .filter(|&(byte, _)| !excluded.contains(byte))
            .fold((0, 0), |(sum, distinct), (_, count)| {
                (sum + count, distinct + 1)
            })
    }

    /// Visible counts plus the reserved band.
    fn total(&self, excluded: &ExclusionSet) -> u32 {
        let (sum, distinct) = self.tally(excluded);
        sum + self.reserved_weight(distinct)
    }

    /// Interval of `byte`, or `None` if it is unobserved or excluded.
    fn interval(&self, byte: u8, excluded: &ExclusionSet) -> Option<SubRange> {
        if excluded.contains(byte) {
            return None;
        }
        let mut sum = 0u32;
        let mut distinct = 0u32;
        let mut found = None;
        for (b, count) in self.entries() {
            if excluded.contains(b) {
                continue;
            }
            if b == byte {
                found = Some((sum, count));
            }
            sum += count;
            distinct += 1;
        }
        let scale = sum + self.reserved_weight(distinct);
        found.map(|(low, count)| SubRange {
            low_count: low,
            high_count: low + count,
            scale,
        })
    }

    /// Interval of the reserved band.
    fn interval_reserved(&self, excluded: &ExclusionSet) -> SubRange {
        let (sum, distinct) = self.tally(excluded);
        let scale = sum + self.reserved_weight(distinct);
        SubRange {
            low_count: sum,
            high_count: scale,
            scale,
        }
    }

    /// Inverse of [`interval`](Self::interval): the byte whose interval
    /// contains `count`, or `None` when `count` lands in the reserved band.
    fn point_to_symbol(&self, count: u32, excluded: &ExclusionSet) -> Option<u8> {
        let mut high = 0u32;
        for (byte, c) in self.entries() {
            if excluded.contains(byte) {
                continue;
            }
            high += c;
            if count < high {
                return Some(byte);
            }
        }
        None
    }

    /// Whether `byte` is observed and not excluded.
    fn contains(&self, byte: u8, excluded: &ExclusionSet) -> bool {
        !excluded.contains(byte) && self.entries().any(|(b, _)| b == byte)
    }

    /// Exactly one visible byte.
    fn is_deterministic(&self, excluded: &ExclusionSet) -> bool {
        self.entries()
            .filter(|&(byte, _)| !excluded.contains(byte))
            .take(2)
            .count()
            == 1
    }

    /// No visible byte.
    fn is_childless(&self, excluded: &ExclusionSet) -> bool {
        self.entries().all(|(byte, _)| excluded.contains(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain vector table with a Method-C reserved band.
    struct Table(Vec<(u8, u32)>);

    impl Frequencies for Table {
        fn entries(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
            self.0.iter().copied()
        }

        fn reserved_weight(&self, distinct: u32) -> u32 {
            distinct.max(1)
        }
    }

    fn table() -> Table {
        Table(vec![(b'a', 3), (b'b', 1), (b'c', 2)])
    }

    #[test]
    fn test_intervals_tile_the_range() {
        let table = table();
        for excluded in [
            ExclusionSet::new(),
            [b'b'].into_iter().collect(),
            [b'a', b'c'].into_iter().collect(),
            [b'a', b'b', b'c'].into_iter().collect(),
        ] {
            let total = table.total(&excluded);
            let mut ranges: Vec<SubRange> = [b'a', b'b', b'c']
                .into_iter()
                .filter_map(|b| table.interval(b, &excluded))
                .collect();
            ranges.push(table.interval_reserved(&excluded));
            ranges.sort_by_key(|r| r.low_count);

            let mut next = 0;
            for r in &ranges {
                assert_eq!(r.scale, total);
                assert_eq!(r.low_count, next);
                assert!(r.width() > 0);
                next = r.high_count;
            }
            assert_eq!(next, total);
        }
    }

    #[test]
    fn test_method_c_escape_weight() {
        let table = table();
        let none = ExclusionSet::new();
        // 6 observations + 3 distinct
        assert_eq!(table.total(&none), 9);
        assert_eq!(
            table.interval_reserved(&none),
            SubRange {
                low_count: 6,
                high_count: 9,
                scale: 9
            }
        );

        let all: ExclusionSet = [b'a', b'b', b'c'].into_iter().collect();
        assert_eq!(table.total(&all), 1);
        assert_eq!(table.interval_reserved(&all).width(), 1);
    }

    #[test]
    fn test_point_to_symbol_inverts_interval() {
        let table = table();
        let excluded: ExclusionSet = [b'a'].into_iter().collect();
        for count in 0..table.total(&excluded) {
            match table.point_to_symbol(count, &excluded) {
                Some(byte) => {
                    let r = table.interval(byte, &excluded).unwrap();
                    assert!(r.contains(count));
                }
                None => assert!(table.interval_reserved(&excluded).contains(count)),
            }
        }
        assert_eq!(table.interval(b'a', &excluded), None);
    }

    #[test]
    fn test_determinism_and_childless() {
        let table = table();
        let none = ExclusionSet::new();
        assert!(!table.is_deterministic(&none));
        assert!(!table.is_childless(&none));

        let two: ExclusionSet = [b'a', b'b'].into_iter().collect();
        assert!(table.is_deterministic(&two));
        assert!(table.contains(b'c', &two));
        assert!(!table.contains(b'a', &two));

        let all: ExclusionSet = [b'a', b'b', b'c'].into_iter().collect();
        assert!(table.is_childless(&all));
        assert!(!table.is_deterministic(&all));
    }
}
