//! Carryless range coder (Subbotin) driven by [`SubRange`] intervals.
//!
//! The PPM model is coder-agnostic; this pair exists so the crate can code
//! real streams and prove encoder/decoder symmetry. Every `scale` handed in
//! must be at most [`BOT`], which the model's rescale ceiling guarantees.

use crate::ppm::SubRange;

/// Output a byte once the top 8 bits of `low` and `low + range` agree.
pub const TOP: u32 = 1 << 24;
/// Minimum range after normalization.
pub const BOT: u32 = 1 << 15;

/// Range encoder writing to an in-memory buffer.
#[derive(Debug)]
pub struct RangeEncoder {
    low: u32,
    range: u32,
    output: Vec<u8>,
}

impl RangeEncoder {
    /// Fresh encoder.
    pub fn new() -> Self {
        Self::with_output(Vec::new())
    }

    /// Fresh encoder appending to `output`.
    pub fn with_output(output: Vec<u8>) -> Self {
        Self {
            low: 0,
            range: 0xFFFFFFFF,
            output,
        }
    }

    /// Narrow the range to `sub`.
    #[inline]
    pub fn encode(&mut self, sub: &SubRange) {
        debug_assert!(sub.scale > 0 && sub.scale <= BOT, "scale out of range");
        debug_assert!(sub.low_count < sub.high_count && sub.high_count <= sub.scale);
        self.range /= sub.scale;
        self.low = self.low.wrapping_add(sub.low_count * self.range);
        self.range *= sub.high_count - sub.low_count;
        self.normalize();
    }

    #[inline]
    fn normalize(&mut self) {
        while (self.low ^ self.low.wrapping_add(self.range)) < TOP
            || self.range < BOT && {
                self.range = self.low.wrapping_neg() & (BOT - 1);
                true
            }
        {
            self.output.push((self.low >> 24) as u8);
            self.low <<= 8;
            self.range <<= 8;
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Whether nothing has been flushed yet.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Flush the final state and return the coded bytes.
    pub fn finish(mut self) -> Vec<u8> {
        for _ in 0..4 {
            self.output.push((self.low >> 24) as u8);
            self.low <<= 8;
        }
        self.output
    }
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Range decoder reading from a byte slice.
///
/// Reads past the end of input yield zero bytes, so a truncated stream
/// decodes to garbage instead of panicking; callers detect that through
/// framing.
#[derive(Debug)]
pub struct RangeDecoder<'a> {
    low: u32,
    code: u32,
    range: u32,
    input: &'a [u8],
    pos: usize,
}

impl<'a> RangeDecoder<'a> {
    /// Initialize from the first four bytes of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        let mut decoder = Self {
            low: 0,
            code: 0,
            range: 0xFFFFFFFF,
            input,
            pos: 0,
        };
        for _ in 0..4 {
            decoder.code = (decoder.code << 8) | u32::from(decoder.next_byte());
        }
        decoder
    }

    #[inline]
    fn next_byte(&mut self) -> u8 {
        let byte = self.input.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    /// Cumulative count the next symbol falls on, in `0..scale`.
    ///
    /// Must be followed by [`decode`](Self::decode) with the same `scale`.
    #[inline]
    pub fn get_current_count(&mut self, scale: u32) -> u32 {
        debug_assert!(scale > 0 && scale <= BOT, "scale out of range");
        self.range /= scale;
        (self.code.wrapping_sub(self.low) / self.range).min(scale - 1)
    }

    /// Consume the symbol occupying `sub`.
    #[inline]
    pub fn decode(&mut self, sub: &SubRange) {
        self.low = self.low.wrapping_add(sub.low_count * self.range);
        self.range *= sub.high_count - sub.low_count;
        self.normalize();
    }

    #[inline]
    fn normalize(&mut self) {
        while (self.low ^ self.low.wrapping_add(self.range)) < TOP
            || self.range < BOT && {
                self.range = self.low.wrapping_neg() & (BOT - 1);
                true
            }
        {
            self.code = (self.code << 8) | u32::from(self.next_byte());
            self.range <<= 8;
            self.low <<= 8;
        }
    }

    /// Bytes consumed from the input, including any zero padding read past
    /// its end.
    pub const fn byte_position(&self) -> usize {
        self.pos
    }

    /// Whether the decoder has read beyond the end of its input.
    pub const fn overran(&self) -> bool {
        self.pos > self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(low_count: u32, high_count: u32, scale: u32) -> SubRange {
        SubRange {
            low_count,
            high_count,
            scale,
        }
    }

    #[test]
    fn test_fixed_intervals_round_trip() {
        // Skewed three-symbol alphabet with varying scales.
        let table = [sub(0, 1, 3), sub(1, 2, 3), sub(2, 3, 3)];
        let symbols: Vec<usize> = (0..500).map(|i| (i * 7 + i / 3) % 3).collect();

        let mut encoder = RangeEncoder::new();
        for &s in &symbols {
            encoder.encode(&table[s]);
        }
        let bytes = encoder.finish();

        let mut decoder = RangeDecoder::new(&bytes);
        for &expected in &symbols {
            let count = decoder.get_current_count(3);
            let s = table.iter().position(|r| r.contains(count)).unwrap();
            assert_eq!(s, expected);
            decoder.decode(&table[s]);
        }
        assert!(!decoder.overran());
    }

    #[test]
    fn test_extreme_probabilities() {
        // A near-certain symbol and a near-impossible one at the scale limit.
        let likely = sub(0, BOT - 1, BOT);
        let rare = sub(BOT - 1, BOT, BOT);
        let pattern: Vec<bool> = (0..2000).map(|i| i % 97 == 0).collect();

        let mut encoder = RangeEncoder::new();
        for &is_rare in &pattern {
            encoder.encode(if is_rare { &rare } else { &likely });
        }
        let bytes = encoder.finish();
        assert!(bytes.len() < pattern.len() / 4);

        let mut decoder = RangeDecoder::new(&bytes);
        for &is_rare in &pattern {
            let count = decoder.get_current_count(BOT);
            let decoded_rare = rare.contains(count);
            assert_eq!(decoded_rare, is_rare);
            decoder.decode(if decoded_rare { &rare } else { &likely });
        }
    }

    #[test]
    fn test_empty_stream_flushes_state() {
        let bytes = RangeEncoder::new().finish();
        assert_eq!(bytes.len(), 4);
        let decoder = RangeDecoder::new(&bytes);
        assert_eq!(decoder.byte_position(), 4);
        assert!(!decoder.overran());
    }
}
