//! Drivers that run a [`PpmModel`] in lock-step with the range coder, and
//! a small self-describing frame around the coded payload.
//!
//! ## Frame layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Magic `PPMc` |
//! | 4 | 1 | Version (`1`) |
//! | 5 | 1 | Max context length |
//! | 6 | 1 | Context search (`0` binary, `1` longest-first) |
//! | 7 | 8 | Original length, little-endian |
//! | 15 | 4 | CRC-32 of the original bytes, little-endian |
//! | 19 | .. | Range-coded payload |

use log::debug;

use crate::crc32::crc32;
use crate::error::{PpmError, Result};
use crate::ppm::{ContextSearch, PpmConfig, PpmModel, Symbol};
use crate::range_coder::{RangeDecoder, RangeEncoder};

/// Frame magic.
pub const MAGIC: &[u8; 4] = b"PPMc";
/// Frame format version.
pub const VERSION: u8 = 1;
/// Frame header size in bytes.
pub const HEADER_SIZE: usize = 19;

/// Upper bound on the up-front output allocation while decoding, so a
/// forged length field cannot force a huge reservation.
const MAX_PREALLOC: usize = 1 << 20;

/// Code `symbol`, escaping down from the active context as needed.
fn encode_symbol(
    model: &mut PpmModel,
    encoder: &mut RangeEncoder,
    symbol: Symbol,
) -> Result<()> {
    while model.escaped(symbol) {
        encoder.encode(&model.interval(Symbol::Escape)?);
    }
    encoder.encode(&model.interval(symbol)?);
    Ok(())
}

/// Decode the next non-escape symbol.
fn decode_symbol(model: &mut PpmModel, decoder: &mut RangeDecoder<'_>) -> Result<Symbol> {
    // At most one escape per context length, then the symbol itself.
    for _ in 0..=model.max_context_length() {
        let count = decoder.get_current_count(model.total_count());
        let symbol = model.point_to_symbol(count)?;
        decoder.decode(&model.interval(symbol)?);
        if symbol != Symbol::Escape {
            return Ok(symbol);
        }
    }
    Err(PpmError::CorruptStream)
}

/// Code every byte of `data` followed by `Eof`.
///
/// `model` should be fresh (or [`reset`](PpmModel::reset)) and must be
/// mirrored by an identically configured model on the decoding side.
pub fn encode(model: &mut PpmModel, data: &[u8], encoder: &mut RangeEncoder) -> Result<()> {
    for &byte in data {
        encode_symbol(model, encoder, Symbol::Byte(byte))?;
        model.increment(byte);
    }
    encode_symbol(model, encoder, Symbol::Eof)
}

/// Decode bytes until `Eof`.
///
/// Fails with [`PpmError::CorruptStream`] if more than `limit` bytes come
/// out before `Eof`, or if the decoder runs off the end of its input.
pub fn decode(
    model: &mut PpmModel,
    decoder: &mut RangeDecoder<'_>,
    limit: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(limit.min(MAX_PREALLOC));
    loop {
        let symbol = decode_symbol(model, decoder)?;
        // A well-formed stream is never read past its end.
        if decoder.overran() {
            return Err(PpmError::CorruptStream);
        }
        match symbol {
            Symbol::Byte(byte) => {
                if out.len() == limit {
                    return Err(PpmError::CorruptStream);
                }
                out.push(byte);
                model.increment(byte);
            }
            Symbol::Eof => return Ok(out),
            Symbol::Escape => return Err(PpmError::CorruptStream),
        }
    }
}

/// Compress `data` into a self-describing frame.
///
/// # Example
///
/// ```rust
/// use ppm_model::{compress, decompress, PpmConfig};
///
/// let data = b"how much wood would a woodchuck chuck".repeat(20);
/// let frame = compress(&data, &PpmConfig::default())?;
/// assert!(frame.len() < data.len());
/// assert_eq!(decompress(&frame)?, data);
/// # Ok::<(), ppm_model::PpmError>(())
/// ```
pub fn compress(data: &[u8], config: &PpmConfig) -> Result<Vec<u8>> {
    let mut model = PpmModel::with_config(*config)?;

    let mut header = Vec::with_capacity(HEADER_SIZE + data.len() / 2);
    header.extend_from_slice(MAGIC);
    header.push(VERSION);
    header.push(config.max_context_length as u8);
    header.push(config.search.to_byte());
    header.extend_from_slice(&(data.len() as u64).to_le_bytes());
    header.extend_from_slice(&crc32(data).to_le_bytes());

    let mut encoder = RangeEncoder::with_output(header);
    encode(&mut model, data, &mut encoder)?;
    let frame = encoder.finish();

    debug!(
        "compressed {} -> {} bytes (order {}, {} trie nodes)",
        data.len(),
        frame.len(),
        config.max_context_length,
        model.trie().len()
    );
    Ok(frame)
}

/// Parsed frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    /// Model configuration the payload was coded with.
    pub config: PpmConfig,
    /// Length of the original data.
    pub length: u64,
    /// CRC-32 of the original data.
    pub crc: u32,
}

impl FrameHeader {
    /// Parse the header at the start of `frame`.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        if frame.len() < HEADER_SIZE || &frame[..4] != MAGIC || frame[4] != VERSION {
            return Err(PpmError::InvalidHeader);
        }
        let search = ContextSearch::from_byte(frame[6]).ok_or(PpmError::InvalidHeader)?;
        let config = PpmConfig {
            max_context_length: frame[5] as usize,
            search,
        };
        config.validate().map_err(|_| PpmError::InvalidHeader)?;

        let mut length = [0u8; 8];
        length.copy_from_slice(&frame[7..15]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&frame[15..19]);

        Ok(Self {
            config,
            length: u64::from_le_bytes(length),
            crc: u32::from_le_bytes(crc),
        })
    }
}

/// Decompress a frame produced by [`compress`], verifying length and
/// checksum.
pub fn decompress(frame: &[u8]) -> Result<Vec<u8>> {
    let header = FrameHeader::parse(frame)?;
    let limit = usize::try_from(header.length).map_err(|_| PpmError::InvalidHeader)?;

    let mut model = PpmModel::with_config(header.config)?;
    let mut decoder = RangeDecoder::new(&frame[HEADER_SIZE..]);
    let out = decode(&mut model, &mut decoder, limit)?;

    if out.len() as u64 != header.length {
        return Err(PpmError::LengthMismatch {
            expected: header.length,
            actual: out.len() as u64,
        });
    }
    let actual = crc32(&out);
    if actual != header.crc {
        return Err(PpmError::ChecksumMismatch {
            expected: header.crc,
            actual,
        });
    }

    debug!(
        "decompressed {} -> {} bytes (order {})",
        frame.len(),
        out.len(),
        header.config.max_context_length
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields() {
        let config = PpmConfig {
            max_context_length: 5,
            search: ContextSearch::LongestFirst,
        };
        let frame = compress(b"header", &config).unwrap();
        assert_eq!(&frame[..4], MAGIC);
        let header = FrameHeader::parse(&frame).unwrap();
        assert_eq!(header.config, config);
        assert_eq!(header.length, 6);
        assert_eq!(header.crc, crc32(b"header"));
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert_eq!(decompress(b""), Err(PpmError::InvalidHeader));
        assert_eq!(decompress(b"PPMc"), Err(PpmError::InvalidHeader));

        let frame = compress(b"abc", &PpmConfig::default()).unwrap();

        let mut bad_magic = frame.clone();
        bad_magic[0] = b'X';
        assert_eq!(decompress(&bad_magic), Err(PpmError::InvalidHeader));

        let mut bad_version = frame.clone();
        bad_version[4] = 9;
        assert_eq!(decompress(&bad_version), Err(PpmError::InvalidHeader));

        let mut bad_order = frame.clone();
        bad_order[5] = 0;
        assert_eq!(decompress(&bad_order), Err(PpmError::InvalidHeader));

        let mut bad_search = frame;
        bad_search[6] = 2;
        assert_eq!(decompress(&bad_search), Err(PpmError::InvalidHeader));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut frame = compress(b"checksum me", &PpmConfig::default()).unwrap();
        frame[15] ^= 0xFF;
        assert!(matches!(
            decompress(&frame),
            Err(PpmError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_length_field_too_small() {
        let mut frame = compress(b"twelve bytes", &PpmConfig::default()).unwrap();
        frame[7..15].copy_from_slice(&3u64.to_le_bytes());
        assert_eq!(decompress(&frame), Err(PpmError::CorruptStream));
    }

    #[test]
    fn test_length_field_too_large() {
        let mut frame = compress(b"twelve bytes", &PpmConfig::default()).unwrap();
        frame[7..15].copy_from_slice(&100u64.to_le_bytes());
        assert_eq!(
            decompress(&frame),
            Err(PpmError::LengthMismatch {
                expected: 100,
                actual: 12
            })
        );
    }

    #[test]
    fn test_driver_round_trip_without_frame() {
        let data = b"abcabcabcabd";
        let mut model = PpmModel::new(2).unwrap();
        let mut encoder = RangeEncoder::new();
        encode(&mut model, data, &mut encoder).unwrap();
        let bytes = encoder.finish();

        let mut model = PpmModel::new(2).unwrap();
        let mut decoder = RangeDecoder::new(&bytes);
        assert_eq!(decode(&mut model, &mut decoder, data.len()).unwrap(), data);
        assert!(!decoder.overran());
    }
}
