//! Independent-block compression on the rayon pool.
//!
//! Each block gets its own model and frame, so blocks share no state and
//! compress or decompress concurrently. Larger blocks compress better;
//! smaller blocks parallelize better.
//!
//! Output is a sequence of `u32` little-endian frame lengths, each followed
//! by a frame from [`compress`].

use rayon::prelude::*;

use crate::codec::{compress, decompress};
use crate::error::{PpmError, Result};
use crate::ppm::PpmConfig;

/// Split `data` into `block_size` chunks and compress them in parallel.
///
/// A `block_size` of 0 compresses `data` as a single block.
pub fn compress_blocks(data: &[u8], block_size: usize, config: &PpmConfig) -> Result<Vec<u8>> {
    config.validate()?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let block_size = if block_size == 0 { data.len() } else { block_size };

    let frames = data
        .par_chunks(block_size)
        .map(|block| compress(block, config))
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::with_capacity(frames.iter().map(|f| f.len() + 4).sum());
    for frame in &frames {
        let len = u32::try_from(frame.len()).map_err(|_| PpmError::InvalidHeader)?;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(frame);
    }
    log::debug!(
        "compressed {} bytes as {} blocks -> {} bytes",
        data.len(),
        frames.len(),
        out.len()
    );
    Ok(out)
}

/// Inverse of [`compress_blocks`].
pub fn decompress_blocks(data: &[u8]) -> Result<Vec<u8>> {
    let mut frames = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        if rest.len() < 4 {
            return Err(PpmError::InvalidHeader);
        }
        let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        rest = &rest[4..];
        if rest.len() < len {
            return Err(PpmError::InvalidHeader);
        }
        let (frame, tail) = rest.split_at(len);
        frames.push(frame);
        rest = tail;
    }

    let blocks = frames
        .par_iter()
        .map(|frame| decompress(frame))
        .collect::<Result<Vec<_>>>()?;
    Ok(blocks.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_round_trip() {
        let data: Vec<u8> = b"parallel blocks share nothing. "
            .iter()
            .copied()
            .cycle()
            .take(10_000)
            .collect();
        for block_size in [0, 1, 777, 4096, 20_000] {
            let packed = compress_blocks(&data, block_size, &PpmConfig::default()).unwrap();
            assert_eq!(decompress_blocks(&packed).unwrap(), data);
        }
    }

    #[test]
    fn test_empty_input() {
        let packed = compress_blocks(b"", 16, &PpmConfig::default()).unwrap();
        assert!(packed.is_empty());
        assert!(decompress_blocks(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_block_stream() {
        let packed = compress_blocks(b"some data to split", 4, &PpmConfig::default()).unwrap();
        assert_eq!(
            decompress_blocks(&packed[..packed.len() - 1]),
            Err(PpmError::InvalidHeader)
        );
        assert_eq!(decompress_blocks(&packed[..2]), Err(PpmError::InvalidHeader));
    }
}
