//! LZMA glue: each block's residual bytes become one complete,
//! independent xz stream.

use std::io::{Read, Write};

use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::error::{Error, Result};

/// liblzma preset: level 9 with the EXTREME flag, i.e. `xz -9e`.
const PRESET: u32 = 9 | (1 << 31);

/// Compress one block's residual buffer.
///
/// An empty buffer compresses to zero bytes: an empty xz stream would
/// still cost ~32 bytes of framing, so the container stores nothing and
/// the reader treats a zero compressed length as an empty stream.
pub fn compress_block(raw: &[u8]) -> Result<Vec<u8>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let mut encoder = XzEncoder::new(Vec::new(), PRESET);
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Decompress one block. Inverse of [`compress_block`].
pub fn decompress_block(compressed: &[u8]) -> Result<Vec<u8>> {
    if compressed.is_empty() {
        return Ok(Vec::new());
    }
    let mut raw = Vec::new();
    XzDecoder::new(compressed)
        .read_to_end(&mut raw)
        .map_err(|e| Error::Malformed(format!("invalid LZMA block: {e}")))?;
    Ok(raw)
}
