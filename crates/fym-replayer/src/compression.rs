//! Compression support for FYM files
//!
//! FYM files are usually a single zlib stream around the raw register dump.
//! [`decompress_if_needed`] detects the zlib header and inflates it with
//! `flate2`; anything else is returned unchanged, so raw dumps load too.

use crate::{ReplayerError, Result};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// zlib CMF byte for deflate with a 32K window
const ZLIB_CMF_DEFLATE_32K: u8 = 0x78;

/// Maximum decompressed size: 64MB
///
/// A ten-minute dump at 50 Hz is about 420KB, so anything near this limit is
/// corrupt or hostile.
const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

/// Whether `data` starts with a zlib header
///
/// Checks the CMF byte and the FCHECK bits of the FLG byte (CMF * 256 + FLG
/// must be a multiple of 31).
pub fn is_zlib_compressed(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => {
            *cmf == ZLIB_CMF_DEFLATE_32K && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0
        }
        _ => false,
    }
}

/// Inflate zlib data if compressed, otherwise return a copy as-is
///
/// # Examples
/// ```no_run
/// use fym_replayer::decompress_if_needed;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("song.fym")?;
/// let dump = decompress_if_needed(&data)?;
/// # Ok(())
/// # }
/// ```
pub fn decompress_if_needed(data: &[u8]) -> Result<Vec<u8>> {
    if !is_zlib_compressed(data) {
        return Ok(data.to_vec());
    }

    let mut decompressed = Vec::new();
    // One byte over the limit tells truncation apart from an exact fit
    ZlibDecoder::new(data)
        .take(MAX_DECOMPRESSED_SIZE as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| ReplayerError::DecompressionError(format!("zlib inflate failed: {e}")))?;

    if decompressed.len() > MAX_DECOMPRESSED_SIZE {
        return Err(ReplayerError::DecompressionError(format!(
            "decompressed data exceeds {} bytes",
            MAX_DECOMPRESSED_SIZE
        )));
    }

    tracing::debug!(
        compressed = data.len(),
        decompressed = decompressed.len(),
        "inflated zlib stream"
    );
    Ok(decompressed)
}
