//! LZO1X binding used by the chunk codec (§4.1).
//!
//! A single buffer is always ≤ [`crate::format::CHUNK_SIZE`] bytes. `minilzo_rs::LZO`
//! is not guaranteed reentrant, so each call constructs its own instance rather
//! than sharing one across the extraction worker pool's threads.

use crate::error::{PakError, Result};

/// Compress `src` (at most `CHUNK_SIZE` bytes). The output may legally be
/// larger than `src`; callers must compare lengths themselves (§4.2 step 2).
pub fn compress(src: &[u8]) -> Result<Vec<u8>> {
    let lzo = minilzo_rs::LZO::init().map_err(|e| PakError::Lzo(e.to_string()))?;
    lzo.compress(src).map_err(|e| PakError::Lzo(e.to_string()))
}

/// Decompress `src` to exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let lzo = minilzo_rs::LZO::init().map_err(|e| PakError::Lzo(e.to_string()))?;
    lzo.decompress(src, expected_len)
        .map_err(|e| PakError::Lzo(e.to_string()))
}
