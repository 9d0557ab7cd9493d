//! Loading SRTM `.hgt` tiles from disk.

use std::fs;
use std::path::Path;

use crate::{Grid, HgtError, Result, TileKey};

/// Load an SRTM `.hgt` tile.
///
/// The format is a square array of big-endian signed 16-bit samples with no
/// header; the tile it covers is encoded in the filename (`N43E006.hgt` is
/// the cell with southwest corner 43N 6E). SRTM3 tiles are 1201x1201,
/// SRTM1 tiles 3601x3601; any square dimension >= 2 is accepted.
pub fn load_hgt<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HgtError::InvalidFilename(path.display().to_string()))?;
    let key = TileKey::from_filename(filename)
        .ok_or_else(|| HgtError::InvalidFilename(filename.to_string()))?;

    let bytes = fs::read(path)?;
    let samples = decode_samples(key, &bytes)?;
    let dim = (samples.len() as f64).sqrt() as usize;
    Grid::from_samples(key, samples, dim)
}

/// Decode big-endian i16 samples, checking that they form a square array.
fn decode_samples(key: TileKey, bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(HgtError::malformed(key, "odd byte count"));
    }
    let count = bytes.len() / 2;
    let dim = (count as f64).sqrt().round() as usize;
    if dim * dim != count {
        return Err(HgtError::malformed(
            key,
            format!("{count} samples do not form a square grid"),
        ));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_be_bytes([c[0], c[1]]))
        .collect())
}
