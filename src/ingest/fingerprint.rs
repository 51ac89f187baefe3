use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;

use crate::ingest::hasher;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Outcome of a per-file measurement that is allowed to fail.
///
/// A `Degraded` probe carries no detail: the scan substitutes a fallback and
/// keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe<T> {
    Measured(T),
    Degraded,
}

impl<T> Probe<T> {
    pub fn or(self, fallback: T) -> T {
        match self {
            Probe::Measured(value) => value,
            Probe::Degraded => fallback,
        }
    }

    pub fn measured(self) -> Option<T> {
        match self {
            Probe::Measured(value) => Some(value),
            Probe::Degraded => None,
        }
    }
}

/// Content identity and pixel size of a file.
pub trait Fingerprinter {
    fn hash(&self, path: &Path) -> Result<String, FingerprintError>;

    /// Displayed `(width, height)`, after the embedded orientation is applied.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), FingerprintError>;
}

/// Reads real files: SHA-256 for the hash, the image header plus EXIF
/// orientation for the dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFingerprinter;

impl Fingerprinter for FileFingerprinter {
    fn hash(&self, path: &Path) -> Result<String, FingerprintError> {
        Ok(hasher::calculate_hash(path)?)
    }

    fn dimensions(&self, path: &Path) -> Result<(u32, u32), FingerprintError> {
        let (width, height) = image::image_dimensions(path)?;
        if swaps_axes(read_orientation(path)) {
            Ok((height, width))
        } else {
            Ok((width, height))
        }
    }
}

/// EXIF orientation 1..=8, defaulting to 1 when absent or unreadable.
fn read_orientation(path: &Path) -> u32 {
    let Ok(file) = File::open(path) else {
        return 1;
    };
    let mut reader = BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .filter(|v| (1..=8).contains(v))
            .unwrap_or(1),
        Err(_) => 1,
    }
}

/// Orientations 5-8 rotate by 90 or 270 degrees.
fn swaps_axes(orientation: u32) -> bool {
    matches!(orientation, 5..=8)
}
