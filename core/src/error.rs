use std::path::PathBuf;
use thiserror::Error;

/// Result type for pulmoscan operations
pub type Result<T> = std::result::Result<T, PulmoError>;

/// Error types for pulmoscan operations
#[derive(Error, Debug)]
pub enum PulmoError {
    /// A metadata CSV is missing or unreadable (fatal at startup)
    #[error("Metadata file missing: {0}")]
    MissingMetadata(PathBuf),

    /// The CT volume for the selected patient is missing (fatal for that patient)
    #[error("CT scan file not found for patient '{0}'")]
    MissingCtVolume(String),

    /// Malformed metadata row or table
    #[error("Metadata error: {0}")]
    MetadataError(String),

    /// Volume file could not be decoded
    #[error("Volume error: {0}")]
    VolumeError(String),

    /// Slice index outside the volume depth
    #[error("Slice index {index} out of bounds for depth {depth}")]
    SliceOutOfBounds { index: usize, depth: usize },

    /// Image encoding error (PNG export)
    #[error("Image error: {0}")]
    ImageError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for PulmoError {
    fn from(s: String) -> Self {
        PulmoError::MetadataError(s)
    }
}

impl From<&str> for PulmoError {
    fn from(s: &str) -> Self {
        PulmoError::MetadataError(s.to_string())
    }
}

// Convert csv errors
impl From<csv::Error> for PulmoError {
    fn from(e: csv::Error) -> Self {
        PulmoError::MetadataError(format!("{}", e))
    }
}

// Convert npy read errors
impl From<ndarray_npy::ReadNpyError> for PulmoError {
    fn from(e: ndarray_npy::ReadNpyError) -> Self {
        PulmoError::VolumeError(format!("{}", e))
    }
}

// Convert image errors
impl From<image::ImageError> for PulmoError {
    fn from(e: image::ImageError) -> Self {
        PulmoError::ImageError(format!("{}", e))
    }
}
