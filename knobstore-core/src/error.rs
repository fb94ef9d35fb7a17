//! Store errors

use knobstore_hal::FileError;

/// Errors reported by store operations
///
/// Every failure leaves the caller's state untouched; nothing here is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// File absent, or no record at the requested index
    NotFound,
    /// Malformed JSON, or a record larger than its buffer
    ParseError,
    /// Record cannot be stored as given
    InvalidArgument,
    /// Motor record present but not flagged as calibrated
    NotCalibrated,
    /// Operation is reserved but not implemented
    Unsupported,
    /// File system failure other than a missing file
    Storage(FileError),
}

impl From<FileError> for StoreError {
    fn from(e: FileError) -> Self {
        match e {
            FileError::NotFound => StoreError::NotFound,
            other => StoreError::Storage(other),
        }
    }
}
