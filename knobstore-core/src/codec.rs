//! JSON encoding of records
//!
//! Thin wrappers over `serde_json` that map its errors onto [`StoreError`].
//! Decoding works on one complete JSON value held in memory; the scanner is
//! responsible for cutting that value out of the file.

use alloc::vec::Vec;

use crate::error::StoreError;
use crate::record::{KnobConfig, MotorConfig};

/// Records are JSON objects; serde would otherwise fill a struct from an array
fn require_object(json: &[u8]) -> Result<(), StoreError> {
    match json.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Ok(()),
        _ => Err(StoreError::ParseError),
    }
}

/// Decode one detent profile object
pub fn decode_knob(json: &[u8]) -> Result<KnobConfig, StoreError> {
    require_object(json)?;
    serde_json::from_slice(json).map_err(|_| StoreError::ParseError)
}

/// Decode the motor calibration object
pub fn decode_motor(json: &[u8]) -> Result<MotorConfig, StoreError> {
    require_object(json)?;
    serde_json::from_slice(json).map_err(|_| StoreError::ParseError)
}

/// Encode a motor calibration as pretty-printed JSON
///
/// A non-finite electrical angle has no JSON representation and is rejected.
pub fn encode_motor(config: &MotorConfig) -> Result<Vec<u8>, StoreError> {
    if !config.zero_electric_angle.is_finite() {
        return Err(StoreError::InvalidArgument);
    }
    serde_json::to_vec_pretty(config).map_err(|_| StoreError::InvalidArgument)
}
