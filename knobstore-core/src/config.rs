//! Store configuration
//!
//! File locations are chosen at runtime by the board crate; buffer budgets
//! are fixed at compile time so the store's memory use is known up front.

/// Capacity of the single element buffer used while scanning the knob file
///
/// One serialized detent profile is around 260 bytes, so this leaves some
/// headroom. An element larger than this is reported as a parse error.
pub const RECORD_BUFFER_SIZE: usize = 300;

/// Capacity of the buffer holding the whole motor file
pub const MOTOR_BUFFER_SIZE: usize = 300;

/// Read-ahead of the byte stream used by the scanner
pub const STREAM_CHUNK_SIZE: usize = 32;

/// Maximum descriptor length in bytes
pub const DESCRIPTOR_MAX_LEN: usize = 49;

/// Default path of the knob profile file
pub const DEFAULT_KNOB_PATH: &str = "/Knob.jsn";

/// Default path of the motor calibration file
pub const DEFAULT_MOTOR_PATH: &str = "/Motor.jsn";

/// File locations used by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreConfig {
    /// JSON array of detent profiles
    pub knob_path: &'static str,
    /// JSON object with the motor calibration
    pub motor_path: &'static str,
}

impl StoreConfig {
    /// Create a config with explicit file locations
    pub const fn new(knob_path: &'static str, motor_path: &'static str) -> Self {
        Self {
            knob_path,
            motor_path,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_KNOB_PATH, DEFAULT_MOTOR_PATH)
    }
}
