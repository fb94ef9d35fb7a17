//! Knob and motor configuration store
//!
//! The facade the rest of the firmware talks to. It owns the file system
//! behind a [`StoreGuard`], so every lookup, navigation step and motor
//! read or write holds the one lock for its whole duration. Nothing is
//! cached: each call reads the files fresh.
//!
//! Build one store at startup and share it by reference (a `static` or an
//! `Arc`). Collaborators never construct their own.

use embassy_sync::blocking_mutex::raw::RawMutex;
use knobstore_hal::{File, FileSystem, OpenMode};

use crate::codec;
use crate::config::{StoreConfig, MOTOR_BUFFER_SIZE};
use crate::error::StoreError;
use crate::guard::StoreGuard;
use crate::navigate;
use crate::record::{ConfigIndex, KnobConfig, Located, MotorConfig};
use crate::scan::{self, KnobFile};

/// Read a whole file into `buf`
///
/// A file larger than `buf` is a [`StoreError::ParseError`].
fn read_bounded<F: File>(file: &mut F, buf: &mut [u8]) -> Result<usize, StoreError> {
    let mut len = 0;
    while len < buf.len() {
        let n = file.read(&mut buf[len..])?;
        if n == 0 {
            return Ok(len);
        }
        len += n;
    }

    let mut extra = [0u8; 1];
    if file.read(&mut extra)? > 0 {
        return Err(StoreError::ParseError);
    }
    Ok(len)
}

/// Persisted knob profiles and motor calibration
pub struct KnobConfigStore<M: RawMutex, S: FileSystem> {
    guard: StoreGuard<M, S>,
    config: StoreConfig,
}

impl<M: RawMutex, S: FileSystem> KnobConfigStore<M, S> {
    /// Create a store over `storage`
    pub const fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            guard: StoreGuard::new(storage),
            config,
        }
    }

    /// File locations in use
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Fetch the profile at `index`
    pub fn get(&self, index: ConfigIndex) -> Result<KnobConfig, StoreError> {
        self.locate(index).map(|located| located.config)
    }

    /// Fetch the profile at `index` along with its concrete position
    ///
    /// This is how a `Last` request learns which index it resolved to.
    pub fn locate(&self, index: ConfigIndex) -> Result<Located, StoreError> {
        self.guard
            .with(|storage| scan::scan_path(storage, self.config.knob_path, index))
    }

    /// Advance `current` to the next profile, wrapping to the first
    ///
    /// `current` is left untouched on failure.
    pub fn next(&self, current: &mut usize) -> Result<KnobConfig, StoreError> {
        self.guard.with(|storage| {
            let mut source = KnobFile::new(storage, self.config.knob_path);
            navigate::next(&mut source, current)
        })
    }

    /// Step `current` back one profile, wrapping to the last
    ///
    /// `current` is left untouched on failure.
    pub fn previous(&self, current: &mut usize) -> Result<KnobConfig, StoreError> {
        self.guard.with(|storage| {
            let mut source = KnobFile::new(storage, self.config.knob_path);
            navigate::previous(&mut source, current)
        })
    }

    /// Add a profile to the end of the sequence (not supported)
    pub fn append(&self, _config: &KnobConfig) -> Result<(), StoreError> {
        warn!("Appending knob profiles is not supported");
        Err(StoreError::Unsupported)
    }

    /// Remove the profile at `index` (not supported)
    pub fn delete(&self, index: usize) -> Result<(), StoreError> {
        warn!("Deleting knob profile {} is not supported", index);
        Err(StoreError::Unsupported)
    }

    /// Read the motor calibration
    ///
    /// Fails with [`StoreError::NotCalibrated`] if the record parses but is
    /// not flagged as calibrated.
    pub fn get_motor(&self) -> Result<MotorConfig, StoreError> {
        let path = self.config.motor_path;
        self.guard.with(|storage| {
            let mut file = storage.open(path, OpenMode::Read).map_err(|e| {
                warn!("Cannot open {}: {:?}", path, e);
                StoreError::from(e)
            })?;

            let mut buf = [0u8; MOTOR_BUFFER_SIZE];
            let len = read_bounded(&mut file, &mut buf)?;
            let motor = codec::decode_motor(&buf[..len]).map_err(|e| {
                warn!("Motor record in {} malformed", path);
                e
            })?;

            if !motor.is_calibrated() {
                warn!("Motor record in {} not calibrated", path);
                return Err(StoreError::NotCalibrated);
            }
            Ok(motor)
        })
    }

    /// Replace the motor calibration file
    ///
    /// The file is rewritten as a whole; a failure part way through can
    /// leave it truncated.
    pub fn set_motor(&self, motor: &MotorConfig) -> Result<(), StoreError> {
        let json = codec::encode_motor(motor)?;
        let path = self.config.motor_path;
        self.guard.with(|storage| {
            let mut file = storage.open(path, OpenMode::Write).map_err(|e| {
                warn!("Cannot open {} for writing: {:?}", path, e);
                StoreError::from(e)
            })?;
            file.write_all(&json)?;
            file.close()?;
            info!("Motor calibration written to {}", path);
            Ok(())
        })
    }

    /// Run `f` on the file system while holding the store lock
    ///
    /// For provisioning files. `f` must not call back into the store.
    pub fn with_storage<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.guard.with(f)
    }

    /// Take the file system back
    pub fn into_storage(self) -> S {
        self.guard.into_inner()
    }
}
