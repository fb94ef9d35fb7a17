//! knobstore core
//!
//! Persisted configuration for a haptic knob: an ordered sequence of detent
//! profiles and a single motor calibration record, both kept as JSON files
//! on a flat flash file system.
//!
//! # Layout
//!
//! - [`record`] - `KnobConfig`, `MotorConfig`, `ConfigIndex`, bounded `Descriptor`
//! - [`codec`] - JSON decode/encode of one record
//! - [`scan`] - Single-pass streaming scan of the knob array
//! - [`navigate`] - Next/previous with wraparound
//! - [`guard`] - The store-wide lock
//! - [`store`] - `KnobConfigStore`, the facade
//! - [`selector`] - Active profile tracking for the interface task
//!
//! # Example
//!
//! ```
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use knobstore_core::{ConfigIndex, KnobConfigStore, StoreConfig};
//! use knobstore_hal::RamFileSystem;
//!
//! let mut fs = RamFileSystem::<2, 512>::new();
//! fs.store("/Knob.jsn", br#"[{"descriptor":"A"},{"descriptor":"B"}]"#).unwrap();
//!
//! let store: KnobConfigStore<NoopRawMutex, _> = KnobConfigStore::new(fs, StoreConfig::default());
//! let mut idx = 0;
//! assert_eq!(store.previous(&mut idx).unwrap().descriptor, "B");
//! assert_eq!(idx, 1);
//! assert_eq!(store.get(ConfigIndex::Last).unwrap().descriptor, "B");
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

// This must go first so the macros are visible to the other modules
mod fmt;

pub mod codec;
pub mod config;
pub mod error;
pub mod guard;
pub mod navigate;
pub mod record;
pub mod scan;
pub mod selector;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use guard::StoreGuard;
pub use navigate::RecordSource;
pub use record::{ConfigIndex, Descriptor, KnobConfig, Located, MotorConfig, SensorDirection};
pub use selector::{ConfigSink, ProfileSelector, Step};
pub use store::KnobConfigStore;
