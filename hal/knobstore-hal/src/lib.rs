//! knobstore Hardware Abstraction Layer
//!
//! This crate defines the flat file storage interface the configuration
//! store runs on. A board crate implements [`FileSystem`] over whatever the
//! flash file system of the target is (SPIFFS, LittleFS, a raw partition),
//! and the store only ever talks to these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  knobstore-core (store, scanner, ...)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  knobstore-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ RamFileSystem │       │ DirFileSystem │
//! │  (heapless)   │       │    (std)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Contents
//!
//! - [`file::FileSystem`], [`file::File`] - Open/read/write/close of flat files
//! - [`stream::ByteStream`] - Buffered forward-only scanning over a file
//! - [`ram::RamFileSystem`] - In-memory file system with fixed capacity
//! - `dir::DirFileSystem` - Directory-backed file system (feature `std`)

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod file;
pub mod ram;
pub mod stream;

#[cfg(feature = "std")]
pub mod dir;

// Re-export key types at crate root for convenience
pub use file::{File, FileError, FileSystem, OpenMode, MAX_NAME_LEN};
pub use ram::{RamFile, RamFileSystem};
pub use stream::ByteStream;

#[cfg(feature = "std")]
pub use dir::{DirFile, DirFileSystem};
