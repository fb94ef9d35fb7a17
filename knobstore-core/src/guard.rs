//! Store-wide lock
//!
//! Every store operation runs inside [`StoreGuard::with`], so all file
//! access is totally ordered. The lock is scoped to the closure and is
//! released on every exit path.
//!
//! The lock is held for a whole operation, including the flash reads of a
//! file scan, so the raw mutex is chosen by the board crate to suit how long
//! that may take:
//! - `ThreadModeRawMutex` when every caller is a thread-mode task on one
//!   executor
//! - a [`RawMutex`] backed by the RTOS mutex when the motor and interface
//!   tasks run on separate RTOS threads
//! - `CriticalSectionRawMutex` on the host (one process-wide lock), or on a
//!   device only when the files are small. On a microcontroller it masks
//!   interrupts for as long as the scan runs.
//! - `NoopRawMutex` when every caller lives in one thread

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Exclusive access to a value for the duration of a closure
pub struct StoreGuard<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T> StoreGuard<M, T> {
    /// Wrap a value; usable in a `static`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access to the value
    ///
    /// Blocks until the lock is free.
    ///
    /// # Panics
    ///
    /// The lock is not reentrant. Calling `with` again from inside `f`
    /// panics.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }

    /// Take the value back
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}
