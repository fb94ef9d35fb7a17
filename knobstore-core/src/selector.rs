//! Profile selection
//!
//! [`ProfileSelector`] is the interface side of the store: it remembers
//! which profile is active, moves through the sequence on button presses,
//! and hands each newly selected profile to a [`ConfigSink`] (usually the
//! signal the motor task waits on). The sink is fed after the store call
//! has returned, never while the store lock is held.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use knobstore_hal::FileSystem;

use crate::error::StoreError;
use crate::record::{ConfigIndex, KnobConfig, Located};
use crate::store::KnobConfigStore;

/// Receiver of newly selected profiles
pub trait ConfigSink {
    fn apply(&mut self, config: KnobConfig);
}

impl<M: RawMutex> ConfigSink for &Signal<M, KnobConfig> {
    fn apply(&mut self, config: KnobConfig) {
        self.signal(config);
    }
}

/// Direction of a single navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Next,
    Previous,
}

/// Tracks the active profile and pushes selections to a sink
pub struct ProfileSelector<'a, M: RawMutex, S: FileSystem, K: ConfigSink> {
    store: &'a KnobConfigStore<M, S>,
    sink: K,
    current: usize,
}

impl<'a, M: RawMutex, S: FileSystem, K: ConfigSink> ProfileSelector<'a, M, S, K> {
    /// Create a selector positioned on the first profile
    ///
    /// Nothing is applied until [`Self::load_initial`] or a step.
    pub fn new(store: &'a KnobConfigStore<M, S>, sink: K) -> Self {
        Self {
            store,
            sink,
            current: 0,
        }
    }

    /// Index of the active profile
    pub fn current(&self) -> usize {
        self.current
    }

    /// Apply the first profile at startup
    pub fn load_initial(&mut self) -> Result<(), StoreError> {
        self.jump_to_first()?;
        info!("Loaded initial knob profile");
        Ok(())
    }

    /// Move one profile forward or back, wrapping at either end
    pub fn step(&mut self, step: Step) -> Result<(), StoreError> {
        let config = match step {
            Step::Next => self.store.next(&mut self.current)?,
            Step::Previous => self.store.previous(&mut self.current)?,
        };
        debug!("Stepped {:?} to profile {}", step, self.current);
        self.sink.apply(config);
        Ok(())
    }

    /// Apply the last profile, or the first if the last cannot be read
    pub fn jump_to_last(&mut self) -> Result<(), StoreError> {
        match self.store.locate(ConfigIndex::Last) {
            Ok(located) => {
                self.select(located);
                Ok(())
            }
            Err(e) => {
                warn!("Last profile unavailable ({:?}), using first", e);
                self.jump_to_first()
            }
        }
    }

    /// Apply the first profile
    pub fn jump_to_first(&mut self) -> Result<(), StoreError> {
        let located = self.store.locate(ConfigIndex::Concrete(0))?;
        self.select(located);
        Ok(())
    }

    fn select(&mut self, located: Located) {
        self.current = located.index;
        self.sink.apply(located.config);
    }

    /// Take the sink back
    pub fn into_sink(self) -> K {
        self.sink
    }
}
