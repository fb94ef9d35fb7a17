//! Index navigation with wraparound
//!
//! `next` and `previous` turn a relative move into lookups against a
//! [`RecordSource`]. Moving past the final element wraps to 0; moving
//! before 0 resolves `Last`. The caller's index is only written once a
//! lookup has succeeded, so a failed move leaves it exactly as it was.

use crate::error::StoreError;
use crate::record::{ConfigIndex, KnobConfig, Located};

/// Something that can resolve an index request to a record
pub trait RecordSource {
    /// Look up the element for `request`, returning its concrete index
    fn locate(&mut self, request: ConfigIndex) -> Result<Located, StoreError>;
}

/// Move to the element after `*current`, wrapping to 0 past the end
pub fn next<R: RecordSource>(source: &mut R, current: &mut usize) -> Result<KnobConfig, StoreError> {
    let forward = match current.checked_add(1) {
        Some(i) => source.locate(ConfigIndex::Concrete(i)),
        None => Err(StoreError::NotFound),
    };

    let located = match forward {
        Ok(located) => located,
        Err(_) => {
            let first = source.locate(ConfigIndex::Concrete(0))?;
            debug!("Wrapped from index {} to first", *current);
            first
        }
    };

    *current = located.index;
    Ok(located.config)
}

/// Move to the element before `*current`, wrapping to the last from 0
pub fn previous<R: RecordSource>(
    source: &mut R,
    current: &mut usize,
) -> Result<KnobConfig, StoreError> {
    let located = if *current > 0 {
        source.locate(ConfigIndex::Concrete(*current - 1))?
    } else {
        let last = source.locate(ConfigIndex::Last)?;
        debug!("Wrapped from first to index {}", last.index);
        last
    };

    *current = located.index;
    Ok(located.config)
}
