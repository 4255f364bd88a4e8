//! Bookkeeping of which sub-blocks of a metadata object have been parsed.

use crate::MetaError;

/// Fixed set of `N` named slots, each marked once its sub-block is parsed.
///
/// Marking is idempotent and never fails. The object owning the tracker is
/// ready only when every slot has been marked at least once.
#[derive(Debug, Clone, Copy)]
pub struct Completeness<const N: usize> {
    object: &'static str,
    labels: [&'static str; N],
    marked: u64,
}

impl<const N: usize> Completeness<N> {
    const FITS: () = assert!(N <= 64, "at most 64 slots are supported");

    /// Tracker for `object` whose slots are named by `labels`.
    pub const fn new(object: &'static str, labels: [&'static str; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        Completeness {
            object,
            labels,
            marked: 0,
        }
    }

    /// Record that slot `slot` has been parsed. Out of range slots are ignored.
    pub fn mark(&mut self, slot: usize) {
        if slot < N {
            self.marked |= 1 << slot;
        }
    }

    pub fn is_marked(&self, slot: usize) -> bool {
        slot < N && self.marked & (1 << slot) != 0
    }

    pub fn is_ready(&self) -> bool {
        (0..N).all(|slot| self.is_marked(slot))
    }

    /// Names of the slots that have not been marked yet.
    pub fn missing(&self) -> Vec<&'static str> {
        (0..N)
            .filter(|&slot| !self.is_marked(slot))
            .map(|slot| self.labels[slot])
            .collect()
    }

    /// Fail with [`MetaError::Incomplete`] unless every slot is marked.
    pub fn ensure_ready(&self) -> Result<(), MetaError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(MetaError::Incomplete {
                object: self.object,
                missing: self.missing(),
            })
        }
    }
}
