use serde::{Deserialize, Serialize};

/// Position of a tech inside the frozen index arena. Cheap to copy and compare.
///
/// Indices are assigned in ascending name order when the index is built, so
/// ordering two `TechIdx` values orders the techs by name. A tech set holds
/// at most [`TechIdx::MAX_TECHS`] techs; the builder rejects anything past
/// that, so every slot handed to [`TechIdx::from_slot`] fits in a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TechIdx(pub u32);

impl TechIdx {
    pub const MAX_TECHS: usize = u32::MAX as usize;

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_slot(slot: usize) -> Self {
        debug_assert!(slot < Self::MAX_TECHS);
        Self(slot as u32)
    }
}
