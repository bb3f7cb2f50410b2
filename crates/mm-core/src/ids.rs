use core::fmt;
use core::num::NonZeroU32;

/// Handle of an entity inside a network arena.
///
/// Stored as `index + 1` in a `NonZeroU32`, so `Option<EntityId>` costs
/// nothing extra and slots keyed by it stay small.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// `None` for `u32::MAX`, the one index with no handle.
    pub fn from_index(index: u32) -> Option<Self> {
        index.checked_add(1).and_then(NonZeroU32::new).map(Self)
    }

    /// Handle for the arena slot at `position`, if it fits.
    pub fn from_position(position: usize) -> Option<Self> {
        u32::try_from(position).ok().and_then(Self::from_index)
    }

    /// 0-based arena position.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub fn position(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.index())
    }
}

/// `#<index>`, as used in slot names like `#4.density`.
impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}
