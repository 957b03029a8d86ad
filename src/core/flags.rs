//! Flag sets carried by fibers.
//!
//! `EffectFlags` describe what the commit phase has to do for a fiber.
//! `WorkFlags` describe pending render work and survive across buffers:
//! scheduling marks a fiber and its alternate, and a new work-in-progress
//! copies the flags of the current fiber.

use bitflags::bitflags;

bitflags! {
    /// Side effects produced by the render phase, consumed by commit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EffectFlags: u16 {
        /// Newly created fiber, its host nodes are not attached yet.
        const PLACEMENT = 1 << 0;
        /// Host props or text changed.
        const UPDATE = 1 << 1;
        /// Host child list of this host fiber must be resynced.
        const CHILDREN_CHANGED = 1 << 2;
        /// Node ref must be attached.
        const REF = 1 << 3;
        /// Has layout effects to run during commit.
        const LAYOUT = 1 << 4;
        /// Has passive effects to run after commit.
        const PASSIVE = 1 << 5;
        /// Error boundary caught an error during this render.
        const DID_CAPTURE = 1 << 6;
    }
}

bitflags! {
    /// Pending render work.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WorkFlags: u8 {
        /// The fiber itself has a pending update.
        const UPDATE = 1 << 0;
        /// Some descendant has pending work.
        const CHILD_UPDATE = 1 << 1;
        /// Re-evaluate even when props are unchanged.
        const FORCE = 1 << 2;
        /// Type treated as deleted: never reused for an incoming element.
        const REMOUNT = 1 << 3;

        /// Work that prevents this fiber from bailing out.
        const PENDING = Self::UPDATE.bits() | Self::FORCE.bits();
        /// Work that keeps this fiber on the render path.
        const ANY = Self::PENDING.bits() | Self::CHILD_UPDATE.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_covers_update_and_force() {
        assert!(WorkFlags::UPDATE.intersects(WorkFlags::PENDING));
        assert!(WorkFlags::FORCE.intersects(WorkFlags::PENDING));
        assert!(!WorkFlags::CHILD_UPDATE.intersects(WorkFlags::PENDING));
        assert!(!WorkFlags::REMOUNT.intersects(WorkFlags::ANY));
    }
}
