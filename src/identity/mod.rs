//! Component identities.
//!
//! An `Identity` is a stable handle for one logical component across
//! versions. Its `current` value is the latest implementation; the caller's
//! version-tracking layer owns it and reassigns it on every new version.
//! Implementations point back to their identity weakly (`IdentityRef`), so an
//! implementation never keeps its own identity alive.
//!
//! # Modules
//!
//! - `resolve` - same-component check, unwrapping, latest resolution
//! - `registry` - string-keyed identity families with hook signatures

mod registry;
mod resolve;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::element::{ComponentType, SharedStr};

pub use registry::Registry;
pub use resolve::{is_same_component, resolve_function, resolve_latest, unwrap_to_hot_reloadable};

struct IdentityCell {
    name: SharedStr,
    current: RefCell<ComponentType>,
    version: Cell<u32>,
}

/// Strong handle to an identity cell.
#[derive(Clone)]
pub struct Identity(Rc<IdentityCell>);

/// Weak back-reference from an implementation to its identity.
#[derive(Clone)]
pub struct IdentityRef(Weak<IdentityCell>);

/// Address of an identity cell, used for set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey(usize);

impl Identity {
    /// Create an identity whose current value is `initial`, binding it to
    /// `initial` and all of its carriers.
    pub fn new(name: &str, initial: ComponentType) -> Self {
        let identity = Self(Rc::new(IdentityCell {
            name: name.into(),
            current: RefCell::new(initial.clone()),
            version: Cell::new(0),
        }));
        initial.bind_identity(&identity.downgrade());
        identity
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Latest assigned implementation.
    pub fn current(&self) -> ComponentType {
        self.0.current.borrow().clone()
    }

    /// Number of reassignments since creation.
    pub fn version(&self) -> u32 {
        self.0.version.get()
    }

    /// Reassign the current implementation.
    pub fn update(&self, next: ComponentType) {
        next.bind_identity(&self.downgrade());
        *self.0.current.borrow_mut() = next;
        self.0.version.set(self.0.version.get() + 1);
    }

    pub fn downgrade(&self) -> IdentityRef {
        IdentityRef(Rc::downgrade(&self.0))
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey(Rc::as_ptr(&self.0) as usize)
    }

    pub fn ptr_eq(&self, other: &Identity) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl IdentityRef {
    pub fn upgrade(&self) -> Option<Identity> {
        self.0.upgrade().map(Identity)
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey(self.0.as_ptr() as usize)
    }

    pub fn ptr_eq(&self, other: &IdentityRef) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }

    pub fn refers_to(&self, identity: &Identity) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&identity.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}@v{})", self.name(), self.version())
    }
}

impl fmt::Debug for IdentityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(identity) => write!(f, "IdentityRef({})", identity.name()),
            None => f.write_str("IdentityRef(<dropped>)"),
        }
    }
}

// =============================================================================
// IdentitySet
// =============================================================================

/// Set of identities compared by reference. Members are held strongly so
/// their keys stay unique while the set exists.
#[derive(Clone, Default)]
pub struct IdentitySet {
    members: FxHashMap<IdentityKey, Identity>,
}

impl IdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: &Identity) -> bool {
        self.members
            .insert(identity.key(), identity.clone())
            .is_none()
    }

    pub fn remove(&mut self, identity: &Identity) -> bool {
        self.members.remove(&identity.key()).is_some()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains_key(&identity.key())
    }

    /// Membership test for a weak back-reference.
    pub fn contains_ref(&self, identity: &IdentityRef) -> bool {
        self.members.contains_key(&identity.key())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.members.values()
    }
}

impl FromIterator<Identity> for IdentitySet {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Identity> for IdentitySet {
    fn extend<I: IntoIterator<Item = Identity>>(&mut self, iter: I) {
        for identity in iter {
            self.insert(&identity);
        }
    }
}

impl fmt::Debug for IdentitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Node;

    fn app(name: &str) -> ComponentType {
        ComponentType::function(name, |_, _| Ok(Node::Empty))
    }

    #[test]
    fn test_update_returns_latest_assignment() {
        let v1 = app("AppV1");
        let v2 = app("AppV2");
        let identity = Identity::new("App", v1.clone());
        assert!(identity.current().same_type(&v1));
        assert_eq!(identity.version(), 0);

        identity.update(v2.clone());
        assert!(identity.current().same_type(&v2));
        assert_eq!(identity.version(), 1);
        assert!(v2.identity().is_some_and(|r| r.refers_to(&identity)));
    }

    #[test]
    fn test_weak_ref_does_not_keep_identity_alive() {
        let v1 = app("AppV1");
        let identity = Identity::new("App", v1.clone());
        let weak = identity.downgrade();
        assert!(weak.upgrade().is_some());
        drop(identity);
        assert!(weak.upgrade().is_none());
        // The implementation itself is still usable.
        assert!(v1.identity().is_some());
    }

    #[test]
    fn test_identity_set_membership_by_reference() {
        let a = Identity::new("A", app("A"));
        let b = Identity::new("B", app("B"));
        let set: IdentitySet = [a.clone()].into_iter().collect();
        assert!(set.contains(&a));
        assert!(set.contains_ref(&a.downgrade()));
        assert!(!set.contains(&b));
        assert_eq!(set.len(), 1);
    }
}
