//! String-keyed identity families.
//!
//! The version-tracking layer registers every new implementation under a
//! stable key (e.g. `"src/App.rs#App"`) together with a hook signature.
//! The first registration of a key creates its identity; later
//! registrations reassign it and record whether the change can keep state
//! (same signature, *updated*) or needs a clean remount (changed
//! signature, *invalidated*).

use rustc_hash::FxHashMap;

use super::{Identity, IdentitySet};
use crate::element::ComponentType;
use crate::refresh::ReloadRequest;

struct Family {
    identity: Identity,
    signature: Option<String>,
}

/// Registry of identity families.
#[derive(Default)]
pub struct Registry {
    families: FxHashMap<String, Family>,
    updated: IdentitySet,
    invalidated: IdentitySet,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ty` as the newest implementation of `key`.
    ///
    /// Returns the family's identity; the same handle is returned for every
    /// registration of one key.
    pub fn register(&mut self, key: &str, ty: ComponentType, signature: Option<&str>) -> Identity {
        let Some(family) = self.families.get_mut(key) else {
            let identity = Identity::new(key, ty);
            self.families.insert(
                key.to_owned(),
                Family {
                    identity: identity.clone(),
                    signature: signature.map(str::to_owned),
                },
            );
            return identity;
        };

        family.identity.update(ty);
        if family.signature.as_deref() == signature {
            if !self.invalidated.contains(&family.identity) {
                self.updated.insert(&family.identity);
            }
        } else {
            family.signature = signature.map(str::to_owned);
            self.updated.remove(&family.identity);
            self.invalidated.insert(&family.identity);
        }
        family.identity.clone()
    }

    pub fn identity(&self, key: &str) -> Option<Identity> {
        self.families.get(key).map(|f| f.identity.clone())
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Whether any registration since the last `take_request` changed a family.
    pub fn has_pending(&self) -> bool {
        !self.updated.is_empty() || !self.invalidated.is_empty()
    }

    /// Drain pending changes into a reload request.
    pub fn take_request(&mut self) -> ReloadRequest {
        ReloadRequest {
            updated: std::mem::take(&mut self.updated),
            invalidated: std::mem::take(&mut self.invalidated),
            ..ReloadRequest::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Node;

    fn version(name: &str) -> ComponentType {
        ComponentType::function(name, |_, _| Ok(Node::Empty))
    }

    #[test]
    fn test_first_registration_creates_family() {
        let mut registry = Registry::new();
        let identity = registry.register("App", version("AppV1"), Some("useState{0}"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.has_pending());
        assert!(registry.identity("App").is_some_and(|i| i.ptr_eq(&identity)));
        assert!(registry.identity("Missing").is_none());
    }

    #[test]
    fn test_same_signature_marks_updated() {
        let mut registry = Registry::new();
        let v2 = version("AppV2");
        let first = registry.register("App", version("AppV1"), Some("useState{0}"));
        let second = registry.register("App", v2.clone(), Some("useState{0}"));
        assert!(first.ptr_eq(&second));
        assert!(second.current().same_type(&v2));

        let request = registry.take_request();
        assert!(request.updated.contains(&first));
        assert!(request.invalidated.is_empty());
        assert!(!registry.has_pending());
    }

    #[test]
    fn test_changed_signature_marks_invalidated() {
        let mut registry = Registry::new();
        let identity = registry.register("App", version("AppV1"), Some("useState{0}"));
        registry.register("App", version("AppV2"), Some("useState{0}"));
        registry.register("App", version("AppV3"), Some("useReducer{0}"));
        // A later compatible edit does not downgrade a pending remount.
        registry.register("App", version("AppV4"), Some("useReducer{0}"));

        let request = registry.take_request();
        assert!(request.invalidated.contains(&identity));
        assert!(!request.updated.contains(&identity));
    }
}
