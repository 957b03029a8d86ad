//! Type identity resolution.
//!
//! Decides whether two component types are the same logical component
//! across versions, and resolves a type to its newest implementation.

use std::rc::Rc;

use super::IdentityRef;
use crate::element::{ComponentType, Context, FunctionDef};

/// Structural equality across version boundaries.
///
/// - different variants are never the same
/// - plain functions are the same iff both carry an identity and the
///   identities are the same cell
/// - classes are never the same (class reload is unsupported)
/// - memo compares its inner types, forward-ref its inner render callables
/// - provider/consumer compare their contexts, falling back to the
///   contexts' identities
/// - host tags are not identity-bearing and never match here
pub fn is_same_component(a: &ComponentType, b: &ComponentType) -> bool {
    use ComponentType::*;

    match (a, b) {
        (Function(a), Function(b)) => same_function(a, b),
        (Class(_), Class(_)) => false,
        (Memo(a), Memo(b)) => is_same_component(a.inner(), b.inner()),
        (ForwardRef(a), ForwardRef(b)) => same_function(a.render(), b.render()),
        (Provider(a), Provider(b)) | (Consumer(a), Consumer(b)) => same_context(a, b),
        _ => false,
    }
}

fn same_function(a: &FunctionDef, b: &FunctionDef) -> bool {
    same_identity(a.identity(), b.identity())
}

fn same_context(a: &Context, b: &Context) -> bool {
    a.ptr_eq(b) || same_identity(a.identity(), b.identity())
}

fn same_identity(a: Option<&IdentityRef>, b: Option<&IdentityRef>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.ptr_eq(b))
}

/// Strip memo and forward-ref carriers down to the innermost callable.
///
/// Returns `None` for host tags, classes (opted out of reloading) and
/// contexts.
pub fn unwrap_to_hot_reloadable(ty: &ComponentType) -> Option<Rc<FunctionDef>> {
    match ty {
        ComponentType::Function(def) => Some(def.clone()),
        ComponentType::Memo(def) => unwrap_to_hot_reloadable(def.inner()),
        ComponentType::ForwardRef(def) => Some(def.render().clone()),
        ComponentType::Host(_)
        | ComponentType::Class(_)
        | ComponentType::Provider(_)
        | ComponentType::Consumer(_) => None,
    }
}

/// Current implementation of the identity `ty` carries, or `ty` itself.
///
/// Every instantiation site resolves through this, so elements created
/// before a reload still render the newest implementation.
pub fn resolve_latest(ty: &ComponentType) -> ComponentType {
    match ty.identity().and_then(IdentityRef::upgrade) {
        Some(identity) => identity.current(),
        None => ty.clone(),
    }
}

/// Newest render callable for a function definition.
///
/// The identity's current value may be a carrier (e.g. a memo wrapping the
/// function); the callable is unwrapped from it. Falls back to `def` when
/// the current value has no callable.
pub fn resolve_function(def: &Rc<FunctionDef>) -> Rc<FunctionDef> {
    let Some(identity) = def.identity().and_then(IdentityRef::upgrade) else {
        return def.clone();
    };
    unwrap_to_hot_reloadable(&identity.current()).unwrap_or_else(|| def.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Component, Node, Props, RenderResult};
    use crate::identity::Identity;

    fn function(name: &str) -> ComponentType {
        ComponentType::function(name, |_, _| Ok(Node::Empty))
    }

    struct Boundary;

    impl Component for Boundary {
        fn render(&self, _props: &Props) -> RenderResult {
            Ok(Node::Empty)
        }
    }

    fn class(name: &str) -> ComponentType {
        ComponentType::class(name, |_| Box::new(Boundary))
    }

    #[test]
    fn test_functions_with_shared_identity_are_same() {
        let v1 = function("AppV1");
        let v2 = function("AppV2");
        let identity = Identity::new("App", v1.clone());
        identity.update(v2.clone());
        assert!(is_same_component(&v1, &v2));
        assert!(is_same_component(&v2, &v1));
    }

    #[test]
    fn test_functions_without_identity_are_not_same() {
        let v1 = function("App");
        assert!(!is_same_component(&v1, &v1.clone()));

        let v2 = function("App");
        let _identity = Identity::new("App", v2.clone());
        assert!(!is_same_component(&v1, &v2));
    }

    #[test]
    fn test_unrelated_identities_are_not_same() {
        let a = function("App");
        let b = function("App");
        let _ia = Identity::new("App", a.clone());
        let _ib = Identity::new("App", b.clone());
        assert!(!is_same_component(&a, &b));
    }

    #[test]
    fn test_classes_are_never_same() {
        let a = class("Boundary");
        let b = class("Boundary");
        let identity = Identity::new("Boundary", a.clone());
        identity.update(b.clone());
        assert!(!is_same_component(&a, &b));
        assert!(!is_same_component(&a, &a));
    }

    #[test]
    fn test_variant_mismatch_is_not_same() {
        let f = function("App");
        let memo = ComponentType::memo(f.clone());
        let _identity = Identity::new("App", memo.clone());
        assert!(!is_same_component(&f, &memo));
        assert!(!is_same_component(&ComponentType::host("div"), &ComponentType::host("div")));
    }

    #[test]
    fn test_memo_recurses_into_inner() {
        let inner1 = function("Inner");
        let inner2 = function("Inner");
        let m1 = ComponentType::memo(inner1);
        let m2 = ComponentType::memo(inner2);
        let identity = Identity::new("Inner", m1.clone());
        identity.update(m2.clone());
        assert!(is_same_component(&m1, &m2));

        let unrelated = ComponentType::memo(function("Inner"));
        assert!(!is_same_component(&m1, &unrelated));
    }

    #[test]
    fn test_forward_ref_compares_render_callables() {
        let f1 = ComponentType::forward_ref("Input", |_, _| Ok(Node::Empty));
        let f2 = ComponentType::forward_ref("Input", |_, _| Ok(Node::Empty));
        assert!(!is_same_component(&f1, &f2));
        let identity = Identity::new("Input", f1.clone());
        identity.update(f2.clone());
        assert!(is_same_component(&f1, &f2));
    }

    #[test]
    fn test_contexts_compare_by_object_then_identity() {
        let ctx = Context::new("Theme", "light");
        assert!(is_same_component(&ctx.provider(), &ctx.provider()));
        assert!(is_same_component(&ctx.consumer(), &ctx.consumer()));
        assert!(!is_same_component(&ctx.provider(), &ctx.consumer()));

        let other = Context::new("Theme", "light");
        assert!(!is_same_component(&ctx.provider(), &other.provider()));

        let identity = Identity::new("Theme", ctx.provider());
        identity.update(other.provider());
        assert!(is_same_component(&ctx.provider(), &other.provider()));
    }

    #[test]
    fn test_unwrap_strips_carriers() {
        let f = function("Inner");
        let Some(ComponentType::Function(def)) = Some(f.clone()) else {
            unreachable!()
        };
        let memo = ComponentType::memo(f);
        let unwrapped = unwrap_to_hot_reloadable(&memo).expect("memo unwraps");
        assert!(Rc::ptr_eq(&unwrapped, &def));

        let fr = ComponentType::forward_ref("Input", |_, _| Ok(Node::Empty));
        assert_eq!(unwrap_to_hot_reloadable(&fr).map(|d| d.name().to_string()).as_deref(), Some("Input"));

        assert!(unwrap_to_hot_reloadable(&ComponentType::host("div")).is_none());
        assert!(unwrap_to_hot_reloadable(&class("Boundary")).is_none());
        assert!(unwrap_to_hot_reloadable(&Context::new("Theme", 0).provider()).is_none());
    }

    #[test]
    fn test_resolve_latest_follows_identity() {
        let v1 = function("AppV1");
        let v2 = function("AppV2");
        let plain = function("Plain");
        assert!(resolve_latest(&plain).same_type(&plain));

        let identity = Identity::new("App", v1.clone());
        assert!(resolve_latest(&v1).same_type(&v1));
        identity.update(v2.clone());
        assert!(resolve_latest(&v1).same_type(&v2));
        assert!(resolve_latest(&v2).same_type(&v2));
    }

    #[test]
    fn test_resolve_function_unwraps_current_carrier() {
        let inner1 = function("Inner");
        let inner2 = function("Inner");
        let ComponentType::Function(def1) = inner1.clone() else {
            unreachable!()
        };
        let ComponentType::Function(def2) = inner2.clone() else {
            unreachable!()
        };
        let identity = Identity::new("Inner", ComponentType::memo(inner1));
        assert!(Rc::ptr_eq(&resolve_function(&def1), &def1));
        identity.update(ComponentType::memo(inner2));
        assert!(Rc::ptr_eq(&resolve_function(&def1), &def2));
    }
}
