//! Component types.
//!
//! A `ComponentType` is what an element instantiates. Wrapper variants
//! (memo, forward-ref, provider, consumer) are transparent carriers around
//! an inner function or context. Definitions are reference counted, so two
//! types are "the same object" when their definitions are pointer-equal.

use std::any::Any;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use super::{Element, Props, RenderResult, SharedStr};
use crate::core::RenderError;
use crate::hooks::Hooks;
use crate::identity::IdentityRef;

/// Render callable of a function component.
pub type RenderFn = Rc<dyn Fn(&mut Hooks, &Props) -> RenderResult>;

/// Constructor of a class component instance.
pub type Construct = Rc<dyn Fn(&Props) -> Box<dyn Component>>;

/// Custom props comparison of a memo wrapper.
pub type CompareFn = Rc<dyn Fn(&Props, &Props) -> bool>;

/// Instance of a class component.
///
/// Class components keep state on the instance rather than in hooks. An
/// instance becomes an error boundary by accepting errors in
/// `capture_error`; it is then expected to render a fallback.
pub trait Component {
    fn render(&self, props: &Props) -> RenderResult;

    /// Accept an error thrown below this component. Returning `true` makes
    /// this instance the boundary for the error.
    fn capture_error(&mut self, _error: &RenderError) -> bool {
        false
    }

    fn will_unmount(&mut self) {}
}

// =============================================================================
// Definitions
// =============================================================================

/// A plain function component.
pub struct FunctionDef {
    name: SharedStr,
    render: RenderFn,
    identity: OnceCell<IdentityRef>,
}

impl FunctionDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self) -> &RenderFn {
        &self.render
    }

    pub fn identity(&self) -> Option<&IdentityRef> {
        self.identity.get()
    }
}

/// A class component (constructor plus class marker).
pub struct ClassDef {
    name: SharedStr,
    construct: Construct,
    identity: OnceCell<IdentityRef>,
}

impl ClassDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self, props: &Props) -> Box<dyn Component> {
        (self.construct)(props)
    }
}

/// Memo wrapper: skips re-rendering when props compare equal.
pub struct MemoDef {
    inner: ComponentType,
    compare: Option<CompareFn>,
    identity: OnceCell<IdentityRef>,
}

impl MemoDef {
    pub fn inner(&self) -> &ComponentType {
        &self.inner
    }

    pub fn props_equal(&self, prev: &Props, next: &Props) -> bool {
        match &self.compare {
            Some(compare) => compare(prev, next),
            None => prev.shallow_eq(next),
        }
    }
}

/// Forward-ref wrapper: renders its inner callable with the element's ref.
pub struct ForwardRefDef {
    render: Rc<FunctionDef>,
    identity: OnceCell<IdentityRef>,
}

impl ForwardRefDef {
    pub fn render(&self) -> &Rc<FunctionDef> {
        &self.render
    }
}

/// Context object shared by its provider and consumer types.
pub struct ContextDef {
    name: SharedStr,
    default: Rc<dyn Any>,
    identity: OnceCell<IdentityRef>,
}

/// Handle to a context object.
#[derive(Clone)]
pub struct Context(Rc<ContextDef>);

impl Context {
    pub fn new<T: 'static>(name: &str, default: T) -> Self {
        Self(Rc::new(ContextDef {
            name: name.into(),
            default: Rc::new(default),
            identity: OnceCell::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn default_value(&self) -> &Rc<dyn Any> {
        &self.0.default
    }

    /// Identity used when comparing two distinct context objects.
    pub fn identity(&self) -> Option<&IdentityRef> {
        self.0.identity.get()
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn provider(&self) -> ComponentType {
        ComponentType::Provider(self.clone())
    }

    pub fn consumer(&self) -> ComponentType {
        ComponentType::Consumer(self.clone())
    }

    pub(crate) fn bind_identity(&self, identity: &IdentityRef) {
        let _ = self.0.identity.set(identity.clone());
    }
}

// =============================================================================
// ComponentType
// =============================================================================

/// What an element instantiates.
#[derive(Clone)]
pub enum ComponentType {
    Host(SharedStr),
    Function(Rc<FunctionDef>),
    Class(Rc<ClassDef>),
    Memo(Rc<MemoDef>),
    ForwardRef(Rc<ForwardRefDef>),
    Provider(Context),
    Consumer(Context),
}

impl ComponentType {
    pub fn host(tag: &str) -> Self {
        Self::Host(tag.into())
    }

    pub fn function(
        name: &str,
        render: impl Fn(&mut Hooks, &Props) -> RenderResult + 'static,
    ) -> Self {
        Self::Function(Rc::new(FunctionDef {
            name: name.into(),
            render: Rc::new(render),
            identity: OnceCell::new(),
        }))
    }

    pub fn class(name: &str, construct: impl Fn(&Props) -> Box<dyn Component> + 'static) -> Self {
        Self::Class(Rc::new(ClassDef {
            name: name.into(),
            construct: Rc::new(construct),
            identity: OnceCell::new(),
        }))
    }

    pub fn memo(inner: ComponentType) -> Self {
        Self::Memo(Rc::new(MemoDef {
            inner,
            compare: None,
            identity: OnceCell::new(),
        }))
    }

    pub fn memo_with(
        inner: ComponentType,
        compare: impl Fn(&Props, &Props) -> bool + 'static,
    ) -> Self {
        Self::Memo(Rc::new(MemoDef {
            inner,
            compare: Some(Rc::new(compare)),
            identity: OnceCell::new(),
        }))
    }

    /// Forward-ref wrapper around a render callable; the callable reads the
    /// forwarded ref through `Hooks::forwarded_ref`.
    pub fn forward_ref(
        name: &str,
        render: impl Fn(&mut Hooks, &Props) -> RenderResult + 'static,
    ) -> Self {
        Self::ForwardRef(Rc::new(ForwardRefDef {
            render: Rc::new(FunctionDef {
                name: name.into(),
                render: Rc::new(render),
                identity: OnceCell::new(),
            }),
            identity: OnceCell::new(),
        }))
    }

    /// Start an element of this type.
    pub fn element(&self) -> Element {
        Element::new(self.clone())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Function(def) => def.name(),
            Self::Class(def) => def.name(),
            Self::Memo(def) => def.inner.name(),
            Self::ForwardRef(def) => def.render.name(),
            Self::Provider(ctx) | Self::Consumer(ctx) => ctx.name(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// Identity carried directly by this type (not by an inner type).
    pub fn identity(&self) -> Option<&IdentityRef> {
        match self {
            Self::Function(def) => def.identity.get(),
            Self::Class(def) => def.identity.get(),
            Self::Memo(def) => def.identity.get(),
            Self::ForwardRef(def) => def.identity.get(),
            Self::Host(_) | Self::Provider(_) | Self::Consumer(_) => None,
        }
    }

    /// Strict type equality: same definition object, or same host tag.
    pub fn same_type(&self, other: &ComponentType) -> bool {
        match (self, other) {
            (Self::Host(a), Self::Host(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Memo(a), Self::Memo(b)) => Rc::ptr_eq(a, b),
            (Self::ForwardRef(a), Self::ForwardRef(b)) => Rc::ptr_eq(a, b),
            (Self::Provider(a), Self::Provider(b)) | (Self::Consumer(a), Self::Consumer(b)) => {
                a.ptr_eq(b)
            }
            _ => false,
        }
    }

    /// Attach `identity` to this type and every carrier down to the
    /// innermost callable. Definitions keep the first identity they get.
    pub(crate) fn bind_identity(&self, identity: &IdentityRef) {
        match self {
            Self::Function(def) => {
                let _ = def.identity.set(identity.clone());
            }
            Self::Class(def) => {
                let _ = def.identity.set(identity.clone());
            }
            Self::Memo(def) => {
                let _ = def.identity.set(identity.clone());
                def.inner.bind_identity(identity);
            }
            Self::ForwardRef(def) => {
                let _ = def.identity.set(identity.clone());
                let _ = def.render.identity.set(identity.clone());
            }
            Self::Provider(ctx) | Self::Consumer(ctx) => ctx.bind_identity(identity),
            Self::Host(_) => {}
        }
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Host(_) => "Host",
            Self::Function(_) => "Function",
            Self::Class(_) => "Class",
            Self::Memo(_) => "Memo",
            Self::ForwardRef(_) => "ForwardRef",
            Self::Provider(_) => "Provider",
            Self::Consumer(_) => "Consumer",
        };
        write!(f, "{kind}({})", self.name())
    }
}
