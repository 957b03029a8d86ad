//! Props snapshot attached to elements and fibers.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::{Node, SharedStr};

/// Event handler stored under an `on*` prop.
pub type Handler = Rc<dyn Fn()>;

/// Render callback used by context consumers.
pub type RenderProp = Rc<dyn Fn(&Rc<dyn Any>) -> Node>;

/// A single prop value.
///
/// Shared values compare by pointer, everything else by value.
#[derive(Clone)]
pub enum PropValue {
    Str(SharedStr),
    Int(i64),
    Bool(bool),
    Handler(Handler),
    Value(Rc<dyn Any>),
    Render(RenderProp),
}

impl PropValue {
    /// Host attribute rendering of this value, `None` for non-attribute values.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Handler(_) | Self::Value(_) | Self::Render(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => Rc::ptr_eq(a, b),
            (Self::Value(a), Self::Value(b)) => Rc::ptr_eq(a, b),
            (Self::Render(a), Self::Render(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Handler(_) => f.write_str("<handler>"),
            Self::Value(_) => f.write_str("<value>"),
            Self::Render(_) => f.write_str("<render>"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<SharedStr> for PropValue {
    fn from(value: SharedStr) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        Self::Handler(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Immutable props snapshot. Elements share it through `Rc`, and the
/// reconciler uses pointer identity of that `Rc` to detect unchanged props.
#[derive(Clone, Default)]
pub struct Props {
    attrs: Vec<(SharedStr, PropValue)>,
    children: Vec<Node>,
    text: Option<SharedStr>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props of a host text fiber.
    pub fn text(text: SharedStr) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    /// Props holding only children (root containers).
    pub fn with_children(children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Set or replace an attribute.
    pub fn set(&mut self, name: impl Into<SharedStr>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn handler(&self, name: &str) -> Option<&Handler> {
        match self.get(name)? {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<&Rc<dyn Any>> {
        match self.get(name)? {
            PropValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn render_prop(&self, name: &str) -> Option<&RenderProp> {
        match self.get(name)? {
            PropValue::Render(r) => Some(r),
            _ => None,
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attrs.iter().map(|(n, v)| (n.as_ref(), v))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn text_content(&self) -> Option<&SharedStr> {
        self.text.as_ref()
    }

    /// Shallow comparison used by memo wrappers: attributes by value
    /// (shared values by pointer), children by element identity.
    pub fn shallow_eq(&self, other: &Props) -> bool {
        self.attrs.len() == other.attrs.len()
            && self
                .attrs
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same(b))
            && self.text == other.text
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.attrs {
            map.entry(name, value);
        }
        if !self.children.is_empty() {
            map.entry(&"children", &self.children.len());
        }
        if let Some(text) = &self.text {
            map.entry(&"text", text);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_existing_attribute() {
        let mut props = Props::new();
        props.set("className", "blue");
        props.set("className", "red");
        assert_eq!(props.str("className"), Some("red"));
        assert_eq!(props.attrs().count(), 1);
    }

    #[test]
    fn test_shallow_eq_compares_handlers_by_pointer() {
        let handler: Handler = Rc::new(|| {});
        let mut a = Props::new();
        a.set("onClick", handler.clone());
        a.set("count", 1);
        let mut b = Props::new();
        b.set("count", 1);
        b.set("onClick", handler);
        assert!(a.shallow_eq(&b));

        let mut c = Props::new();
        c.set("onClick", Rc::new(|| {}) as Handler);
        c.set("count", 1);
        assert!(!a.shallow_eq(&c));
    }

    #[test]
    fn test_attribute_rendering() {
        assert_eq!(PropValue::from(3).to_attribute().as_deref(), Some("3"));
        assert_eq!(PropValue::from(true).to_attribute().as_deref(), Some("true"));
        assert!(PropValue::Handler(Rc::new(|| {})).to_attribute().is_none());
    }
}
