//! Render output: nodes, elements and refs.

use std::cell::Cell;
use std::rc::Rc;

use super::{ComponentType, PropValue, Props, SharedStr};
use crate::element::props::{Handler, RenderProp};
use crate::host::HostId;

/// Handle filled with the host node of the element it is attached to.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<HostId>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<HostId> {
        self.0.get()
    }

    pub(crate) fn set(&self, node: Option<HostId>) {
        self.0.set(node);
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRef").field(&self.get()).finish()
    }
}

// =============================================================================
// Element
// =============================================================================

/// A description of one component instance: type, key, props and ref.
#[derive(Clone)]
pub struct Element {
    pub ty: ComponentType,
    pub key: Option<SharedStr>,
    pub props: Rc<Props>,
    pub node_ref: Option<NodeRef>,
}

impl Element {
    pub fn new(ty: ComponentType) -> Self {
        Self {
            ty,
            key: None,
            props: Rc::new(Props::new()),
            node_ref: None,
        }
    }

    /// Host element with the given tag.
    pub fn host(tag: &str) -> Self {
        Self::new(ComponentType::host(tag))
    }

    pub fn key(mut self, key: impl Into<SharedStr>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.props).set(name, value);
        self
    }

    /// Attach an event handler, e.g. `on("onClick", ...)`.
    pub fn on(mut self, name: &str, handler: impl Fn() + 'static) -> Self {
        let handler: Handler = Rc::new(handler);
        Rc::make_mut(&mut self.props).set(name, PropValue::Handler(handler));
        self
    }

    /// Context value carried by a provider element.
    pub fn value<T: 'static>(mut self, value: T) -> Self {
        Rc::make_mut(&mut self.props).set("value", PropValue::Value(Rc::new(value)));
        self
    }

    /// Render callback of a consumer element.
    pub fn render(mut self, render: impl Fn(&Rc<dyn std::any::Any>) -> Node + 'static) -> Self {
        let render: RenderProp = Rc::new(render);
        Rc::make_mut(&mut self.props).set("render", PropValue::Render(render));
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        Rc::make_mut(&mut self.props).push_child(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        let props = Rc::make_mut(&mut self.props);
        for child in children {
            props.push_child(child);
        }
        self
    }

    pub fn node_ref(mut self, node_ref: &NodeRef) -> Self {
        self.node_ref = Some(node_ref.clone());
        self
    }
}

// =============================================================================
// Node
// =============================================================================

/// Render output of a component.
#[derive(Clone, Default)]
pub enum Node {
    #[default]
    Empty,
    Text(SharedStr),
    Element(Element),
    List(Vec<Node>),
}

impl Node {
    pub fn text(text: impl Into<SharedStr>) -> Self {
        Self::Text(text.into())
    }

    /// Identity comparison: elements by type and props pointer, text by value.
    pub fn same(&self, other: &Node) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Element(a), Self::Element(b)) => {
                a.ty.same_type(&b.ty) && a.key == b.key && Rc::ptr_eq(&a.props, &b.props)
            }
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
            }
            _ => false,
        }
    }

    /// Flatten nested lists and drop empty nodes.
    pub fn flatten(self) -> Vec<Node> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Node>) {
        match self {
            Self::Empty => {}
            Self::List(nodes) => {
                for node in nodes {
                    node.flatten_into(out);
                }
            }
            node => out.push(node),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text.into())
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Text(value.to_string().into())
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Self::List(nodes)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(node: Option<T>) -> Self {
        node.map_or(Self::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_drops_empty_and_nested_lists() {
        let node = Node::List(vec![
            Node::from("a"),
            Node::Empty,
            Node::List(vec![Node::from("b"), Node::List(vec![Node::from("c")])]),
        ]);
        let flat = node.flatten();
        assert_eq!(flat.len(), 3);
        assert!(flat[2].same(&Node::from("c")));
    }

    #[test]
    fn test_element_builder_shares_props_until_modified() {
        let base = Element::host("div").attr("className", "a");
        let copy = base.clone();
        assert!(Node::from(base.clone()).same(&Node::from(copy)));

        let changed = base.clone().attr("className", "b");
        assert!(!Node::from(base).same(&Node::from(changed)));
    }
}
