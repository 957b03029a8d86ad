//! In-memory host renderer.
//!
//! Host nodes are elements (tag, attributes, listeners, children) and text
//! nodes. The reconciler creates and mutates them during commit; tests and
//! the CLI inspect them through `text_content` / `attribute`.

use std::collections::BTreeMap;

use slotmap::{SlotMap, new_key_type};

use crate::element::{Handler, PropValue, Props, SharedStr};

new_key_type! {
    /// Opaque handle of a host node.
    pub struct HostId;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    Container,
    Element(SharedStr),
    Text,
}

pub struct HostNode {
    pub kind: HostKind,
    pub text: String,
    pub attrs: BTreeMap<String, String>,
    listeners: Vec<(SharedStr, Handler)>,
    pub children: Vec<HostId>,
    pub parent: Option<HostId>,
}

impl HostNode {
    fn new(kind: HostKind) -> Self {
        Self {
            kind,
            text: String::new(),
            attrs: BTreeMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            HostKind::Element(tag) => Some(tag),
            HostKind::Container | HostKind::Text => None,
        }
    }
}

/// Arena of host nodes.
#[derive(Default)]
pub struct MemoryHost {
    nodes: SlotMap<HostId, HostNode>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_container(&mut self) -> HostId {
        self.nodes.insert(HostNode::new(HostKind::Container))
    }

    pub fn create_element(&mut self, tag: &str, props: &Props) -> HostId {
        let id = self.nodes.insert(HostNode::new(HostKind::Element(tag.into())));
        self.apply_props(id, props);
        id
    }

    pub fn create_text(&mut self, text: &str) -> HostId {
        let mut node = HostNode::new(HostKind::Text);
        node.text = text.to_owned();
        self.nodes.insert(node)
    }

    /// Replace attributes and listeners with those of `props`.
    ///
    /// `on*` handlers become listeners; other values that render as
    /// attributes become attributes; children are ignored.
    pub fn apply_props(&mut self, id: HostId, props: &Props) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.attrs.clear();
        node.listeners.clear();
        for (name, value) in props.attrs() {
            match value {
                PropValue::Handler(handler) if name.starts_with("on") => {
                    node.listeners.push((name.into(), handler.clone()));
                }
                _ => {
                    if let Some(attr) = value.to_attribute() {
                        node.attrs.insert(name.to_owned(), attr);
                    }
                }
            }
        }
    }

    pub fn set_text(&mut self, id: HostId, text: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.text.clear();
            node.text.push_str(text);
        }
    }

    /// Make `children` the exact child list of `parent`.
    pub fn set_children(&mut self, parent: HostId, children: &[HostId]) {
        if !self.nodes.contains_key(parent) {
            return;
        }
        let old = self
            .nodes
            .get_mut(parent)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in old {
            if let Some(node) = self.nodes.get_mut(child)
                && node.parent == Some(parent)
            {
                node.parent = None;
            }
        }

        let mut kept = Vec::with_capacity(children.len());
        for &child in children {
            let previous = match self.nodes.get_mut(child) {
                Some(node) => node.parent.replace(parent),
                None => continue,
            };
            if let Some(previous) = previous.filter(|p| *p != parent)
                && let Some(node) = self.nodes.get_mut(previous)
            {
                node.children.retain(|c| *c != child);
            }
            kept.push(child);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children = kept;
        }
    }

    /// Detach `id` from its parent and drop it with all descendants.
    pub fn remove(&mut self, id: HostId) {
        let parent = self.nodes.get(id).and_then(|n| n.parent);
        if let Some(node) = parent.and_then(|p| self.nodes.get_mut(p)) {
            node.children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
    }

    pub fn get(&self, id: HostId) -> Option<&HostNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: HostId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        match self.nodes.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn first_child(&self, id: HostId) -> Option<HostId> {
        self.children(id).first().copied()
    }

    pub fn attribute(&self, id: HostId, name: &str) -> Option<&str> {
        self.nodes.get(id)?.attrs.get(name).map(String::as_str)
    }

    /// Concatenated text of `id` and all descendants.
    pub fn text_content(&self, id: HostId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    fn push_text(&self, id: HostId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match node.kind {
            HostKind::Text => out.push_str(&node.text),
            HostKind::Container | HostKind::Element(_) => {
                for &child in &node.children {
                    self.push_text(child, out);
                }
            }
        }
    }

    /// Handlers for `event` from `target` up to the root, innermost first.
    pub fn bubble_handlers(&self, target: HostId, event: &str) -> Vec<Handler> {
        let mut handlers = Vec::new();
        let mut next = Some(target);
        while let Some(id) = next {
            let Some(node) = self.nodes.get(id) else {
                break;
            };
            handlers.extend(
                node.listeners
                    .iter()
                    .filter(|(name, _)| name.as_ref() == event)
                    .map(|(_, handler)| handler.clone()),
            );
            next = node.parent;
        }
        handlers
    }

    /// Compact markup of the subtree at `id`, for logs and snapshots.
    pub fn render_markup(&self, id: HostId) -> String {
        let mut out = String::new();
        self.push_markup(id, &mut out);
        out
    }

    fn push_markup(&self, id: HostId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.kind {
            HostKind::Text => out.push_str(&node.text),
            HostKind::Container => {
                for &child in &node.children {
                    self.push_markup(child, out);
                }
            }
            HostKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.attrs {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                for &child in &node.children {
                    self.push_markup(child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_props_split_into_attributes_and_listeners() {
        let mut host = MemoryHost::new();
        let mut props = Props::new();
        props.set("className", "blue");
        props.set("onClick", Rc::new(|| {}) as Handler);
        props.set("hidden", false);
        let div = host.create_element("div", &props);

        assert_eq!(host.attribute(div, "className"), Some("blue"));
        assert_eq!(host.attribute(div, "hidden"), Some("false"));
        assert_eq!(host.attribute(div, "onClick"), None);
        assert_eq!(host.bubble_handlers(div, "onClick").len(), 1);
    }

    #[test]
    fn test_set_children_moves_nodes_between_parents() {
        let mut host = MemoryHost::new();
        let root = host.create_container();
        let a = host.create_element("a", &Props::new());
        let b = host.create_element("b", &Props::new());
        let t = host.create_text("x");

        host.set_children(root, &[a, b]);
        host.set_children(a, &[t]);
        assert_eq!(host.render_markup(root), "<a>x</a><b></b>");

        host.set_children(b, &[t]);
        assert!(host.children(a).is_empty());
        assert_eq!(host.render_markup(root), "<a></a><b>x</b>");

        host.set_children(root, &[b, a]);
        assert_eq!(host.first_child(root), Some(b));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut host = MemoryHost::new();
        let root = host.create_container();
        let div = host.create_element("div", &Props::new());
        let text = host.create_text("hi");
        host.set_children(root, &[div]);
        host.set_children(div, &[text]);
        assert_eq!(host.text_content(root), "hi");

        host.remove(div);
        assert!(!host.contains(text));
        assert!(host.children(root).is_empty());
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn test_click_bubbles_innermost_first() {
        let mut host = MemoryHost::new();
        let order = Rc::new(Cell::new(0));
        let (inner_seen, outer_seen) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));

        let mut outer_props = Props::new();
        let (o, s) = (order.clone(), outer_seen.clone());
        outer_props.set("onClick", Rc::new(move || { o.set(o.get() + 1); s.set(o.get()) }) as Handler);
        let mut inner_props = Props::new();
        let (o, s) = (order.clone(), inner_seen.clone());
        inner_props.set("onClick", Rc::new(move || { o.set(o.get() + 1); s.set(o.get()) }) as Handler);

        let outer = host.create_element("div", &outer_props);
        let inner = host.create_element("button", &inner_props);
        host.set_children(outer, &[inner]);

        for handler in host.bubble_handlers(inner, "onClick") {
            handler();
        }
        assert_eq!(inner_seen.get(), 1);
        assert_eq!(outer_seen.get(), 2);
    }
}
