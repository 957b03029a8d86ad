//! Reconciler behaviour through the public `Renderer` handle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::config::RefreshConfig;
use crate::deps;
use crate::element::{Component, ComponentType, Context, Element, NodeRef, RenderResult};
use crate::hooks::{Cleanup, Deps};

fn mount(node: impl Into<Node>) -> (Renderer, RootId) {
    let renderer = Renderer::new();
    let root = renderer.create_root();
    renderer.render(root, node).unwrap();
    (renderer, root)
}

fn counter() -> ComponentType {
    ComponentType::function("Counter", |hooks, _| {
        let (count, set) = hooks.use_state(|| 0_i64);
        Ok(Element::host("button")
            .on("onClick", move || set.update(|n| n + 1))
            .child(count)
            .into())
    })
}

fn thrower() -> ComponentType {
    ComponentType::function("Thrower", |_, _| Err(RenderError::thrown("boom")))
}

struct Boundary {
    failed: Option<String>,
}

impl Component for Boundary {
    fn render(&self, props: &Props) -> RenderResult {
        match &self.failed {
            Some(message) => Ok(Element::host("p").child(format!("fallback: {message}")).into()),
            None => Ok(Node::List(props.children().to_vec())),
        }
    }

    fn capture_error(&mut self, error: &RenderError) -> bool {
        self.failed = Some(error.message());
        true
    }
}

fn boundary() -> ComponentType {
    ComponentType::class("Boundary", |_| Box::new(Boundary { failed: None }))
}

fn host_children(renderer: &Renderer, node: HostId) -> Vec<HostId> {
    renderer.with_reconciler(|r| r.host().children(node).to_vec())
}

#[test]
fn test_click_updates_state_in_place() {
    let (renderer, root) = mount(counter().element());
    let button = renderer.container_first_child(root).unwrap();
    assert_eq!(renderer.text_content(button), "0");

    assert_eq!(renderer.dispatch_click(button).unwrap(), 1);
    renderer.dispatch_click(button).unwrap();
    assert_eq!(renderer.text_content(button), "2");
    assert_eq!(renderer.container_first_child(root), Some(button));
}

#[test]
fn test_deferred_update_waits_for_flush() {
    let lazy = ComponentType::function("Lazy", |hooks, _| {
        let (label, set) = hooks.use_state(|| "idle".to_string());
        Ok(Element::host("span")
            .on("onClick", move || set.set_deferred("busy".to_string()))
            .child(label)
            .into())
    });
    let (renderer, root) = mount(lazy.element());
    let span = renderer.container_first_child(root).unwrap();

    renderer.dispatch_click(span).unwrap();
    assert_eq!(renderer.text_content(span), "idle");
    renderer.flush_scheduled().unwrap();
    assert_eq!(renderer.text_content(span), "busy");
}

#[test]
fn test_keyed_children_move_host_nodes() {
    let list = |keys: &[&str]| {
        Node::from(
            Element::host("ul").children(
                keys.iter()
                    .map(|k| Element::host("li").key(*k).child(*k).into()),
            ),
        )
    };
    let (renderer, root) = mount(list(&["a", "b", "c"]));
    let ul = renderer.container_first_child(root).unwrap();
    let before = host_children(&renderer, ul);

    renderer.render(root, list(&["c", "a", "b"])).unwrap();
    assert_eq!(host_children(&renderer, ul), vec![before[2], before[0], before[1]]);
    assert_eq!(renderer.text_content(ul), "cab");

    renderer.render(root, list(&["a", "c"])).unwrap();
    assert_eq!(host_children(&renderer, ul), vec![before[0], before[2]]);
    renderer.with_reconciler(|r| assert!(!r.host().contains(before[1])));
}

#[test]
fn test_type_change_replaces_host_node() {
    let (renderer, root) = mount(Element::host("div").child("x"));
    let div = renderer.container_first_child(root).unwrap();
    renderer.render(root, Element::host("span").child("x")).unwrap();
    let span = renderer.container_first_child(root).unwrap();
    assert_ne!(div, span);
    assert_eq!(renderer.markup(root), "<span>x</span>");
}

#[test]
fn test_effects_run_in_order_and_clean_up_on_unmount() {
    let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));
    let l = log.clone();
    let effects = ComponentType::function("Effects", move |hooks, _| {
        let passive = l.clone();
        hooks.use_effect(deps![], move || {
            passive.borrow_mut().push("passive");
            let cleanup = passive.clone();
            Some(Box::new(move || cleanup.borrow_mut().push("passive cleanup")) as Cleanup)
        });
        let layout = l.clone();
        hooks.use_layout_effect(deps![], move || {
            layout.borrow_mut().push("layout");
            None
        });
        Ok(Node::text("x"))
    });

    let (renderer, root) = mount(effects.element());
    assert_eq!(*log.borrow(), ["layout"]);
    assert!(renderer.flush_passive_effects());
    assert!(!renderer.flush_passive_effects());
    assert_eq!(*log.borrow(), ["layout", "passive"]);

    renderer.render(root, Node::Empty).unwrap();
    assert_eq!(*log.borrow(), ["layout", "passive", "passive cleanup"]);
    assert_eq!(renderer.markup(root), "");
}

#[test]
fn test_act_flushes_effect_driven_updates() {
    let loader = ComponentType::function("Loader", |hooks, _| {
        let (value, set) = hooks.use_state(|| "loading".to_string());
        hooks.use_effect(deps![], move || {
            set.set("ready".to_string());
            None
        });
        Ok(Node::text(value))
    });
    let renderer = Renderer::new();
    let root = renderer.create_root();
    renderer
        .act(|r| r.render(root, loader.element()))
        .unwrap()
        .unwrap();
    assert_eq!(renderer.markup(root), "ready");
}

#[test]
fn test_boundary_renders_fallback() {
    let tree = boundary().element().child(thrower().element());
    let (renderer, root) = mount(tree);
    assert_eq!(renderer.markup(root), "<p>fallback: boom</p>");
}

#[test]
fn test_uncaught_error_unmounts_root() {
    let (renderer, root) = mount(Element::host("div").child("ok"));
    let err = renderer.render(root, thrower().element()).unwrap_err();
    assert_eq!(
        err,
        RenderError::Uncaught {
            component: "Thrower".into(),
            message: "boom".into()
        }
    );
    assert_eq!(renderer.markup(root), "");
    assert_eq!(renderer.container_first_child(root), None);
}

#[test]
fn test_memo_skips_equal_props() {
    let renders = Rc::new(Cell::new(0));
    let r = renders.clone();
    let label = ComponentType::function("Label", move |_, props| {
        r.set(r.get() + 1);
        Ok(Node::text(props.str("text").unwrap_or_default().to_string()))
    });
    let memo = ComponentType::memo(label);
    let app = |text: &str| Node::from(Element::host("div").child(memo.element().attr("text", text)));

    let (renderer, root) = mount(app("a"));
    renderer.render(root, app("a")).unwrap();
    assert_eq!(renders.get(), 1);

    renderer.render(root, app("b")).unwrap();
    assert_eq!(renders.get(), 2);
    assert_eq!(renderer.markup(root), "<div>b</div>");
}

#[test]
fn test_context_change_reaches_memoized_consumer() {
    let theme = Context::new("Theme", "light");
    let t = theme.clone();
    let reader = ComponentType::memo(ComponentType::function("Reader", move |hooks, _| {
        Ok(Node::text(hooks.use_context::<&str>(&t).unwrap_or("?")))
    }));
    let app = |value: &'static str| {
        Node::from(theme.provider().element().value(value).child(reader.element()))
    };

    let (renderer, root) = mount(reader.element());
    assert_eq!(renderer.markup(root), "light");

    renderer.render(root, app("dark")).unwrap();
    assert_eq!(renderer.markup(root), "dark");
    renderer.render(root, app("blue")).unwrap();
    assert_eq!(renderer.markup(root), "blue");
}

#[test]
fn test_consumer_render_prop() {
    let theme = Context::new("Theme", 1_i64);
    let tree = theme.provider().element().value(7_i64).child(
        theme
            .consumer()
            .element()
            .render(|value| Node::from(value.downcast_ref::<i64>().copied().unwrap_or(0))),
    );
    let (renderer, root) = mount(tree);
    assert_eq!(renderer.markup(root), "7");
}

#[test]
fn test_forward_ref_attaches_host_node() {
    let fancy = ComponentType::forward_ref("Fancy", |hooks, _| {
        let mut input = Element::host("input");
        if let Some(node_ref) = hooks.forwarded_ref() {
            input = input.node_ref(&node_ref);
        }
        Ok(input.into())
    });
    let node_ref = NodeRef::new();
    let (renderer, root) = mount(fancy.element().node_ref(&node_ref));
    assert_eq!(node_ref.get(), renderer.container_first_child(root));
    assert!(node_ref.get().is_some());

    renderer.render(root, Node::Empty).unwrap();
    assert_eq!(node_ref.get(), None);
}

#[test]
fn test_nested_update_limit() {
    let looping = ComponentType::function("Loop", |hooks, _| {
        let (n, set) = hooks.use_state(|| 0_i64);
        hooks.use_layout_effect(Deps::Always, move || {
            set.update(|n| n + 1);
            None
        });
        Ok(Node::from(n))
    });
    let mut config = RefreshConfig::default();
    config.scheduler.nested_update_limit = 5;
    let renderer = Renderer::with_config(&config);
    let root = renderer.create_root();
    let err = renderer.render(root, looping.element()).unwrap_err();
    assert_eq!(err, RenderError::NestedUpdateLimit(5));
}

#[test]
fn test_unmounted_fibers_are_swept() {
    let (renderer, root) = mount(Element::host("div").children((0..3).map(|i| Node::from(i as i64))));
    let populated = renderer.with_reconciler(|r| r.tree.len());
    renderer.render(root, Node::Empty).unwrap();
    renderer.render(root, Node::Empty).unwrap();
    let swept = renderer.with_reconciler(|r| r.tree.len());
    assert!(swept < populated);
    assert!(swept <= 2);
}
