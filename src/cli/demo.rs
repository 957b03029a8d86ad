//! `hotfiber demo`: mount a counter, click it, reload it.
//!
//! Version 1 renders a blue `<div>` with a click counter. Version 2 is
//! registered under the same key and hook signature, so the reload keeps
//! the count and the host node while the class flips to red. With
//! `--remount`, version 3 changes the hook signature and the counter
//! starts over on a fresh node.

use anyhow::{Result, bail};
use serde::Serialize;

use hotfiber::config::RefreshConfig;
use hotfiber::element::{ComponentType, Element, Node};
use hotfiber::fiber::RootId;
use hotfiber::host::HostId;
use hotfiber::identity::Registry;
use hotfiber::reconciler::Renderer;
use hotfiber::refresh::{RefreshBridge, ReloadResult};
use hotfiber::{log, logger};

use super::DemoArgs;

const APP_KEY: &str = "src/app.rs#App";

/// One observed state of the demo root.
#[derive(Debug, Serialize)]
pub struct DemoStep {
    pub label: String,
    pub markup: String,
    pub class_name: Option<String>,
    pub text: String,
    /// The root's first host node is the one mounted initially.
    pub same_host_node: bool,
    pub reported_host_nodes: usize,
    pub failed_boundaries: usize,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub steps: Vec<DemoStep>,
}

fn counter(name: &str, class: &'static str, with_ref: bool) -> ComponentType {
    ComponentType::function(name, move |hooks, _props| {
        let (count, set) = hooks.use_state(|| 0_i64);
        if with_ref {
            hooks.use_ref(|| ());
        }
        Ok(Element::host("div")
            .attr("className", class)
            .on("onClick", move || set.update(|n| n + 1))
            .child(count)
            .into())
    })
}

struct Scenario {
    renderer: Renderer,
    root: RootId,
    first_node: Option<HostId>,
    steps: Vec<DemoStep>,
}

impl Scenario {
    fn record(&mut self, label: impl Into<String>, reload: Option<&ReloadResult>) {
        let node = self.renderer.container_first_child(self.root);
        self.steps.push(DemoStep {
            label: label.into(),
            markup: self.renderer.markup(self.root),
            class_name: node.and_then(|n| self.renderer.attribute(n, "className")),
            text: node.map(|n| self.renderer.text_content(n)).unwrap_or_default(),
            same_host_node: node.is_some() && node == self.first_node,
            reported_host_nodes: reload.map_or(0, |r| r.host_nodes.len()),
            failed_boundaries: reload.map_or(0, |r| r.failed_boundaries.len()),
        });
    }
}

/// Run the scenario and collect its observations.
pub fn run_scenario(args: &DemoArgs, config: &RefreshConfig) -> Result<DemoReport> {
    let mut registry = Registry::new();
    let mut bridge = RefreshBridge::new();

    let v1 = counter("AppV1", "blue", false);
    registry.register(APP_KEY, v1.clone(), Some("useState(0)"));

    let renderer = Renderer::with_config(config);
    renderer.inject_into(&mut bridge);
    let root = renderer.create_root();
    renderer.render(root, Node::from(v1.element()))?;

    let mut scenario = Scenario {
        first_node: renderer.container_first_child(root),
        renderer,
        root,
        steps: Vec::new(),
    };
    scenario.record("mount v1", None);

    for _ in 0..args.clicks {
        let Some(node) = scenario.renderer.container_first_child(root) else {
            bail!("nothing mounted to click");
        };
        scenario.renderer.dispatch_click(node)?;
    }
    scenario.record(format!("after {} clicks", args.clicks), None);

    let mut reload = |registry: &mut Registry, scenario: &mut Scenario, label: &str| -> Result<()> {
        let request = registry.take_request();
        for outcome in bridge.perform_refresh(&request) {
            let result = outcome.result?;
            scenario.record(label, Some(&result));
        }
        Ok(())
    };

    registry.register(APP_KEY, counter("AppV2", "red", false), Some("useState(0)"));
    reload(&mut registry, &mut scenario, "reload v2 (state kept)")?;

    if args.remount {
        registry.register(APP_KEY, counter("AppV3", "green", true), Some("useState(0),useRef()"));
        reload(&mut registry, &mut scenario, "reload v3 (remounted)")?;
    }

    Ok(DemoReport {
        steps: scenario.steps,
    })
}

/// Entry point of `hotfiber demo`.
pub fn run(args: &DemoArgs, config: &RefreshConfig) -> Result<()> {
    let report = run_scenario(args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        log!("demo"; "{}: {}", step.label, step.markup);
    }
    match report.steps.last() {
        Some(last) if last.same_host_node => logger::status_success(&format!(
            "{}: host node preserved, {} reported",
            last.label, last.reported_host_nodes
        )),
        Some(last) => logger::status_success(&format!("{}: new host node", last.label)),
        None => logger::status_error("demo produced no output", ""),
    }
    Ok(())
}
