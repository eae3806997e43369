// SPDX-License-Identifier: MIT OR Apache-2.0
//! nodeweave demo - headless replay of editing gestures
//!
//! Builds a small graph, feeds a scripted stream of egui events through the
//! input engine and logs what each gesture did to the graph.
//!
//! Usage: `nodeweave_demo [BINDINGS.ron]` or `nodeweave_demo --dump-bindings`

use egui::{Event, Key, Modifiers, PointerButton, Pos2, Rect, Vec2};
use nodeweave_graph::{ContextMenu, Graph, GraphCanvas, InputEvent, Node};
use nodeweave_input::{EguiEventTranslator, InputBindings, InputEngine, KeyChord};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// One scripted gesture
enum Step {
    Egui(Vec<Event>),
    Action(&'static str, Pos2),
}

fn click(pos: Pos2, button: PointerButton, modifiers: Modifiers) -> Vec<Event> {
    vec![
        Event::PointerMoved(pos),
        Event::PointerButton {
            pos,
            button,
            pressed: true,
            modifiers,
        },
        Event::PointerButton {
            pos,
            button,
            pressed: false,
            modifiers,
        },
    ]
}

fn drag(from: Pos2, to: Pos2) -> Vec<Event> {
    let button = PointerButton::Primary;
    vec![
        Event::PointerMoved(from),
        Event::PointerButton {
            pos: from,
            button,
            pressed: true,
            modifiers: Modifiers::NONE,
        },
        Event::PointerMoved(from.lerp(to, 0.5)),
        Event::PointerMoved(to),
        Event::PointerButton {
            pos: to,
            button,
            pressed: false,
            modifiers: Modifiers::NONE,
        },
    ]
}

fn key(key: Key, modifiers: Modifiers) -> Vec<Event> {
    vec![Event::Key {
        key,
        physical_key: None,
        pressed: true,
        repeat: false,
        modifiers,
    }]
}

fn build_graph() -> Graph {
    let mut graph = Graph::new("demo");
    let menu = ContextMenu::new().with_item("Connect to...", "connect");
    for (i, x) in [40.0, 200.0, 360.0].into_iter().enumerate() {
        let node = Node::at(Pos2::new(x, 100.0), Vec2::new(100.0, 60.0))
            .with_payload(ron::Value::String(format!("node {i}")))
            .with_context_menu(menu.clone());
        let id = graph.add_node(node);
        graph.add_node(Node::relative(id, Vec2::new(0.0, -20.0), Vec2::new(100.0, 16.0)));
    }
    graph.add_node(Node::no_pan(Rect::from_min_size(
        Pos2::new(8.0, 8.0),
        Vec2::new(120.0, 24.0),
    )));
    graph
}

fn script(bindings: &InputBindings) -> Vec<(&'static str, Step)> {
    let none = Modifiers::NONE;
    let primary = PointerButton::Primary;
    let chord = |c: KeyChord| Step::Egui(key(c.key, c.modifiers()));
    vec![
        ("select first", Step::Egui(click(Pos2::new(60.0, 120.0), primary, none))),
        ("add second", Step::Egui(click(Pos2::new(220.0, 120.0), primary, Modifiers::SHIFT))),
        ("drag pair", Step::Egui(drag(Pos2::new(60.0, 120.0), Pos2::new(80.0, 160.0)))),
        ("connect selection", Step::Action("connect", Pos2::new(80.0, 140.0))),
        ("pick destination", Step::Egui(click(Pos2::new(380.0, 120.0), primary, none))),
        ("connector maker on", chord(bindings.connector_maker)),
        ("start connector", Step::Egui(click(Pos2::new(380.0, 120.0), primary, none))),
        ("abandon", chord(bindings.cancel)),
        ("box select", Step::Egui(drag(Pos2::new(10.0, 300.0), Pos2::new(700.0, 50.0)))),
        ("focus", chord(bindings.focus)),
        ("select all", chord(bindings.select_all)),
        ("select all again", chord(bindings.select_all)),
    ]
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("nodeweave_graph=debug,nodeweave_input=debug,nodeweave_demo=info")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let arg = std::env::args().nth(1);
    let bindings = match arg.as_deref() {
        Some("--dump-bindings") => {
            match InputBindings::default().to_ron() {
                Ok(ron) => println!("{ron}"),
                Err(e) => {
                    tracing::error!("Failed to serialize bindings: {e}");
                    std::process::exit(1);
                }
            }
            return;
        }
        Some(path) => match InputBindings::load(Path::new(path)) {
            Ok(bindings) => bindings,
            Err(e) => {
                tracing::error!("Failed to load bindings from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => InputBindings::default(),
    };

    tracing::info!("Starting nodeweave demo v{}", env!("CARGO_PKG_VERSION"));

    let mut canvas = GraphCanvas::new(build_graph(), Vec2::new(800.0, 600.0));
    let mut engine = InputEngine::with_default_modes(&bindings);
    let mut translator = EguiEventTranslator::default();

    for (label, step) in script(&bindings) {
        let events = match step {
            Step::Egui(raw) => translator.translate_all(&raw),
            Step::Action(action, pos) => vec![InputEvent::ContextAction {
                action: action.to_string(),
                pos,
            }],
        };
        for event in events {
            engine.process(&mut canvas, event);
        }
        let overlay = engine.render(&canvas).overlay.len();
        for notification in canvas.take_notifications() {
            tracing::info!(step = label, ?notification, "notification");
        }
        tracing::info!(
            step = label,
            selected = canvas.graph.selected_node_count(),
            connectors = canvas.graph.connector_count(),
            overlay,
            "step done"
        );
    }

    tracing::info!(
        nodes = canvas.graph.node_count(),
        connectors = canvas.graph.connector_count(),
        pan = ?canvas.state.pan,
        "final state"
    );
}
