use bevy::prelude::*;
use rand::Rng;

use crate::{
    camera::ScreenSpace,
    config::{CanvasConfig, EffectsConfig},
    effects::lifecycle::{EffectView, SubscriptionKind, Subscriptions},
    input::{PointerEvent, PointerEventKind},
};

/// Pointer position before the first move: far away, so nothing links
const POINTER_PARKED: Vec2 = Vec2::new(-9999.0, -9999.0);

const INK: Color = Color::BLACK;

/// Gizmo group for the canvas, rendered on its own layer under the page
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct CanvasGizmos;

/// A node placed in normalised canvas space ([0,1] on both axes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasNode {
    pub position: Vec2,
}

impl CanvasNode {
    /// `count` nodes placed uniformly at random
    pub fn scatter(count: usize, rng: &mut impl Rng) -> Vec<CanvasNode> {
        (0..count)
            .map(|_| CanvasNode {
                position: Vec2::new(rng.random::<f32>(), rng.random::<f32>()),
            })
            .collect()
    }

    pub fn to_pixels(&self, size: Vec2) -> Vec2 {
        self.position * size
    }
}

/// One line of the proximity graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityEdge {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

/// Line opacity for a pair `distance` apart: `max_alpha * (1 - d / link)`,
/// or `None` at or beyond the link distance
pub fn link_alpha(distance: f32, params: &CanvasConfig) -> Option<f32> {
    if distance < params.link_distance {
        Some(params.max_link_alpha * (1.0 - distance / params.link_distance))
    } else {
        None
    }
}

/// Edges to draw this frame.
///
/// A pair links when it is closer than the link distance and at least one
/// endpoint is within the same distance of the pointer. Checks every
/// unordered pair, so keep the node count in the tens.
pub fn proximity_edges(
    nodes: &[CanvasNode],
    size: Vec2,
    pointer: Vec2,
    params: &CanvasConfig,
) -> Vec<ProximityEdge> {
    let pixels: Vec<Vec2> = nodes.iter().map(|n| n.to_pixels(size)).collect();
    let near_pointer: Vec<bool> = pixels
        .iter()
        .map(|p| p.distance(pointer) < params.link_distance)
        .collect();

    let mut edges = Vec::new();
    for i in 0..pixels.len() {
        for j in (i + 1)..pixels.len() {
            if !(near_pointer[i] || near_pointer[j]) {
                continue;
            }
            let distance = pixels[i].distance(pixels[j]);
            if let Some(alpha) = link_alpha(distance, params) {
                edges.push(ProximityEdge { a: i, b: j, alpha });
            }
        }
    }
    edges
}

/// The node field behind the hero, redrawn every frame
#[derive(Component, Debug, Clone)]
pub struct NodeCanvas {
    /// Fixed at activation
    pub nodes: Vec<CanvasNode>,
    /// Drawing surface size in pixels, tracks the observed size
    pub size: Vec2,
    /// Top-left of the surface in client coordinates
    pub origin: Vec2,
    /// Pointer in canvas pixels
    pub pointer: Vec2,
    pub params: CanvasConfig,
}

impl NodeCanvas {
    pub fn new(nodes: Vec<CanvasNode>, origin: Vec2, size: Vec2, params: CanvasConfig) -> Self {
        Self {
            nodes,
            size,
            origin,
            pointer: POINTER_PARKED,
            params,
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn pointer_moved(&mut self, client: Vec2) {
        self.pointer = client - self.origin;
    }

    pub fn edges(&self) -> Vec<ProximityEdge> {
        proximity_edges(&self.nodes, self.size, self.pointer, &self.params)
    }
}

const CANVAS_SUBSCRIPTIONS: [SubscriptionKind; 3] = [
    SubscriptionKind::PointerMove,
    SubscriptionKind::AnimationFrame,
    SubscriptionKind::Resize,
];

/// System: mount the node canvas covering the viewport
pub fn activate_node_canvas(
    mut commands: Commands,
    mut subs: ResMut<Subscriptions>,
    config: Res<EffectsConfig>,
    screen: Res<ScreenSpace>,
) {
    let params = config.canvas;
    let nodes = CanvasNode::scatter(params.node_count, &mut rand::rng());
    let canvas = NodeCanvas::new(nodes, Vec2::ZERO, screen.size, params);

    let view = commands
        .spawn((EffectView { name: "node canvas" }, canvas))
        .id();
    let held = subs.subscribe_all(view, &CANVAS_SUBSCRIPTIONS);
    commands.entity(view).insert(held);

    info!("Node canvas active with {} nodes", params.node_count);
}

/// System: feed pointer moves into each canvas
pub fn track_canvas_pointer(
    mut pointer_events: MessageReader<PointerEvent>,
    mut canvases: Query<&mut NodeCanvas>,
) {
    for event in pointer_events.read() {
        if event.kind != PointerEventKind::Move {
            continue;
        }
        for mut canvas in &mut canvases {
            canvas.pointer_moved(event.position);
        }
    }
}

/// System: recompute pixel dimensions from the observed surface size
pub fn resize_node_canvas(screen: Res<ScreenSpace>, mut canvases: Query<&mut NodeCanvas>) {
    if !screen.is_changed() {
        return;
    }
    for mut canvas in &mut canvases {
        if canvas.size != screen.size {
            canvas.resize(screen.size);
        }
    }
}

/// System: clear-and-redraw of dots and proximity lines
pub fn draw_node_canvas(
    canvases: Query<&NodeCanvas>,
    screen: Res<ScreenSpace>,
    mut gizmos: Gizmos<CanvasGizmos>,
) {
    for canvas in &canvases {
        let to_world = |local: Vec2| screen.to_world(local + canvas.origin);

        for node in &canvas.nodes {
            gizmos.circle_2d(
                to_world(node.to_pixels(canvas.size)),
                canvas.params.dot_radius,
                INK.with_alpha(canvas.params.dot_alpha),
            );
        }

        for edge in canvas.edges() {
            let a = canvas.nodes[edge.a].to_pixels(canvas.size);
            let b = canvas.nodes[edge.b].to_pixels(canvas.size);
            gizmos.line_2d(
                to_world(a),
                to_world(b),
                INK.with_alpha(edge.alpha),
            );
        }
    }
}
