use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;
use crate::input::PointerState;
use crate::model::{ElementRef, NodeKey, Scene};
use crate::view::Camera;

/// Events emitted by the Canvas to the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
    /// The selection changed. `None` means nothing is selected.
    SelectionChanged(Option<ElementRef>),
    /// The element under the pointer changed. `None` means empty canvas.
    HoverChanged(Option<ElementRef>),
    /// The camera moved or zoomed this frame.
    ViewChanged,
    /// A node was dragged to a new world position this frame.
    NodeMoved {
        id: crate::model::ElementId,
        position: Vec2,
    },
}

/// The current state of pointer interaction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionMode {
    /// No button held.
    #[default]
    Idle,
    /// The button is held over empty canvas; the camera follows the pointer.
    Panning,
    /// The button is held on the selected node; the node follows the pointer.
    Dragging { node: NodeKey },
}

/// Which pointer cursor the host should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorHint {
    #[default]
    Default,
    /// Something under the pointer can be selected.
    Pointer,
    /// The view or a node is being moved.
    Grab,
    /// The pointer crosshair overlay is on.
    Crosshair,
}

impl CursorHint {
    /// Derives the cursor from the interaction state after a frame.
    pub fn resolve(mode: InteractionMode, scene: &Scene, show_pointer: bool) -> Self {
        match mode {
            InteractionMode::Panning | InteractionMode::Dragging { .. } => CursorHint::Grab,
            InteractionMode::Idle if scene.hovered().is_some() => CursorHint::Pointer,
            InteractionMode::Idle if show_pointer => CursorHint::Crosshair,
            InteractionMode::Idle => CursorHint::Default,
        }
    }

    /// The CSS cursor name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Pointer => "pointer",
            CursorHint::Grab => "grab",
            CursorHint::Crosshair => "crosshair",
        }
    }
}

/// Applies one frame of pending wheel input to the camera.
///
/// The zoom step is fixed (`scale_rate` or its inverse); only the sign of the
/// accumulated wheel matters. The accumulator then decays toward zero.
pub fn apply_wheel_zoom(
    camera: &mut Camera,
    pointer: &mut PointerState,
    config: &CanvasConfig,
    events: &mut Vec<CanvasEvent>,
) {
    let Some(direction) = pointer.take_wheel_tick(config.wheel_decay, config.wheel_snap) else {
        return;
    };

    let rate = config.scale_rate as f64;
    let mut factor = if direction < 0.0 { 1.0 / rate } else { rate };
    if let Some(limits) = config.zoom_limits {
        factor = limits.clamp_factor(camera.scale, factor);
    }

    if factor != 1.0 && camera.scale_at(pointer.position.as_dvec2(), factor) {
        tracing::trace!(scale = camera.scale, wheel = pointer.wheel, "Zoom tick");
        events.push(CanvasEvent::ViewChanged);
    }
}

/// Advances the pan/drag state machine by one frame.
///
/// This acts as the central state machine for pointer interaction:
/// - `Idle` + button held: anchors at the pointer and enters `Dragging` when a
///   node is selected, `Panning` otherwise.
/// - `Panning`: moves the camera by the pointer delta.
/// - `Dragging`: centers the dragged node under the pointer.
/// - Button released: back to `Idle`.
pub fn resolve_pan_drag(
    mode: &mut InteractionMode,
    camera: &mut Camera,
    pointer: &mut PointerState,
    scene: &mut Scene,
    events: &mut Vec<CanvasEvent>,
) {
    let next_mode = match *mode {
        InteractionMode::Idle => handle_idle(pointer, scene),
        InteractionMode::Panning => handle_panning(camera, pointer, events),
        InteractionMode::Dragging { node } => {
            handle_dragging(camera, pointer, scene, node, events)
        }
    };

    if let Some(new_mode) = next_mode {
        tracing::debug!(from = ?mode, to = ?new_mode, "Interaction mode changed");
        *mode = new_mode;
    }
}

fn handle_idle(pointer: &mut PointerState, scene: &Scene) -> Option<InteractionMode> {
    if !pointer.button_down {
        return None;
    }
    pointer.last = pointer.position;
    match scene.selected_node {
        Some(node) => Some(InteractionMode::Dragging { node }),
        None => Some(InteractionMode::Panning),
    }
}

fn handle_panning(
    camera: &mut Camera,
    pointer: &mut PointerState,
    events: &mut Vec<CanvasEvent>,
) -> Option<InteractionMode> {
    if !pointer.button_down {
        return Some(InteractionMode::Idle);
    }
    let delta = pointer.take_delta();
    if delta != Vec2::ZERO {
        camera.pan(delta.as_dvec2());
        events.push(CanvasEvent::ViewChanged);
    }
    None
}

fn handle_dragging(
    camera: &Camera,
    pointer: &mut PointerState,
    scene: &mut Scene,
    key: NodeKey,
    events: &mut Vec<CanvasEvent>,
) -> Option<InteractionMode> {
    if !pointer.button_down {
        return Some(InteractionMode::Idle);
    }
    let Some(node) = scene.nodes.get_mut(key) else {
        // The node was removed mid-drag.
        return Some(InteractionMode::Idle);
    };

    pointer.last = pointer.position;
    let world = camera.to_world(pointer.position.as_dvec2()).as_vec2();
    if !world.is_finite() {
        return None;
    }
    let before = node.position;
    node.set_center(world);
    if node.position != before {
        events.push(CanvasEvent::NodeMoved {
            id: node.id.clone(),
            position: node.position,
        });
    }
    None
}

/// Resolves a button press against what was hovered in the last frame.
///
/// A hovered node toggles node selection, else a hovered edge toggles edge
/// selection, else the selection is cleared. Node and edge selection are
/// mutually exclusive. Returns the new selection if it changed.
pub fn select_on_press(scene: &mut Scene) -> Option<Option<ElementRef>> {
    let before = (scene.selected_node, scene.selected_edge);

    if let Some(node) = scene.hovered_node {
        scene.selected_node = (scene.selected_node != Some(node)).then_some(node);
        scene.selected_edge = None;
    } else if let Some(edge) = scene.hovered_edge {
        scene.selected_edge = (scene.selected_edge != Some(edge)).then_some(edge);
        scene.selected_node = None;
    } else {
        scene.selected_node = None;
        scene.selected_edge = None;
    }

    if (scene.selected_node, scene.selected_edge) == before {
        return None;
    }
    let selected = scene.selected();
    tracing::debug!(selection = ?selected, "Selection changed");
    Some(selected)
}
