//! # GraphCanvas
//!
//! `graph_canvas` is a headless pan/zoom canvas for node/edge graphs.
//! It owns the camera, the pointer state and the scene, and once per frame it
//! applies pending input, culls and hit-tests the scene, and issues drawing
//! calls against a host-provided immediate-mode [`Surface`].
//!
//! ## Core Architecture
//! - **View (`src/view.rs`)**: The camera (World <-> Screen, zoom about a point).
//! - **Input (`src/input.rs`)**: Pointer events and the state they accumulate into.
//! - **Model (`src/model.rs`)**: The scene store, in flat arenas (SlotMap).
//! - **Interaction (`src/interaction.rs`)**: Wheel zoom, the pan/drag state machine, selection.
//! - **Painter (`src/painter.rs`)**: Culling, hit-testing and drawing of nodes and edges.
//! - **Render (`src/render.rs`)**: A recording `Surface` for tests and headless hosts.

pub mod background;
pub mod config;
pub mod error;
pub mod input;
pub mod interaction;
pub mod math;
pub mod model;
pub mod painter;
pub mod render;
pub mod surface;
pub mod view;

use glam::{Vec2, Vec4};

use background::{Background, BackgroundPainter};
use input::{PointerEvent, PointerEventKind, PointerState};
use model::{Edge, ElementRef, Node, Scene};
use painter::{DrawStats, Painter};

// Re-exports for convenience
pub use config::CanvasConfig;
pub use error::{CanvasError, Result};
pub use interaction::{CanvasEvent, CursorHint, InteractionMode};
pub use surface::Surface;
pub use view::Camera;

/// Color of the debug pointer crosshair.
const POINTER_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Whether the host should schedule another frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Run `tick` again on the next animation frame.
    Next,
    /// The canvas was stopped; do not schedule further frames.
    Stopped,
}

/// What happened during one frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Events since the previous frame, in order.
    pub events: Vec<CanvasEvent>,
    pub stats: DrawStats,
    /// Cursor the host should show until the next frame.
    pub cursor: CursorHint,
    pub schedule: Schedule,
}

type Listener = Box<dyn FnMut(Option<&ElementRef>)>;

/// The main entry point for the library: one interactive view.
///
/// The `Canvas` holds the camera, pointer state, scene and configuration of a
/// single view. Independent views are independent `Canvas` values. The host
/// forwards pointer events with [`Canvas::handle_pointer`] and calls
/// [`Canvas::tick`] once per animation frame, never concurrently.
pub struct Canvas {
    /// The pan/zoom camera.
    pub camera: Camera,
    /// Pointer state accumulated from host events.
    pub pointer: PointerState,
    /// The nodes and edges on display.
    pub scene: Scene,
    /// Current interaction mode.
    pub interaction_mode: InteractionMode,
    config: CanvasConfig,
    viewport_size: Vec2,
    surface_origin: Vec2,
    background: BackgroundPainter,
    on_select: Option<Listener>,
    on_hover: Option<Listener>,
    pending_events: Vec<CanvasEvent>,
    last_hover: Option<ElementRef>,
    running: bool,
}

impl Canvas {
    /// Creates a new Canvas with the given configuration and an empty scene.
    ///
    /// Fails with [`CanvasError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn new(config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        let background = config.background.painter();
        Ok(Self {
            config,
            camera: Camera::default(),
            pointer: PointerState::default(),
            scene: Scene::new(),
            interaction_mode: InteractionMode::Idle,
            viewport_size: Vec2::new(800.0, 600.0), // Default 800x600, user should update
            surface_origin: Vec2::ZERO,
            background,
            on_select: None,
            on_hover: None,
            pending_events: Vec::new(),
            last_hover: None,
            running: true,
        })
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Edits the configuration in place.
    ///
    /// The edited copy is validated first; on error the current configuration
    /// is kept. The background painter is rebuilt from the result.
    pub fn update_config(&mut self, edit: impl FnOnce(&mut CanvasConfig)) -> Result<()> {
        let mut config = self.config.clone();
        edit(&mut config);
        config.validate()?;
        self.background = config.background.painter();
        self.config = config;
        tracing::debug!("Canvas configuration updated");
        Ok(())
    }

    /// Updates the viewport size (e.g., on window resize).
    ///
    /// The surface is brought to this size at the start of the next frame.
    pub fn update_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    /// Sets where the drawing surface sits in the host's pointer coordinate
    /// space (its bounding box top-left).
    pub fn set_surface_origin(&mut self, origin: Vec2) {
        self.surface_origin = origin;
    }

    /// Replaces the background and its draw routine.
    pub fn set_background(&mut self, background: Background) -> Result<()> {
        background.validate()?;
        self.background = background.painter();
        self.config.background = background;
        Ok(())
    }

    /// Registers the selection listener. It receives the selected element, or
    /// `None` when the selection is cleared.
    pub fn on_select(&mut self, listener: impl FnMut(Option<&ElementRef>) + 'static) {
        self.on_select = Some(Box::new(listener));
    }

    /// Registers the hover listener. It receives the hovered element, or
    /// `None` when the pointer leaves every element.
    pub fn on_hover(&mut self, listener: impl FnMut(Option<&ElementRef>) + 'static) {
        self.on_hover = Some(Box::new(listener));
    }

    /// Replaces the scene's nodes (and drops its edges).
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> Result<()> {
        self.scene.set_nodes(nodes)?;
        self.interaction_mode = InteractionMode::Idle;
        self.request_redraw();
        Ok(())
    }

    /// Replaces the scene's edges.
    pub fn set_edges(&mut self, edges: Vec<Edge>) -> Result<()> {
        self.scene.set_edges(edges)?;
        self.request_redraw();
        Ok(())
    }

    /// Asks for another frame. Restarts a stopped canvas.
    ///
    /// Returns `true` if the canvas was stopped, meaning the host has to
    /// schedule a tick itself.
    pub fn request_redraw(&mut self) -> bool {
        let was_stopped = !self.running;
        self.running = true;
        was_stopped
    }

    /// Stops the frame loop: the next tick reports [`Schedule::Stopped`].
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_panning(&self) -> bool {
        self.interaction_mode == InteractionMode::Panning
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction_mode, InteractionMode::Dragging { .. })
    }

    /// Folds a host pointer event into the pointer state.
    ///
    /// A press also resolves selection against whatever the previous frame
    /// found under the pointer.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pointer.apply(&event, self.surface_origin);

        if event.kind == PointerEventKind::Down
            && let Some(selected) = interaction::select_on_press(&mut self.scene)
        {
            if let Some(listener) = self.on_select.as_mut() {
                listener(selected.as_ref());
            }
            self.pending_events
                .push(CanvasEvent::SelectionChanged(selected));
        }
    }

    /// Runs one frame.
    ///
    /// 1. Reset transform, alpha and hover.
    /// 2. Resize the surface if the viewport changed, otherwise clear it.
    /// 3. Apply one step of pending wheel zoom.
    /// 4. Advance the pan/drag state machine.
    /// 5. Draw background, edges and nodes, resolving hover on the way.
    /// 6. Report whether to schedule the next frame.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> FrameReport {
        let mut events = std::mem::take(&mut self.pending_events);

        // 1. Reset
        surface.reset_transform();
        surface.set_global_alpha(1.0);
        self.scene.clear_hover();

        // 2. Surface bounds
        if surface.size() != self.viewport_size {
            tracing::debug!(from = ?surface.size(), to = ?self.viewport_size, "Resizing surface");
            surface.resize(self.viewport_size);
        } else {
            surface.clear();
        }

        // 3. Zoom
        interaction::apply_wheel_zoom(&mut self.camera, &mut self.pointer, &self.config, &mut events);

        // 4. Pan / drag
        interaction::resolve_pan_drag(
            &mut self.interaction_mode,
            &mut self.camera,
            &mut self.pointer,
            &mut self.scene,
            &mut events,
        );

        // 5. Render
        (self.background)(&self.camera, self.viewport_size, &mut *surface);
        self.camera.apply_to(surface);
        let stats = Painter::draw_scene(
            surface,
            &self.camera,
            self.viewport_size,
            &self.config,
            &mut self.scene,
            self.pointer.position,
        );
        surface.reset_transform();
        if self.config.show_pointer {
            Painter::draw_pointer(surface, &self.camera, self.pointer.position, POINTER_COLOR);
        }

        let hovered = self.scene.hovered();
        let cursor =
            CursorHint::resolve(self.interaction_mode, &self.scene, self.config.show_pointer);
        if hovered != self.last_hover {
            if let Some(listener) = self.on_hover.as_mut() {
                listener(hovered.as_ref());
            }
            events.push(CanvasEvent::HoverChanged(hovered.clone()));
            self.last_hover = hovered;
        }

        // 6. Schedule
        let schedule = if self.running {
            Schedule::Next
        } else {
            Schedule::Stopped
        };

        FrameReport {
            events,
            stats,
            cursor,
            schedule,
        }
    }
}
