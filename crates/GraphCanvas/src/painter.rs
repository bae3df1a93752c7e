use std::borrow::Cow;
use std::f32::consts::TAU;

use glam::{Vec2, Vec4};

use crate::config::CanvasConfig;
use crate::math::{self, Rect};
use crate::model::{EdgeKey, ElementState, Label, NodeKey, Scene, Shape};
use crate::surface::Surface;
use crate::view::Camera;

/// Half-length of the pointer crosshair, in world units.
const CROSSHAIR_SIZE: f32 = 10.0;

/// How much of the scene a frame actually drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub nodes_drawn: usize,
    pub nodes_culled: usize,
    pub edges_drawn: usize,
    pub edges_culled: usize,
}

/// Scene renderer.
///
/// The `Painter` turns the scene into path, paint and text calls on a
/// [`Surface`], skipping elements that are off screen. Hover is resolved while
/// drawing: each element's path is tested against the pointer right after it
/// is built, so the last element drawn under the pointer wins.
pub struct Painter;

impl Painter {
    /// Draws every edge and node and records what the pointer is over.
    ///
    /// Expects the camera transform to be active on `surface`. `pointer` is in
    /// screen space; `viewport` is the surface size in pixels.
    pub fn draw_scene(
        surface: &mut dyn Surface,
        camera: &Camera,
        viewport: Vec2,
        config: &CanvasConfig,
        scene: &mut Scene,
        pointer: Vec2,
    ) -> DrawStats {
        let mut stats = DrawStats::default();
        let visible = Rect::new(Vec2::ZERO, viewport);

        let (hovered_node, hovered_edge) = if config.edges_above_nodes {
            let node = Self::draw_nodes(surface, camera, visible, config, scene, pointer, &mut stats);
            let edge = Self::draw_edges(surface, camera, visible, config, scene, pointer, &mut stats);
            (node, edge)
        } else {
            let edge = Self::draw_edges(surface, camera, visible, config, scene, pointer, &mut stats);
            let node = Self::draw_nodes(surface, camera, visible, config, scene, pointer, &mut stats);
            (node, edge)
        };

        scene.hovered_node = hovered_node;
        scene.hovered_edge = hovered_edge;
        tracing::trace!(?stats, "Scene drawn");
        stats
    }

    fn draw_nodes(
        surface: &mut dyn Surface,
        camera: &Camera,
        visible: Rect,
        config: &CanvasConfig,
        scene: &Scene,
        pointer: Vec2,
        stats: &mut DrawStats,
    ) -> Option<NodeKey> {
        let mut hovered = None;

        for &key in scene.node_order() {
            let Some(node) = scene.nodes.get(key) else {
                continue;
            };

            let screen_bounds = camera.to_screen_rect(node.bounds());
            if !screen_bounds.intersects(&visible) {
                stats.nodes_culled += 1;
                continue;
            }

            surface.begin_path();
            match node.shape {
                Shape::Circle { radius } => surface.arc(node.position, radius, 0.0, TAU),
                Shape::Rect { width, height } => {
                    surface.rect(node.position, Vec2::new(width, height))
                }
            }

            let mut state = scene.node_state(key);
            if surface.is_point_in_path(pointer) {
                hovered = Some(key);
                state.insert(ElementState::HOVERED);
            }

            let style = node
                .style
                .as_ref()
                .unwrap_or(&config.node_style)
                .resolve(state);
            surface.set_fill_color(style.fill_color);
            surface.fill();
            surface.set_line_width(style.stroke_width);
            surface.set_stroke_color(style.stroke_color);
            surface.stroke();

            if let Some(label) = &node.label {
                draw_label(surface, label, node.center(), Some(node.shape.extent().x));
            }
            stats.nodes_drawn += 1;
        }

        hovered
    }

    fn draw_edges(
        surface: &mut dyn Surface,
        camera: &Camera,
        visible: Rect,
        config: &CanvasConfig,
        scene: &Scene,
        pointer: Vec2,
        stats: &mut DrawStats,
    ) -> Option<EdgeKey> {
        let mut hovered = None;

        for &key in scene.edge_order() {
            let Some(edge) = scene.edges.get(key) else {
                continue;
            };
            let Some((from, to)) = scene.endpoints(edge) else {
                tracing::warn!(edge = %edge.id, "Skipping edge with a missing endpoint");
                continue;
            };

            let (a, b) = (from.center(), to.center());
            let screen_bounds = camera.to_screen_rect(Rect::from_points(a, b));
            if !screen_bounds.expand(1.0).intersects(&visible) {
                stats.edges_culled += 1;
                continue;
            }

            // Stop at both node outlines, then leave room for the arrow head so
            // its tip, not the line, touches the target.
            let start = math::clip_to_shape(b, a, &from.shape);
            let tip = math::clip_to_shape(a, b, &to.shape);
            let direction = tip - start;
            let shape = edge.shape.unwrap_or(config.edge_shape);
            let body_end = tip - direction.normalize_or_zero() * shape.arrow_length;

            let styles = edge.style.as_ref().unwrap_or(&config.edge_style);
            surface.begin_path();
            surface.move_to(start);
            surface.line_to(body_end);
            surface.set_line_width(styles.default.stroke_width);

            let mut state = scene.edge_state(key);
            if surface.is_point_in_stroke(pointer) {
                hovered = Some(key);
                state.insert(ElementState::HOVERED);
            }

            let style = styles.resolve(state);
            surface.set_line_width(style.stroke_width);
            surface.set_stroke_color(style.stroke_color);
            surface.stroke();

            let [tip, left, right] =
                math::arrow_head(tip, direction, shape.arrow_length, shape.arrow_width);
            surface.begin_path();
            surface.move_to(tip);
            surface.line_to(left);
            surface.line_to(right);
            surface.close_path();
            surface.set_fill_color(style.stroke_color);
            surface.fill();

            if let Some(label) = &edge.label {
                draw_label(surface, label, (start + tip) * 0.5, None);
            }
            stats.edges_drawn += 1;
        }

        hovered
    }

    /// Draws a crosshair on the pointer's world position.
    ///
    /// The arms are `CROSSHAIR_SIZE` world units long, placed in screen space
    /// so the stroke stays one pixel wide.
    pub fn draw_pointer(surface: &mut dyn Surface, camera: &Camera, pointer: Vec2, color: Vec4) {
        let arm = (CROSSHAIR_SIZE as f64 * camera.scale) as f32;
        surface.reset_transform();
        surface.begin_path();
        surface.move_to(pointer - Vec2::new(arm, 0.0));
        surface.line_to(pointer + Vec2::new(arm, 0.0));
        surface.move_to(pointer - Vec2::new(0.0, arm));
        surface.line_to(pointer + Vec2::new(0.0, arm));
        surface.set_line_width(1.0);
        surface.set_stroke_color(color);
        surface.stroke();
    }
}

fn draw_label(surface: &mut dyn Surface, label: &Label, anchor: Vec2, max_width: Option<f32>) {
    surface.set_font(&label.font);
    surface.set_text_align(label.align);
    surface.set_text_baseline(label.baseline);
    surface.set_fill_color(label.color);

    let text = match max_width {
        Some(width) => elide(&*surface, &label.text, width),
        None => Cow::Borrowed(label.text.as_str()),
    };
    if !text.is_empty() {
        surface.fill_text(&text, anchor);
    }
}

/// Shortens `text` with a trailing ellipsis until it fits in `max_width`.
fn elide<'a>(surface: &dyn Surface, text: &'a str, max_width: f32) -> Cow<'a, str> {
    if surface.measure_text(text) <= max_width {
        return Cow::Borrowed(text);
    }
    let mut kept: Vec<char> = text.chars().collect();
    while kept.pop().is_some() {
        let candidate: String = kept.iter().chain(std::iter::once(&'…')).collect();
        if surface.measure_text(&candidate) <= max_width {
            return Cow::Owned(candidate);
        }
    }
    Cow::Owned(String::new())
}
