//! # Background
//!
//! The background kind is chosen once, when the canvas is configured, and
//! turned into a painter closure. Frames call the closure without looking at
//! the kind again.

use glam::{DVec2, Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};
use crate::view::Camera;
use crate::surface::Surface;

/// Grid cell size: screen pixels for adaptive grids, world units for fixed ones.
pub const GRID_SIZE: f32 = 128.0;
/// Maximum number of cells a fixed grid spans.
pub const GRID_LIMIT: u32 = 64;
/// Closest two dots may get on screen before the lattice is thinned out.
const MIN_DOT_SPACING: f32 = 8.0;

/// What is painted behind the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Background {
    /// A flat color.
    Solid { color: Vec4 },
    /// A lattice of dots every `gap` world units.
    Dots {
        /// Dot diameter in screen pixels.
        line_width: f32,
        gap: f32,
        color: Vec4,
    },
    /// Grid lines.
    Grid {
        cell_size: f32,
        /// Cell count cap for fixed grids.
        limit: u32,
        /// Keep the on-screen cell size roughly constant across zoom levels.
        adaptive: bool,
        stroke_color: Vec4,
    },
}

impl Default for Background {
    fn default() -> Self {
        Background::Grid {
            cell_size: GRID_SIZE,
            limit: GRID_LIMIT,
            adaptive: true,
            stroke_color: Vec4::new(0.2, 0.2, 0.2, 1.0),
        }
    }
}

/// Paints a background for the given camera and viewport size.
pub type BackgroundPainter = Box<dyn Fn(&Camera, Vec2, &mut dyn Surface)>;

impl Background {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Background::Solid { .. } => Ok(()),
            Background::Dots { line_width, gap, .. } => {
                if line_width > 0.0 && gap > 0.0 && gap.is_finite() {
                    Ok(())
                } else {
                    Err(CanvasError::InvalidConfig(format!(
                        "dots need a positive line_width and gap, got {line_width} and {gap}"
                    )))
                }
            }
            Background::Grid {
                cell_size, limit, ..
            } => {
                if cell_size > 0.0 && cell_size.is_finite() && limit > 0 {
                    Ok(())
                } else {
                    Err(CanvasError::InvalidConfig(format!(
                        "grid needs a positive cell_size and limit, got {cell_size} and {limit}"
                    )))
                }
            }
        }
    }

    /// Selects the draw routine for this background.
    pub fn painter(&self) -> BackgroundPainter {
        match *self {
            Background::Solid { color } => {
                Box::new(move |_camera, viewport, surface| draw_solid(color, viewport, surface))
            }
            Background::Dots {
                line_width,
                gap,
                color,
            } => Box::new(move |camera, viewport, surface| {
                draw_dots(line_width, gap, color, camera, viewport, surface)
            }),
            Background::Grid {
                cell_size,
                limit,
                adaptive,
                stroke_color,
            } => {
                let grid = GridSpec {
                    cell_size,
                    limit,
                    adaptive,
                    stroke_color,
                };
                Box::new(move |camera, viewport, surface| grid.draw(camera, viewport, surface))
            }
        }
    }
}

fn draw_solid(color: Vec4, viewport: Vec2, surface: &mut dyn Surface) {
    surface.reset_transform();
    surface.set_fill_color(color);
    surface.begin_path();
    surface.rect(Vec2::ZERO, viewport);
    surface.fill();
}

fn draw_dots(
    line_width: f32,
    gap: f32,
    color: Vec4,
    camera: &Camera,
    viewport: Vec2,
    surface: &mut dyn Surface,
) {
    let mut gap = gap as f64;
    if !(gap > 0.0 && gap.is_finite()) {
        tracing::warn!(gap, "Dots background needs a positive gap, skipped");
        return;
    }
    let min_spacing = MIN_DOT_SPACING.max(line_width * 2.0) as f64;
    while gap * camera.scale < min_spacing {
        gap *= 2.0;
    }

    let (min, max) = camera.visible_world_rect(viewport);
    let origin = (min / gap).floor() * gap;
    let columns = ((max.x - min.x) / gap).ceil() as u32 + 1;
    let rows = ((max.y - min.y) / gap).ceil() as u32 + 1;
    let radius = line_width * 0.5;

    surface.reset_transform();
    surface.set_fill_color(color);
    surface.begin_path();
    for row in 0..rows {
        for column in 0..columns {
            let world = origin + DVec2::new(column as f64, row as f64) * gap;
            let center = camera.to_screen(world).as_vec2();
            surface.move_to(center + Vec2::new(radius, 0.0));
            surface.arc(center, radius, 0.0, std::f32::consts::TAU);
        }
    }
    surface.fill();
    tracing::trace!(columns, rows, gap, "Dots background drawn");
}

#[derive(Clone, Copy, Debug)]
struct GridSpec {
    cell_size: f32,
    limit: u32,
    adaptive: bool,
    stroke_color: Vec4,
}

impl GridSpec {
    /// World-space distance between grid lines at the given scale.
    ///
    /// Adaptive grids snap to a power of two so lines stay roughly
    /// `cell_size` pixels apart on screen.
    fn world_cell(&self, scale: f64) -> f64 {
        if self.adaptive {
            2f64.powi((self.cell_size as f64 / scale).log2().floor() as i32)
        } else {
            self.cell_size as f64
        }
    }

    /// Number of lines in each direction.
    fn line_count(&self, camera: &Camera, viewport: Vec2) -> u32 {
        let cell = self.world_cell(camera.scale);
        let mut span = viewport.max_element() as f64 / camera.scale + cell * 2.0;
        if !self.adaptive && span / cell > self.limit as f64 {
            span = cell * self.limit as f64;
        }
        (span / cell).ceil() as u32
    }

    fn draw(&self, camera: &Camera, viewport: Vec2, surface: &mut dyn Surface) {
        let cell = self.world_cell(camera.scale);
        if !(cell.is_finite() && cell > 0.0) {
            return;
        }
        let lines = self.line_count(camera, viewport);
        let span = lines as f64 * cell;
        let origin = (camera.to_world(DVec2::ZERO) / cell).floor() * cell;
        let screen = |world: DVec2| camera.to_screen(world).as_vec2();

        // Lines are placed in screen space so they stay one pixel wide.
        surface.reset_transform();
        surface.set_line_width(1.0);
        surface.set_stroke_color(self.stroke_color);
        surface.begin_path();
        for n in 0..lines {
            let offset = n as f64 * cell;
            surface.move_to(screen(origin + DVec2::new(offset, 0.0)));
            surface.line_to(screen(origin + DVec2::new(offset, span)));
            surface.move_to(screen(origin + DVec2::new(0.0, offset)));
            surface.line_to(screen(origin + DVec2::new(span, offset)));
        }
        surface.stroke();
        tracing::trace!(lines, cell, "Grid background drawn");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};

    fn grid(adaptive: bool) -> GridSpec {
        GridSpec {
            cell_size: GRID_SIZE,
            limit: GRID_LIMIT,
            adaptive,
            stroke_color: Vec4::ONE,
        }
    }

    #[test]
    fn adaptive_cell_is_a_power_of_two() {
        let adaptive = grid(true);
        assert_eq!(adaptive.world_cell(1.0), 128.0);
        assert_eq!(adaptive.world_cell(2.0), 64.0);
        assert_eq!(adaptive.world_cell(3.0), 32.0);
        assert_eq!(adaptive.world_cell(0.5), 256.0);
    }

    #[test]
    fn fixed_grid_is_capped_at_limit() {
        let fixed = grid(false);
        let camera = Camera::new(DVec2::ZERO, 0.01);
        assert_eq!(fixed.line_count(&camera, Vec2::new(800.0, 600.0)), GRID_LIMIT);
    }

    #[test]
    fn invalid_backgrounds_are_rejected() {
        let dots = Background::Dots {
            line_width: 1.0,
            gap: 0.0,
            color: Vec4::ONE,
        };
        assert!(dots.validate().is_err());
        assert!(Background::default().validate().is_ok());
    }

    #[test]
    fn dots_with_zero_gap_draw_nothing() {
        let painter = Background::Dots {
            line_width: 1.0,
            gap: 0.0,
            color: Vec4::ONE,
        }
        .painter();
        let mut surface = RecordingSurface::new(Vec2::ZERO);
        painter(&Camera::default(), Vec2::new(800.0, 600.0), &mut surface);
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn dots_stay_bounded_when_zoomed_far_out() {
        let painter = Background::Dots {
            line_width: 1.0,
            gap: 16.0,
            color: Vec4::ONE,
        }
        .painter();
        let mut surface = RecordingSurface::new(Vec2::ZERO);
        let camera = Camera::new(DVec2::new(400.0, 300.0), 1e-200);
        painter(&camera, Vec2::new(800.0, 600.0), &mut surface);

        let dots = match surface.commands.as_slice() {
            [DrawCommand::Fill { path, .. }] => path.len(),
            other => panic!("Expected a single fill, got {other:?}"),
        };
        assert!(dots > 0 && dots < 10_000);
    }
}
