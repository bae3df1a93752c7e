//! # Camera
//!
//! This module handles the "infinite canvas" mathematics.
//! It provides the mapping between World Space (where nodes live) and Screen
//! Space (pixels on the drawing surface), plus the zoom-toward-cursor transform.
//!
//! The camera itself is kept in `f64`. Scene geometry and the drawing surface
//! stay `f32`; conversions widen on the way in and the results are narrowed
//! only where they meet the surface.

use glam::{Affine2, DVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::math::Rect;
use crate::surface::Surface;

/// Smallest scale the camera accepts. Any `f32` screen point still has a
/// finite world position in `f64` at this scale.
pub const MIN_SCALE: f64 = 1e-260;
/// Largest scale the camera accepts. Any `f32` world point still has a finite
/// screen position in `f64` at this scale.
pub const MAX_SCALE: f64 = 1e260;

/// Where we are looking (translation) and how close (scale).
///
/// `scale` is strictly positive and within `MIN_SCALE..=MAX_SCALE` for the
/// lifetime of the camera, so conversions in both directions are always
/// finite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen-space offset of the world origin.
    /// A positive value moves the canvas right/down.
    pub translate: DVec2,
    /// Uniform scale factor.
    /// - 1.0 = 100% scale.
    /// - Greater than 1.0 = Zoomed In.
    /// - Less than 1.0 = Zoomed Out.
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            translate: DVec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    pub fn new(translate: DVec2, scale: f64) -> Self {
        debug_assert!(
            (MIN_SCALE..=MAX_SCALE).contains(&scale),
            "camera scale must be positive and representable"
        );
        Self { translate, scale }
    }

    /// Converts a point from **Screen Space** to **World Space**.
    ///
    /// Formula: `World = (Screen - Translate) / Scale`
    pub fn to_world(&self, screen: DVec2) -> DVec2 {
        (screen - self.translate) / self.scale
    }

    /// Converts a point from **World Space** to **Screen Space**.
    ///
    /// Formula: `Screen = (World * Scale) + Translate`
    pub fn to_screen(&self, world: DVec2) -> DVec2 {
        world * self.scale + self.translate
    }

    /// Screen-space bounds of a world-space rectangle.
    pub fn to_screen_rect(&self, world: Rect) -> Rect {
        Rect::from_points(
            self.to_screen(world.min.as_dvec2()).as_vec2(),
            self.to_screen(world.max.as_dvec2()).as_vec2(),
        )
    }

    /// Multiplies the scale by `factor` while keeping the world point under
    /// `screen` fixed on screen.
    ///
    /// `factor > 1` zooms in, `factor < 1` zooms out. There are no zoom
    /// limits here; callers that want them clamp the factor first. A step that
    /// would push the scale outside `MIN_SCALE..=MAX_SCALE` is refused, and
    /// the return value says whether the camera moved.
    pub fn scale_at(&mut self, screen: DVec2, factor: f64) -> bool {
        debug_assert!(
            factor.is_finite() && factor > 0.0,
            "zoom factor must be finite and positive"
        );
        let scale = self.scale * factor;
        let translate = screen - (screen - self.translate) * factor;
        if !(MIN_SCALE..=MAX_SCALE).contains(&scale) || !translate.is_finite() {
            tracing::trace!(scale, factor, "Zoom step out of range, ignored");
            return false;
        }
        self.scale = scale;
        self.translate = translate;
        true
    }

    /// Shifts the view by a screen-space delta.
    pub fn pan(&mut self, delta: DVec2) {
        self.translate += delta;
    }

    /// The affine map from world to screen, in canvas `setTransform` order
    /// `(scale, 0, 0, scale, tx, ty)`, narrowed for the surface.
    pub fn transform(&self) -> Affine2 {
        let scale = self.scale as f32;
        let translate = self.translate.as_vec2();
        Affine2::from_cols_array(&[scale, 0.0, 0.0, scale, translate.x, translate.y])
    }

    /// Makes every following draw call on `surface` world-space.
    pub fn apply_to(&self, surface: &mut dyn Surface) {
        surface.set_transform(self.transform());
    }

    /// The world-space corners `(min, max)` covered by a viewport of
    /// `viewport` pixels.
    pub fn visible_world_rect(&self, viewport: Vec2) -> (DVec2, DVec2) {
        let a = self.to_world(DVec2::ZERO);
        let b = self.to_world(viewport.as_dvec2());
        (a.min(b), a.max(b))
    }
}
