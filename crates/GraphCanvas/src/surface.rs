//! # Drawing Surface Protocol
//!
//! The canvas never draws pixels itself. It talks to an immediate-mode 2D
//! backend through the [`Surface`] trait, in the same vocabulary as an HTML
//! canvas context: build a path, stroke or fill it, and ask whether a point
//! lies inside the path or on its stroke.
//!
//! Path coordinates are interpreted through the active transform at the time
//! they are added. Hit-test points are always in **Screen Space** (pixels).

use glam::{Affine2, Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// Horizontal anchoring of text relative to the `fill_text` position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    #[default]
    Center,
}

/// Vertical anchoring of text relative to the `fill_text` position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Alphabetic,
    Bottom,
}

/// An immediate-mode 2D drawing backend.
///
/// The trait is object safe; the canvas only ever holds `&mut dyn Surface`.
pub trait Surface {
    // --- Path construction ---

    /// Discards the current path and starts a new one.
    fn begin_path(&mut self);
    /// Starts a new sub-path at `p`.
    fn move_to(&mut self, p: Vec2);
    /// Adds a straight segment from the current point to `p`.
    fn line_to(&mut self, p: Vec2);
    /// Adds a closed axis-aligned rectangle sub-path.
    fn rect(&mut self, pos: Vec2, size: Vec2);
    /// Adds a circular arc around `center`, angles in radians.
    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32);
    /// Closes the current sub-path.
    fn close_path(&mut self);

    // --- Paint ---

    fn set_line_width(&mut self, width: f32);
    fn set_stroke_color(&mut self, color: Vec4);
    fn set_fill_color(&mut self, color: Vec4);
    /// Strokes the current path with the current line width and stroke color.
    fn stroke(&mut self);
    /// Fills the current path with the current fill color.
    fn fill(&mut self);
    fn set_global_alpha(&mut self, alpha: f32);

    // --- Transform ---

    /// Replaces the active transform.
    fn set_transform(&mut self, transform: Affine2);

    /// Resets the active transform to identity.
    fn reset_transform(&mut self) {
        self.set_transform(Affine2::IDENTITY);
    }

    // --- Text ---

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn fill_text(&mut self, text: &str, pos: Vec2);
    /// Width of `text` in the current font, in untransformed units.
    fn measure_text(&self, text: &str) -> f32;

    // --- Hit testing ---

    /// Whether the screen-space point lies inside the current path.
    fn is_point_in_path(&self, screen: Vec2) -> bool;
    /// Whether the screen-space point lies on the current path's stroke.
    fn is_point_in_stroke(&self, screen: Vec2) -> bool;

    // --- Backing store ---

    /// Logical size of the backing store in pixels.
    fn size(&self) -> Vec2;
    /// Resizes the backing store. Resizing implicitly clears it.
    fn resize(&mut self, size: Vec2);
    /// Clears every pixel of the backing store.
    fn clear(&mut self);
}
