//! # Recording Surface
//!
//! A headless [`Surface`] that draws nothing. It keeps a display list of
//! `DrawCommand`s for the frame and answers hit tests geometrically, which is
//! what tests and headless hosts need.
//!
//! All recorded coordinates are in **Screen Space** (pixels): path points are
//! pushed through the active transform as they are added, exactly as a canvas
//! context does.

use glam::{Affine2, Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::math;
use crate::surface::{Surface, TextAlign, TextBaseline};

/// Segments used to approximate a partial arc.
const ARC_SEGMENTS: usize = 24;

/// A sub-path in screen space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SubPath {
    /// Connected points; closed sub-paths join the last point to the first.
    Polyline { points: Vec<Vec2>, closed: bool },
    /// A full circle.
    Circle { center: Vec2, radius: f32 },
}

impl SubPath {
    fn contains(&self, p: Vec2) -> bool {
        match self {
            SubPath::Circle { center, radius } => p.distance_squared(*center) <= radius * radius,
            SubPath::Polyline { points, .. } => polygon_contains(points, p),
        }
    }

    fn stroke_distance(&self, p: Vec2) -> f32 {
        match self {
            SubPath::Circle { center, radius } => (p.distance(*center) - radius).abs(),
            SubPath::Polyline { points, closed } => {
                let mut best = f32::INFINITY;
                for pair in points.windows(2) {
                    best = best.min(math::distance_to_segment(p, pair[0], pair[1]));
                }
                if *closed && points.len() > 2 {
                    let (first, last) = (points[0], points[points.len() - 1]);
                    best = best.min(math::distance_to_segment(p, last, first));
                }
                if points.len() == 1 {
                    best = p.distance(points[0]);
                }
                best
            }
        }
    }
}

/// Even-odd point-in-polygon test.
fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A single recorded drawing primitive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// The backing store was resized (and so cleared).
    Resize { size: Vec2 },
    /// The backing store was cleared.
    Clear,
    /// A path was filled.
    Fill {
        path: Vec<SubPath>,
        color: Vec4,
        alpha: f32,
    },
    /// A path was stroked.
    Stroke {
        path: Vec<SubPath>,
        color: Vec4,
        /// Width in screen pixels.
        width: f32,
        alpha: f32,
    },
    /// Text was drawn.
    Text {
        text: String,
        /// Anchor position in screen pixels.
        pos: Vec2,
        font: String,
        color: Vec4,
        align: TextAlign,
        baseline: TextBaseline,
    },
}

/// A list of draw commands representing the current frame.
pub type RenderList = Vec<DrawCommand>;

/// The recording backend.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: Vec2,
    transform: Affine2,
    alpha: f32,
    line_width: f32,
    stroke_color: Vec4,
    fill_color: Vec4,
    font: String,
    align: TextAlign,
    baseline: TextBaseline,
    path: Vec<SubPath>,
    /// Commands recorded since the last resize or clear.
    pub commands: RenderList,
}

impl RecordingSurface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            line_width: 1.0,
            stroke_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            fill_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            font: "10px sans-serif".to_string(),
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
            path: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    /// Every `Fill` command, in draw order.
    pub fn fills(&self) -> impl Iterator<Item = (&[SubPath], Vec4)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Fill { path, color, .. } => Some((path.as_slice(), *color)),
            _ => None,
        })
    }

    /// Every `Stroke` command, in draw order.
    pub fn strokes(&self) -> impl Iterator<Item = (&[SubPath], Vec4, f32)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Stroke {
                path, color, width, ..
            } => Some((path.as_slice(), *color, *width)),
            _ => None,
        })
    }

    /// Every piece of text drawn, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Uniform scale of the active transform.
    fn scale(&self) -> f32 {
        self.transform.matrix2.x_axis.length()
    }

    fn current_polyline(&mut self) -> Option<&mut Vec<Vec2>> {
        match self.path.last_mut() {
            Some(SubPath::Polyline {
                points,
                closed: false,
            }) => Some(points),
            _ => None,
        }
    }

    /// Font size in pixels, read from a CSS-like font string ("12px serif").
    fn font_px(&self) -> f32 {
        self.font
            .split_whitespace()
            .find_map(|token| token.strip_suffix("px")?.parse::<f32>().ok())
            .unwrap_or(10.0)
    }
}

impl Surface for RecordingSurface {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, p: Vec2) {
        let p = self.transform.transform_point2(p);
        self.path.push(SubPath::Polyline {
            points: vec![p],
            closed: false,
        });
    }

    fn line_to(&mut self, p: Vec2) {
        let p = self.transform.transform_point2(p);
        match self.current_polyline() {
            Some(points) => points.push(p),
            None => self.path.push(SubPath::Polyline {
                points: vec![p],
                closed: false,
            }),
        }
    }

    fn rect(&mut self, pos: Vec2, size: Vec2) {
        let corners = [
            pos,
            pos + Vec2::new(size.x, 0.0),
            pos + size,
            pos + Vec2::new(0.0, size.y),
        ];
        let points = corners
            .iter()
            .map(|&c| self.transform.transform_point2(c))
            .collect();
        self.path.push(SubPath::Polyline {
            points,
            closed: true,
        });
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32) {
        let sweep = end_angle - start_angle;
        if sweep.abs() >= std::f32::consts::TAU {
            // A lone move_to before a full circle only positions the pen.
            let lone_pen = matches!(
                self.path.last(),
                Some(SubPath::Polyline { points, closed: false }) if points.len() == 1
            );
            if lone_pen {
                self.path.pop();
            }
            self.path.push(SubPath::Circle {
                center: self.transform.transform_point2(center),
                radius: radius * self.scale(),
            });
            return;
        }
        for step in 0..=ARC_SEGMENTS {
            let angle = start_angle + sweep * step as f32 / ARC_SEGMENTS as f32;
            self.line_to(center + Vec2::new(angle.cos(), angle.sin()) * radius);
        }
    }

    fn close_path(&mut self) {
        if let Some(SubPath::Polyline { closed, .. }) = self.path.last_mut() {
            *closed = true;
        }
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn set_stroke_color(&mut self, color: Vec4) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Vec4) {
        self.fill_color = color;
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke {
            path: self.path.clone(),
            color: self.stroke_color,
            width: self.line_width * self.scale(),
            alpha: self.alpha,
        });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill {
            path: self.path.clone(),
            color: self.fill_color,
            alpha: self.alpha,
        });
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
    }

    fn set_font(&mut self, font: &str) {
        self.font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.baseline = baseline;
    }

    fn fill_text(&mut self, text: &str, pos: Vec2) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos: self.transform.transform_point2(pos),
            font: self.font.clone(),
            color: self.fill_color,
            align: self.align,
            baseline: self.baseline,
        });
    }

    /// Every glyph is taken to be half the font size wide.
    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.font_px() * 0.5
    }

    fn is_point_in_path(&self, screen: Vec2) -> bool {
        self.path.iter().any(|sub| sub.contains(screen))
    }

    fn is_point_in_stroke(&self, screen: Vec2) -> bool {
        let half_width = self.line_width * self.scale() * 0.5;
        self.path
            .iter()
            .any(|sub| sub.stroke_distance(screen) <= half_width)
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
        self.commands.clear();
        self.commands.push(DrawCommand::Resize { size });
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }
}
