//! # Configuration
//!
//! This module defines the configuration struct for the Canvas.

use serde::{Deserialize, Serialize};

use crate::background::Background;
use crate::error::{CanvasError, Result};
use crate::model::{EdgeShape, EdgeStyle, NodeStyle, StyleSet};

/// Multiplicative zoom step applied per frame while wheel input is pending.
pub const SCALE_RATE: f32 = 1.02;

/// Optional bounds on the camera scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl ZoomLimits {
    /// Shrinks `factor` so that `scale * factor` stays within the limits.
    pub fn clamp_factor(&self, scale: f64, factor: f64) -> f64 {
        (scale * factor).clamp(self.min as f64, self.max as f64) / scale
    }
}

/// Configuration parameters for the Canvas.
///
/// These settings allow the host application to tune the feel of the canvas
/// interactions and the default look of the scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Zoom step per frame. Default: 1.02.
    pub scale_rate: f32,
    /// Per-frame multiplier applied to the wheel accumulator. Default: 0.8.
    pub wheel_decay: f32,
    /// Wheel magnitude below which the accumulator snaps to zero. Default: 1.0.
    pub wheel_snap: f32,
    /// Scale bounds. Default: unbounded.
    pub zoom_limits: Option<ZoomLimits>,
    /// What to paint behind the scene.
    pub background: Background,
    /// Style for nodes without their own.
    pub node_style: StyleSet<NodeStyle>,
    /// Style for edges without their own.
    pub edge_style: StyleSet<EdgeStyle>,
    /// Arrow sizing for edges without their own.
    pub edge_shape: EdgeShape,
    /// Draw edges on top of nodes instead of behind them.
    pub edges_above_nodes: bool,
    /// Draw a crosshair at the pointer's world position.
    pub show_pointer: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            scale_rate: SCALE_RATE,
            wheel_decay: 0.8,
            wheel_snap: 1.0,
            zoom_limits: None,
            background: Background::default(),
            node_style: StyleSet::default(),
            edge_style: StyleSet::default(),
            edge_shape: EdgeShape::default(),
            edges_above_nodes: false,
            show_pointer: false,
        }
    }
}

impl CanvasConfig {
    /// Parses and validates a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values the frame pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_rate.is_finite() && self.scale_rate > 1.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "scale_rate must be greater than 1, got {}",
                self.scale_rate
            )));
        }
        if !(self.wheel_decay > 0.0 && self.wheel_decay < 1.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "wheel_decay must lie in (0, 1), got {}",
                self.wheel_decay
            )));
        }
        if !(self.wheel_snap > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "wheel_snap must be positive, got {}",
                self.wheel_snap
            )));
        }
        if let Some(limits) = self.zoom_limits
            && !(limits.min > 0.0 && limits.min <= limits.max)
        {
            return Err(CanvasError::InvalidConfig(format!(
                "zoom limits must satisfy 0 < min <= max, got {}..{}",
                limits.min, limits.max
            )));
        }
        self.background.validate()
    }
}
