//! # Input Protocol
//!
//! This module defines the pointer events the host forwards to the Canvas and
//! the pointer state they accumulate into between frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What happened to the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerEventKind {
    /// The primary button was pressed.
    Down,
    /// The primary button was released.
    Up,
    /// The pointer moved.
    Move,
    /// The wheel turned. Positive `delta_y` scrolls down (zooms out).
    Wheel { delta_y: f32 },
}

/// A pointer event as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Pointer position relative to the host viewport (pixels).
    pub client: Vec2,
}

impl PointerEvent {
    pub fn down(client: Vec2) -> Self {
        Self {
            kind: PointerEventKind::Down,
            client,
        }
    }

    pub fn up(client: Vec2) -> Self {
        Self {
            kind: PointerEventKind::Up,
            client,
        }
    }

    pub fn moved(client: Vec2) -> Self {
        Self {
            kind: PointerEventKind::Move,
            client,
        }
    }

    pub fn wheel(client: Vec2, delta_y: f32) -> Self {
        Self {
            kind: PointerEventKind::Wheel { delta_y },
            client,
        }
    }
}

/// Pointer state shared between input events and the frame pipeline.
///
/// Events only ever add to it; the frame pipeline consumes the wheel and
/// the drag anchor once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    /// Current position in Screen Space, relative to the surface's top-left.
    pub position: Vec2,
    /// Last position as reported by the host, before normalisation.
    pub client: Vec2,
    /// Accumulated wheel movement. Positive zooms in.
    pub wheel: f32,
    /// Position at the previous pan/drag step.
    pub last: Vec2,
    /// Whether the primary button is held.
    pub button_down: bool,
}

impl PointerState {
    /// Folds a host event into the state.
    ///
    /// `surface_origin` is the top-left of the drawing surface in the same
    /// coordinate space as `event.client`.
    pub fn apply(&mut self, event: &PointerEvent, surface_origin: Vec2) {
        self.client = event.client;
        self.position = event.client - surface_origin;
        match event.kind {
            PointerEventKind::Down => self.button_down = true,
            PointerEventKind::Up => self.button_down = false,
            PointerEventKind::Move => {}
            PointerEventKind::Wheel { delta_y } => self.wheel += -delta_y,
        }
    }

    /// Takes one tick of wheel input.
    ///
    /// Returns the sign of the pending wheel movement (if any) and decays the
    /// accumulator by `decay`, snapping it to zero once its magnitude drops
    /// below `snap`. The accumulator never changes sign.
    pub fn take_wheel_tick(&mut self, decay: f32, snap: f32) -> Option<f32> {
        if self.wheel == 0.0 {
            return None;
        }
        let sign = self.wheel.signum();
        self.wheel *= decay;
        if self.wheel.abs() < snap {
            self.wheel = 0.0;
        }
        Some(sign)
    }

    /// Screen-space movement since the last pan/drag step, resetting the anchor.
    pub fn take_delta(&mut self) -> Vec2 {
        let delta = self.position - self.last;
        self.last = self.position;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_made_relative_to_the_surface() {
        let mut pointer = PointerState::default();
        pointer.apply(&PointerEvent::moved(Vec2::new(130.0, 90.0)), Vec2::new(30.0, 40.0));
        assert_eq!(pointer.position, Vec2::new(100.0, 50.0));
        assert_eq!(pointer.client, Vec2::new(130.0, 90.0));
    }

    #[test]
    fn wheel_accumulates_inverted_delta() {
        let mut pointer = PointerState::default();
        pointer.apply(&PointerEvent::wheel(Vec2::ZERO, 30.0), Vec2::ZERO);
        pointer.apply(&PointerEvent::wheel(Vec2::ZERO, 20.0), Vec2::ZERO);
        assert_eq!(pointer.wheel, -50.0);
    }

    #[test]
    fn button_follows_down_and_up() {
        let mut pointer = PointerState::default();
        pointer.apply(&PointerEvent::down(Vec2::ZERO), Vec2::ZERO);
        assert!(pointer.button_down);
        pointer.apply(&PointerEvent::up(Vec2::ZERO), Vec2::ZERO);
        assert!(!pointer.button_down);
    }
}
