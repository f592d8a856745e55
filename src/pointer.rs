//! Pointer state consumed by the bubble effect.
//!
//! [`Pointer`] records where the cursor hovers, where and when the last
//! press started, and a tri-state [`PointerStatus`]. The host feeds it either
//! directly (`move_to`, `press`, `release`, `leave`) or by forwarding winit
//! window events:
//!
//! ```ignore
//! fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
//!     self.pointer.handle_event(&event, self.time.now());
//! }
//! ```
//!
//! Pointer state only changes between frames, never during one.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

/// What the pointer is doing relative to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerStatus {
    /// No pointer activity seen yet.
    #[default]
    Idle,
    /// The pointer is over the surface.
    Move,
    /// The pointer left the surface.
    Leave,
}

/// Hover and press state of the pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pointer {
    hover_position: Option<Vec2>,
    press_position: Option<Vec2>,
    press_started_at: Option<f32>,
    held: bool,
    status: PointerStatus,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Queries ==========

    /// Current cursor position, if the pointer is over the surface.
    pub fn hover_position(&self) -> Option<Vec2> {
        self.hover_position
    }

    /// Where the most recent press started.
    pub fn press_position(&self) -> Option<Vec2> {
        self.press_position
    }

    /// When the most recent press started (simulation seconds).
    pub fn press_started_at(&self) -> Option<f32> {
        self.press_started_at
    }

    pub fn status(&self) -> PointerStatus {
        self.status
    }

    pub fn is_hovering(&self) -> bool {
        self.status == PointerStatus::Move && self.hover_position.is_some()
    }

    /// Whether the primary button is held down.
    pub fn is_pressed(&self) -> bool {
        self.held
    }

    // ========== Updates ==========

    /// The cursor moved to `position`.
    pub fn move_to(&mut self, position: Vec2) {
        self.hover_position = Some(position);
        self.status = PointerStatus::Move;
    }

    /// The primary button went down at the current cursor position.
    pub fn press(&mut self, now: f32) {
        if self.held {
            return;
        }
        self.held = true;
        self.press_position = self.hover_position;
        self.press_started_at = Some(now);
    }

    /// The primary button went up. The press timestamp is kept so press
    /// effects can finish their pulse.
    pub fn release(&mut self) {
        self.held = false;
    }

    /// The cursor left the surface.
    pub fn leave(&mut self) {
        self.hover_position = None;
        self.status = PointerStatus::Leave;
    }

    /// Process a winit window event. Only the left button counts as a press.
    pub fn handle_event(&mut self, event: &WindowEvent, now: f32) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => self.leave(),

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.press(now),
                ElementState::Released => self.release(),
            },

            WindowEvent::Touch(touch) => {
                let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => {
                        self.move_to(pos);
                        self.press(now);
                    }
                    TouchPhase::Moved => self.move_to(pos),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.release();
                        self.leave();
                    }
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_idle() {
        let pointer = Pointer::new();
        assert_eq!(pointer.status(), PointerStatus::Idle);
        assert!(!pointer.is_hovering());
        assert!(pointer.hover_position().is_none());
        assert!(pointer.press_started_at().is_none());
    }

    #[test]
    fn test_press_records_position_and_time() {
        let mut pointer = Pointer::new();
        pointer.move_to(Vec2::new(10.0, 20.0));
        pointer.press(1.5);

        assert!(pointer.is_pressed());
        assert_eq!(pointer.press_position(), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(pointer.press_started_at(), Some(1.5));

        // Holding doesn't restart the press
        pointer.move_to(Vec2::new(50.0, 50.0));
        pointer.press(2.0);
        assert_eq!(pointer.press_started_at(), Some(1.5));

        pointer.release();
        assert!(!pointer.is_pressed());
        assert_eq!(pointer.press_started_at(), Some(1.5));

        pointer.press(3.0);
        assert_eq!(pointer.press_position(), Some(Vec2::new(50.0, 50.0)));
        assert_eq!(pointer.press_started_at(), Some(3.0));
    }

    #[test]
    fn test_leave_clears_hover() {
        let mut pointer = Pointer::new();
        pointer.move_to(Vec2::new(1.0, 1.0));
        assert!(pointer.is_hovering());

        pointer.leave();
        assert_eq!(pointer.status(), PointerStatus::Leave);
        assert!(pointer.hover_position().is_none());
        assert!(!pointer.is_hovering());

        pointer.move_to(Vec2::new(2.0, 2.0));
        assert_eq!(pointer.status(), PointerStatus::Move);
    }

    #[test]
    fn test_press_without_cursor_has_no_position() {
        let mut pointer = Pointer::new();
        pointer.press(0.0);
        assert!(pointer.press_position().is_none());
        assert_eq!(pointer.press_started_at(), Some(0.0));
    }
}
