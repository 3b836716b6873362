//! Click-versus-drag classification for a single pointer stream.
//!
//! A press followed by a release counts as a click only when nothing moved in
//! between and the press was short. Anything else is left to the orbit
//! controls as a drag.

use foundation::time::Millis;

/// Longest press, in milliseconds, that still counts as a click (exclusive).
pub const CLICK_MAX_DURATION_MS: f64 = 200.0;

/// Pointer position in CSS pixels relative to the viewport's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x_px: f64,
    pub y_px: f64,
}

impl ScreenPoint {
    pub fn new(x_px: f64, y_px: f64) -> Self {
        Self { x_px, y_px }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Press { at: Millis },
    Move,
    Release { at: Millis, position: ScreenPoint },
}

/// A qualifying click, positioned where the pointer was released.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Click {
    pub position: ScreenPoint,
    pub duration_ms: f64,
}

/// State of one press-to-release cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
struct GestureState {
    pressed_at: Millis,
    dragged: bool,
}

#[derive(Debug, Clone)]
pub struct ClickClassifier {
    max_duration_ms: f64,
    gesture: Option<GestureState>,
}

impl Default for ClickClassifier {
    fn default() -> Self {
        Self::new(CLICK_MAX_DURATION_MS)
    }
}

impl ClickClassifier {
    pub fn new(max_duration_ms: f64) -> Self {
        Self {
            max_duration_ms,
            gesture: None,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Click> {
        match event {
            PointerEvent::Press { at } => {
                self.on_press(at);
                None
            }
            PointerEvent::Move => {
                self.on_move();
                None
            }
            PointerEvent::Release { at, position } => self.on_release(at, position),
        }
    }

    /// Start a new gesture. A press while another is in flight replaces it.
    pub fn on_press(&mut self, at: Millis) {
        self.gesture = Some(GestureState {
            pressed_at: at,
            dragged: false,
        });
    }

    pub fn on_move(&mut self) {
        if let Some(gesture) = &mut self.gesture {
            gesture.dragged = true;
        }
    }

    /// Finish the current gesture. A release with no press in flight is ignored.
    pub fn on_release(&mut self, at: Millis, position: ScreenPoint) -> Option<Click> {
        let gesture = self.gesture.take()?;
        let duration_ms = at.since(gesture.pressed_at);

        if gesture.dragged {
            tracing::debug!(duration_ms, "pointer release after drag; not a click");
            return None;
        }
        if duration_ms >= self.max_duration_ms {
            tracing::debug!(duration_ms, "pointer held too long; not a click");
            return None;
        }

        Some(Click {
            position,
            duration_ms,
        })
    }

    pub fn is_pressed(&self) -> bool {
        self.gesture.is_some()
    }
}
