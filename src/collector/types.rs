//! Raw input event types crossing the hook boundary.
//!
//! Platform hooks translate OS callbacks into [`InputEvent`] values and
//! push them over the collector channel; everything downstream is
//! platform-neutral. Codes are the raw virtual-key values the hook saw,
//! validated against the key space by the classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which wheel axis a scroll event moved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

/// One raw input event, timestamped at capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown {
        code: u16,
        at: DateTime<Utc>,
    },
    KeyUp {
        code: u16,
        at: DateTime<Utc>,
    },
    /// Absolute cursor position on the virtual desktop.
    MouseMove {
        x: i32,
        y: i32,
        at: DateTime<Utc>,
    },
    /// Signed click count; positive is up/right.
    MouseWheel {
        axis: WheelAxis,
        clicks: i32,
        at: DateTime<Utc>,
    },
}

impl InputEvent {
    pub fn key_down(code: u16) -> Self {
        Self::KeyDown {
            code,
            at: Utc::now(),
        }
    }

    pub fn key_up(code: u16) -> Self {
        Self::KeyUp {
            code,
            at: Utc::now(),
        }
    }

    pub fn mouse_move(x: i32, y: i32) -> Self {
        Self::MouseMove {
            x,
            y,
            at: Utc::now(),
        }
    }

    pub fn mouse_wheel(axis: WheelAxis, clicks: i32) -> Self {
        Self::MouseWheel {
            axis,
            clicks,
            at: Utc::now(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match *self {
            InputEvent::KeyDown { at, .. }
            | InputEvent::KeyUp { at, .. }
            | InputEvent::MouseMove { at, .. }
            | InputEvent::MouseWheel { at, .. } => at,
        }
    }
}

/// Source of the virtual desktop dimensions used to normalize mouse
/// travel. Platform hooks provide a live implementation; the default
/// reads fixed dimensions from config.
pub trait ScreenProbe: Send {
    fn virtual_size(&mut self) -> (i32, i32);
}

/// A probe that always reports the same dimensions.
pub struct FixedScreen {
    width: i32,
    height: i32,
}

impl FixedScreen {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl ScreenProbe for FixedScreen {
    fn virtual_size(&mut self) -> (i32, i32) {
        (self.width, self.height)
    }
}
