use blockspace_common::Hand;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The four face buttons on a pair of touch controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceButton {
    X,
    Y,
    A,
    B,
}

/// A raw event delivered by the headset runtime for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    TriggerDown { hand: Hand },
    GripDown { hand: Hand },
    /// Thumbstick pressed in (clicked).
    ThumbstickDown { hand: Hand },
    ButtonDown { hand: Hand, button: FaceButton },
    /// `axes.y` is positive when the stick is pulled back.
    ThumbstickMoved { hand: Hand, axes: Vec2 },
    ControllerConnected { hand: Hand },
    ControllerDisconnected { hand: Hand },
}

impl InputEvent {
    /// Controller the event came from.
    pub fn hand(&self) -> Hand {
        match *self {
            InputEvent::TriggerDown { hand }
            | InputEvent::GripDown { hand }
            | InputEvent::ThumbstickDown { hand }
            | InputEvent::ButtonDown { hand, .. }
            | InputEvent::ThumbstickMoved { hand, .. }
            | InputEvent::ControllerConnected { hand }
            | InputEvent::ControllerDisconnected { hand } => hand,
        }
    }
}
