use crate::event::{FaceButton, InputEvent};
use blockspace_common::{BlockType, Hand};
use glam::Vec2;

/// Thumbstick travel a push must exceed on the forward/back axis to teleport.
pub const TELEPORT_THRESHOLD: f32 = 0.8;

/// A high-level action the session executes for one hand.
///
/// Block building and locomotion consume actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Place a block where the hand's pointer meets the ground.
    PlaceBlock(Hand),
    /// Remove the block nearest along the hand's pointer.
    RemoveBlock(Hand),
    /// Advance to the next block type.
    CycleBlockType,
    /// Switch directly to a block type.
    SelectBlockType(BlockType),
    /// Jump the rig forward or back; carries the stick axes.
    Teleport(Vec2),
    ControllerConnected(Hand),
    ControllerDisconnected(Hand),
}

/// Dispatch table from input events to actions.
#[derive(Debug, Clone)]
pub struct ActionMap {
    teleport_threshold: f32,
    buttons: [(FaceButton, BlockType); 4],
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::new(TELEPORT_THRESHOLD)
    }
}

impl ActionMap {
    /// Default face-button bindings with the given deadzone.
    pub fn new(teleport_threshold: f32) -> Self {
        Self {
            teleport_threshold,
            buttons: [
                (FaceButton::X, BlockType::Grass),
                (FaceButton::Y, BlockType::Stone),
                (FaceButton::A, BlockType::Wood),
                (FaceButton::B, BlockType::Dirt),
            ],
        }
    }

    /// Forward/back stick travel that must be exceeded to teleport.
    pub fn teleport_threshold(&self) -> f32 {
        self.teleport_threshold
    }

    /// Block type a face button selects.
    pub fn button_binding(&self, button: FaceButton) -> BlockType {
        self.buttons
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, t)| *t)
            .unwrap_or_default()
    }

    /// Translate one event. Returns `None` for stick motion inside the deadzone.
    pub fn map(&self, event: &InputEvent) -> Option<Action> {
        let action = match *event {
            InputEvent::TriggerDown { hand } => Action::PlaceBlock(hand),
            InputEvent::GripDown { hand } => Action::RemoveBlock(hand),
            InputEvent::ThumbstickDown { .. } => Action::CycleBlockType,
            InputEvent::ButtonDown { button, .. } => {
                Action::SelectBlockType(self.button_binding(button))
            }
            InputEvent::ThumbstickMoved { axes, .. } => {
                if axes.y.is_nan() || axes.y.abs() <= self.teleport_threshold {
                    tracing::trace!(y = axes.y, "thumbstick inside deadzone");
                    return None;
                }
                Action::Teleport(axes)
            }
            InputEvent::ControllerConnected { hand } => Action::ControllerConnected(hand),
            InputEvent::ControllerDisconnected { hand } => Action::ControllerDisconnected(hand),
        };
        Some(action)
    }
}
