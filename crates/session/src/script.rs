//! Timed input scripts for driving a session without a headset.
//!
//! A script is a list of steps, each stamped with the session time it fires
//! at:
//!
//! ```yaml
//! - at_ms: 0
//!   step: { do: aim, hand: right, yaw_degrees: 0.0, pitch_degrees: -60.0 }
//! - at_ms: 10
//!   step: { do: input, event: { type: trigger_down, hand: right } }
//! ```

use crate::config::ConfigError;
use crate::session::{Outcome, Session};
use blockspace_common::Hand;
use blockspace_input::InputEvent;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One scripted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "do", rename_all = "snake_case")]
pub enum Step {
    /// Deliver a controller event.
    Input { event: InputEvent },
    /// Point a controller.
    Aim {
        hand: Hand,
        yaw_degrees: f32,
        pitch_degrees: f32,
    },
    /// Turn the head.
    Turn { yaw_degrees: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub step: Step,
}

impl ScriptStep {
    /// Parse a script from a `.yaml`, `.yml` or `.json` file.
    pub fn load_all(path: &Path) -> Result<Vec<ScriptStep>, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Ok(serde_yaml::from_str(&text)?),
            "json" => Ok(serde_json::from_str(&text)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl Session {
    /// Play `steps` in time order, expiring feedback between them.
    ///
    /// Returns the outcome of every input step that mapped to an action.
    pub fn run_script(&mut self, steps: &[ScriptStep]) -> Vec<Outcome> {
        let mut ordered: Vec<&ScriptStep> = steps.iter().collect();
        // Stable: steps sharing a timestamp keep file order.
        ordered.sort_by_key(|s| s.at_ms);

        let mut outcomes = Vec::new();
        for scripted in ordered {
            let now = Duration::from_millis(scripted.at_ms);
            self.advance(now);
            match &scripted.step {
                Step::Input { event } => {
                    if let Some(outcome) = self.handle(event, now) {
                        outcomes.push(outcome);
                    }
                }
                Step::Aim {
                    hand,
                    yaw_degrees,
                    pitch_degrees,
                } => {
                    if let Err(e) = self.aim_controller(*hand, *yaw_degrees, *pitch_degrees) {
                        tracing::warn!(at_ms = scripted.at_ms, "aim skipped: {e}");
                    }
                }
                Step::Turn { yaw_degrees } => {
                    if let Err(e) = self.turn_head(*yaw_degrees) {
                        tracing::warn!(at_ms = scripted.at_ms, "turn skipped: {e}");
                    }
                }
            }
        }
        outcomes
    }
}
