use crate::block::Color;
use serde::{Deserialize, Serialize};

/// Appearance of a non-interactive, time-limited feedback entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Marker {
    Sphere {
        radius: f32,
        color: Color,
        opacity: f32,
    },
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        color: Color,
        opacity: f32,
    },
    Text {
        value: String,
        color: Color,
        scale: f32,
    },
}

impl Marker {
    /// Tint of the marker.
    pub fn color(&self) -> Color {
        match self {
            Marker::Sphere { color, .. } | Marker::Ring { color, .. } | Marker::Text { color, .. } => {
                *color
            }
        }
    }
}
