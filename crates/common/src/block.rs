use serde::{Deserialize, Serialize};

/// A 24-bit RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const GREEN: Color = Color(0x00FF00);
    pub const RED: Color = Color(0xFF0000);
    pub const CYAN: Color = Color(0x00FFFF);
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0 & 0xFF_FFFF)
    }
}

/// Placeable block material.
///
/// Declaration order is the order `next()` walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Grass,
    Stone,
    Wood,
    Dirt,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [
        BlockType::Grass,
        BlockType::Stone,
        BlockType::Wood,
        BlockType::Dirt,
    ];

    /// Display name, capitalized.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Grass => "Grass",
            BlockType::Stone => "Stone",
            BlockType::Wood => "Wood",
            BlockType::Dirt => "Dirt",
        }
    }

    /// Material color; also tints the selection text.
    pub fn color(self) -> Color {
        match self {
            BlockType::Grass => Color(0x4CC417),
            BlockType::Stone => Color(0x888888),
            BlockType::Wood => Color(0x8B4513),
            BlockType::Dirt => Color(0x8B4000),
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The following type, wrapping from the last back to the first.
    pub fn next(self) -> BlockType {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_grass() {
        assert_eq!(BlockType::default(), BlockType::Grass);
    }

    #[test]
    fn next_walks_declaration_order() {
        assert_eq!(BlockType::Grass.next(), BlockType::Stone);
        assert_eq!(BlockType::Stone.next(), BlockType::Wood);
        assert_eq!(BlockType::Wood.next(), BlockType::Dirt);
        assert_eq!(BlockType::Dirt.next(), BlockType::Grass);
    }

    #[test]
    fn four_steps_return_to_start() {
        for start in BlockType::ALL {
            let mut t = start;
            for _ in 0..4 {
                t = t.next();
            }
            assert_eq!(t, start);
        }
    }

    #[test]
    fn color_formats_as_hex() {
        assert_eq!(BlockType::Grass.color().to_string(), "#4CC417");
        assert_eq!(Color::CYAN.to_string(), "#00FFFF");
    }
}
