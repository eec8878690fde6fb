use serde::{Deserialize, Serialize};

/// An RGBA display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 4]> for Colour {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

/// A named grouping of techs, used for classification and display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechCategory {
    pub name: String,
    /// Icon shown for the category.
    pub graphic: String,
    pub colour: Colour,
}

impl TechCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graphic: String::new(),
            colour: Colour::WHITE,
        }
    }
}
