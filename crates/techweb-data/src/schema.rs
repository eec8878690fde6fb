//! Serde data file structs for tech content.
//!
//! These structs define the on-disk format for categories and techs. They
//! are deserialized from RON, JSON, or TOML data files and then converted
//! into core records by the loader.

use serde::Deserialize;
use techweb_core::{Colour, ItemSpec, TechCategory, TechDef, TechType, UnlockableItemType};

// ===========================================================================
// Categories
// ===========================================================================

/// A tech category definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryData {
    pub name: String,
    #[serde(default)]
    pub graphic: String,
    /// RGBA; defaults to opaque white.
    #[serde(default = "default_colour")]
    pub colour: [u8; 4],
}

fn default_colour() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl From<CategoryData> for TechCategory {
    fn from(data: CategoryData) -> Self {
        TechCategory {
            name: data.name,
            graphic: data.graphic,
            colour: Colour::from(data.colour),
        }
    }
}

// ===========================================================================
// Techs
// ===========================================================================

/// A tech definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct TechData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub category: String,
    #[serde(rename = "type", default)]
    pub tech_type: TechTypeData,
    pub research_cost: f64,
    #[serde(default = "default_turns")]
    pub research_turns: u32,
    #[serde(default = "default_researchable")]
    pub researchable: bool,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub unlocks: Vec<UnlockData>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub graphic: String,
}

fn default_turns() -> u32 {
    1
}

fn default_researchable() -> bool {
    true
}

/// The kind of a tech in a data file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TechTypeData {
    #[default]
    Theory,
    Application,
    Refinement,
}

/// One unlocked item in a data file, e.g. `{ type = "Building", name = "BLD_MILITARY_COMMAND" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockData {
    #[serde(rename = "type")]
    pub kind: UnlockKindData,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum UnlockKindData {
    Building,
    ShipPart,
    ShipHull,
    ShipDesign,
    Tech,
}

impl From<TechTypeData> for TechType {
    fn from(data: TechTypeData) -> Self {
        match data {
            TechTypeData::Theory => TechType::Theory,
            TechTypeData::Application => TechType::Application,
            TechTypeData::Refinement => TechType::Refinement,
        }
    }
}

impl From<UnlockData> for ItemSpec {
    fn from(data: UnlockData) -> Self {
        let kind = match data.kind {
            UnlockKindData::Building => UnlockableItemType::Building,
            UnlockKindData::ShipPart => UnlockableItemType::ShipPart,
            UnlockKindData::ShipHull => UnlockableItemType::ShipHull,
            UnlockKindData::ShipDesign => UnlockableItemType::ShipDesign,
            UnlockKindData::Tech => UnlockableItemType::Tech,
        };
        ItemSpec::new(kind, data.name)
    }
}

impl From<TechData> for TechDef {
    fn from(data: TechData) -> Self {
        TechDef {
            name: data.name,
            description: data.description,
            short_description: data.short_description,
            category: data.category,
            tech_type: data.tech_type.into(),
            research_cost: data.research_cost,
            research_turns: data.research_turns,
            researchable: data.researchable,
            effects: data.effects,
            prerequisites: data.prerequisites.into_iter().collect(),
            unlocked_items: data.unlocks.into_iter().map(ItemSpec::from).collect(),
            graphic: data.graphic,
        }
    }
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

/// Wrapper for a list of categories in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlCategories {
    pub categories: Vec<CategoryData>,
}

/// Wrapper for a list of techs in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlTechs {
    pub techs: Vec<TechData>,
}

// ===========================================================================
// Tests
// ===========================================================================
