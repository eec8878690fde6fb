use crate::id::TechIdx;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The kind of a tech. Informational only; graph algorithms ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechType {
    #[default]
    Theory,
    Application,
    Refinement,
}

impl TechType {
    pub fn as_str(self) -> &'static str {
        match self {
            TechType::Theory => "Theory",
            TechType::Application => "Application",
            TechType::Refinement => "Refinement",
        }
    }
}

// ---------------------------------------------------------------------------
// Unlocks
// ---------------------------------------------------------------------------

/// What kind of game content an [`ItemSpec`] unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnlockableItemType {
    Building,
    ShipPart,
    ShipHull,
    ShipDesign,
    Tech,
}

impl UnlockableItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnlockableItemType::Building => "Building",
            UnlockableItemType::ShipPart => "ShipPart",
            UnlockableItemType::ShipHull => "ShipHull",
            UnlockableItemType::ShipDesign => "ShipDesign",
            UnlockableItemType::Tech => "Tech",
        }
    }
}

/// One piece of content unlocked by researching a tech, e.g.
/// `(Building, "BLD_GAS_GIANT_GEN")`. Opaque to the graph engine; game code
/// applies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSpec {
    pub kind: UnlockableItemType,
    pub name: String,
}

impl ItemSpec {
    pub fn new(kind: UnlockableItemType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tech definition (inbound record)
// ---------------------------------------------------------------------------

/// A fully-formed tech record as supplied by a content loader. Consumed by
/// [`crate::TechIndexBuilder::register_tech`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechDef {
    /// Globally unique name; the key every other record refers to.
    pub name: String,
    pub description: String,
    pub short_description: String,
    /// Must name a registered [`crate::TechCategory`].
    pub category: String,
    pub tech_type: TechType,
    /// Total research points needed. Non-negative and finite.
    pub research_cost: f64,
    /// Minimum number of turns, even with unlimited spending. At least 1.
    pub research_turns: u32,
    /// Non-researchable techs exist only to organize the tree and never
    /// appear in frontier or path results.
    pub researchable: bool,
    /// Opaque effects-group keys applied by game logic on completion.
    pub effects: Vec<String>,
    /// Names of techs that must all be known first.
    pub prerequisites: BTreeSet<String>,
    pub unlocked_items: Vec<ItemSpec>,
    pub graphic: String,
}

impl TechDef {
    /// A researchable theory with the given cost and one turn, no texts and
    /// no payload. Fill in the rest with struct update syntax.
    pub fn new(name: impl Into<String>, category: impl Into<String>, research_cost: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            short_description: String::new(),
            category: category.into(),
            tech_type: TechType::Theory,
            research_cost,
            research_turns: 1,
            researchable: true,
            effects: Vec::new(),
            prerequisites: BTreeSet::new(),
            unlocked_items: Vec::new(),
            graphic: String::new(),
        }
    }

    /// Builder-style helper: replace the prerequisite set.
    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Tech (frozen graph node)
// ---------------------------------------------------------------------------

/// A tech owned by a built [`crate::TechIndex`]. Immutable; the reverse
/// edges in [`Tech::unlocked_techs`] are derived once during construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Tech {
    idx: TechIdx,
    def: TechDef,
    unlocked_techs: BTreeSet<String>,
}

impl Tech {
    pub(crate) fn new(idx: TechIdx, def: TechDef, unlocked_techs: BTreeSet<String>) -> Self {
        Self {
            idx,
            def,
            unlocked_techs,
        }
    }

    /// Arena position inside the owning index.
    pub fn idx(&self) -> TechIdx {
        self.idx
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    pub fn short_description(&self) -> &str {
        &self.def.short_description
    }

    pub fn category(&self) -> &str {
        &self.def.category
    }

    pub fn tech_type(&self) -> TechType {
        self.def.tech_type
    }

    /// Total research points required.
    pub fn research_cost(&self) -> f64 {
        self.def.research_cost
    }

    /// Maximum research points that may be spent per turn.
    pub fn per_turn_cost(&self) -> f64 {
        self.def.research_cost / f64::from(self.def.research_turns)
    }

    /// Turns needed when [`Tech::per_turn_cost`] is spent every turn.
    pub fn research_time(&self) -> u32 {
        self.def.research_turns
    }

    pub fn researchable(&self) -> bool {
        self.def.researchable
    }

    pub fn effects(&self) -> &[String] {
        &self.def.effects
    }

    pub fn prerequisites(&self) -> &BTreeSet<String> {
        &self.def.prerequisites
    }

    pub fn unlocked_items(&self) -> &[ItemSpec] {
        &self.def.unlocked_items
    }

    /// Names of all techs that list this one as a prerequisite.
    pub fn unlocked_techs(&self) -> &BTreeSet<String> {
        &self.unlocked_techs
    }

    pub fn graphic(&self) -> &str {
        &self.def.graphic
    }

    /// The record this tech was built from.
    pub fn definition(&self) -> &TechDef {
        &self.def
    }

    /// Render the tech in the content-file layout used by the game's data
    /// directory. Empty optional fields are omitted; output is stable.
    pub fn dump(&self) -> String {
        let def = &self.def;
        let mut out = String::new();
        out.push_str("Tech\n");
        let _ = writeln!(out, "    name = {}", Quoted(&def.name));
        let _ = writeln!(out, "    description = {}", Quoted(&def.description));
        let _ = writeln!(out, "    short_description = {}", Quoted(&def.short_description));
        let _ = writeln!(out, "    techtype = {}", def.tech_type.as_str());
        let _ = writeln!(out, "    category = {}", Quoted(&def.category));
        let _ = writeln!(out, "    researchcost = {}", def.research_cost);
        let _ = writeln!(out, "    researchturns = {}", def.research_turns);
        if !def.researchable {
            out.push_str("    Unresearchable\n");
        }
        match def.prerequisites.len() {
            0 => {}
            1 => {
                let only = def.prerequisites.iter().next().map_or("", String::as_str);
                let _ = writeln!(out, "    prerequisites = {}", Quoted(only));
            }
            _ => {
                out.push_str("    prerequisites = [\n");
                for prereq in &def.prerequisites {
                    let _ = writeln!(out, "        {}", Quoted(prereq));
                }
                out.push_str("    ]\n");
            }
        }
        match def.unlocked_items.as_slice() {
            [] => {}
            [item] => {
                let _ = writeln!(out, "    unlock = {}", dump_item(item));
            }
            items => {
                out.push_str("    unlock = [\n");
                for item in items {
                    let _ = writeln!(out, "        {}", dump_item(item));
                }
                out.push_str("    ]\n");
            }
        }
        if !def.effects.is_empty() {
            out.push_str("    effectsgroups = [\n");
            for effect in &def.effects {
                let _ = writeln!(out, "        {}", Quoted(effect));
            }
            out.push_str("    ]\n");
        }
        if !def.graphic.is_empty() {
            let _ = writeln!(out, "    graphic = {}", Quoted(&def.graphic));
        }
        out
    }
}

fn dump_item(item: &ItemSpec) -> String {
    format!("Item type = {} name = {}", item.kind.as_str(), Quoted(&item.name))
}

/// A string literal for dump output, with `"` and `\` escaped.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for c in self.0.chars() {
            if matches!(c, '"' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(c)?;
        }
        f.write_char('"')
    }
}
