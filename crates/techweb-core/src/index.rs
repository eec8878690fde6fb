//! The dependency graph index: sole owner of every [`Tech`].
//!
//! Construction follows the same lifecycle as any frozen content registry:
//! register categories and techs on a [`TechIndexBuilder`], then call
//! [`TechIndexBuilder::build`]. Building validates the whole batch at once
//! and either returns a fully valid [`TechIndex`] or an error; nothing in
//! between is observable.

use crate::category::TechCategory;
use crate::error::{QueryError, TechGraphError};
use crate::id::TechIdx;
use crate::resolver::Progression;
use crate::tech::{Tech, TechDef};
use crate::validate::{self, GraphShape};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects categories and tech definitions before validation.
#[derive(Debug, Default)]
pub struct TechIndexBuilder {
    categories: Vec<TechCategory>,
    category_names: HashMap<String, usize>,
    techs: Vec<TechDef>,
    tech_names: HashMap<String, usize>,
}

impl TechIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category. Names must be unique.
    pub fn register_category(&mut self, category: TechCategory) -> Result<(), TechGraphError> {
        if self.category_names.contains_key(&category.name) {
            return Err(TechGraphError::DuplicateCategory(category.name));
        }
        self.category_names
            .insert(category.name.clone(), self.categories.len());
        self.categories.push(category);
        Ok(())
    }

    /// Register a tech definition. Rejects duplicate names and impossible
    /// costs immediately; graph-level checks wait for [`Self::build`].
    pub fn register_tech(&mut self, def: TechDef) -> Result<(), TechGraphError> {
        if self.tech_names.contains_key(&def.name) {
            return Err(TechGraphError::DuplicateTech(def.name));
        }
        check_capacity(self.techs.len(), &def.name)?;
        if !def.research_cost.is_finite() || def.research_cost < 0.0 {
            return Err(TechGraphError::InvalidResearchCost {
                tech: def.name,
                cost: def.research_cost,
            });
        }
        if def.research_turns == 0 {
            return Err(TechGraphError::InvalidResearchTurns { tech: def.name });
        }
        self.tech_names.insert(def.name.clone(), self.techs.len());
        self.techs.push(def);
        Ok(())
    }

    pub fn tech_count(&self) -> usize {
        self.techs.len()
    }

    /// Validate the batch and freeze it into a [`TechIndex`].
    pub fn build(self) -> Result<TechIndex, TechGraphError> {
        debug!(
            techs = self.techs.len(),
            categories = self.categories.len(),
            "validating tech graph"
        );

        let mut defs = self.techs;
        defs.sort_by(|a, b| a.name.cmp(&b.name));

        let by_name: BTreeMap<String, TechIdx> = defs
            .iter()
            .enumerate()
            .map(|(slot, def)| (def.name.clone(), TechIdx::from_slot(slot)))
            .collect();
        let categories: BTreeMap<String, TechCategory> = self
            .categories
            .into_iter()
            .map(|cat| (cat.name.clone(), cat))
            .collect();

        let shape = validate::validate(&defs, &by_name, &categories).inspect_err(|err| {
            warn!(error = %err, "tech graph rejected");
        })?;

        let index = TechIndex::freeze(defs, by_name, categories, shape);
        info!(
            techs = index.tech_count(),
            categories = index.category_count(),
            "tech graph built"
        );
        Ok(index)
    }
}

/// Slots are stored as `u32`, so a batch may not grow past
/// [`TechIdx::MAX_TECHS`] entries.
fn check_capacity(registered: usize, next: &str) -> Result<(), TechGraphError> {
    if registered >= TechIdx::MAX_TECHS {
        return Err(TechGraphError::TooManyTechs {
            tech: next.to_string(),
            limit: TechIdx::MAX_TECHS,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Frozen index
// ---------------------------------------------------------------------------

/// Immutable, validated set of techs. Has no `&mut self` methods, so it can
/// be shared freely between threads once built.
#[derive(Debug, Clone)]
pub struct TechIndex {
    /// Arena of techs, sorted by name; `TechIdx` is a position here.
    techs: Vec<Tech>,
    by_name: BTreeMap<String, TechIdx>,
    /// Category name -> members, each list sorted by name.
    by_category: BTreeMap<String, Vec<TechIdx>>,
    categories: BTreeMap<String, TechCategory>,
    shape: GraphShape,
}

impl TechIndex {
    /// Convenience wrapper: register everything and build.
    pub fn from_parts<C, T>(categories: C, techs: T) -> Result<Self, TechGraphError>
    where
        C: IntoIterator<Item = TechCategory>,
        T: IntoIterator<Item = TechDef>,
    {
        let mut builder = TechIndexBuilder::new();
        for category in categories {
            builder.register_category(category)?;
        }
        for tech in techs {
            builder.register_tech(tech)?;
        }
        builder.build()
    }

    fn freeze(
        defs: Vec<TechDef>,
        by_name: BTreeMap<String, TechIdx>,
        categories: BTreeMap<String, TechCategory>,
        shape: GraphShape,
    ) -> Self {
        let mut by_category: BTreeMap<String, Vec<TechIdx>> = categories
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        for (slot, def) in defs.iter().enumerate() {
            by_category
                .entry(def.category.clone())
                .or_default()
                .push(TechIdx::from_slot(slot));
        }

        let names: Vec<String> = defs.iter().map(|def| def.name.clone()).collect();
        let techs = defs
            .into_iter()
            .enumerate()
            .map(|(slot, def)| {
                let unlocked = shape.dependents[slot]
                    .iter()
                    .map(|dep| names[dep.slot()].clone())
                    .collect();
                Tech::new(TechIdx::from_slot(slot), def, unlocked)
            })
            .collect();

        Self {
            techs,
            by_name,
            by_category,
            categories,
            shape,
        }
    }

    // -- Lookup --

    /// Get a tech by name. Absence is a normal outcome.
    pub fn lookup(&self, name: &str) -> Option<&Tech> {
        self.by_name.get(name).map(|&idx| &self.techs[idx.slot()])
    }

    /// Like [`Self::lookup`], reporting absence as [`QueryError::UnknownTech`].
    pub fn require(&self, name: &str) -> Result<&Tech, QueryError> {
        self.lookup(name)
            .ok_or_else(|| QueryError::UnknownTech(name.to_string()))
    }

    pub fn get(&self, idx: TechIdx) -> Option<&Tech> {
        self.techs.get(idx.slot())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn category(&self, name: &str) -> Option<&TechCategory> {
        self.categories.get(name)
    }

    // -- Enumeration --

    /// All tech names in alphabetical order.
    pub fn all_names(&self) -> Vec<&str> {
        self.techs.iter().map(Tech::name).collect()
    }

    /// Names of the techs in `category`, alphabetical. Empty for an unknown
    /// category.
    pub fn names_in_category(&self, category: &str) -> Vec<&str> {
        self.iter_category(category).map(Tech::name).collect()
    }

    /// All category names in alphabetical order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Iterate all techs in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Tech> {
        self.techs.iter()
    }

    /// Iterate the techs of one category in name order.
    pub fn iter_category<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a Tech> + 'a {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|idx| &self.techs[idx.slot()])
    }

    pub fn tech_count(&self) -> usize {
        self.techs.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    // -- Graph queries --

    /// Names of every direct and indirect prerequisite of `name`, in
    /// alphabetical order.
    pub fn recursive_prereqs(&self, name: &str) -> Result<Vec<&str>, QueryError> {
        let tech = self.require(name)?;
        Ok(self
            .ancestors(tech.idx())
            .iter()
            .map(|idx| self.techs[idx.slot()].name())
            .collect())
    }

    /// Progression queries against this index.
    pub fn progression(&self) -> Progression<'_> {
        Progression::new(self)
    }

    /// Every category and definition, in the order a builder would accept
    /// them back.
    pub fn definitions(&self) -> (Vec<TechCategory>, Vec<TechDef>) {
        (
            self.categories.values().cloned().collect(),
            self.techs.iter().map(|t| t.definition().clone()).collect(),
        )
    }

    // -- Crate-internal graph access --

    pub(crate) fn techs(&self) -> &[Tech] {
        &self.techs
    }

    pub(crate) fn idx_of(&self, name: &str) -> Option<TechIdx> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn prerequisite_slots(&self, idx: TechIdx) -> &[TechIdx] {
        &self.shape.prerequisites[idx.slot()]
    }

    pub(crate) fn ancestors(&self, idx: TechIdx) -> &BTreeSet<TechIdx> {
        &self.shape.ancestors[idx.slot()]
    }

    /// Every tech, prerequisites before dependents.
    pub(crate) fn topological_slots(&self) -> &[TechIdx] {
        &self.shape.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Colour;

    fn growth_category() -> TechCategory {
        TechCategory {
            name: "GROWTH_CATEGORY".to_string(),
            graphic: "icons/tech/growth.png".to_string(),
            colour: Colour::rgba(116, 225, 107, 255),
        }
    }

    fn learning_category() -> TechCategory {
        TechCategory::new("LEARNING_CATEGORY")
    }

    /// GRO_PLANET_ECOL -> GRO_GENETIC_ENG -> GRO_SYMBIOTIC_BIO
    ///                 LRN_ALGO_ELEGANCE -/
    fn setup_index() -> TechIndex {
        TechIndex::from_parts(
            [growth_category(), learning_category()],
            [
                TechDef::new("GRO_PLANET_ECOL", "GROWTH_CATEGORY", 10.0),
                TechDef::new("GRO_GENETIC_ENG", "GROWTH_CATEGORY", 9.0)
                    .with_prerequisites(["GRO_PLANET_ECOL"]),
                TechDef::new("LRN_ALGO_ELEGANCE", "LEARNING_CATEGORY", 10.0),
                TechDef::new("GRO_SYMBIOTIC_BIO", "GROWTH_CATEGORY", 90.0)
                    .with_prerequisites(["GRO_GENETIC_ENG", "LRN_ALGO_ELEGANCE"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn register_and_build() {
        let index = setup_index();
        assert_eq!(index.tech_count(), 4);
        assert_eq!(index.category_count(), 2);
    }

    #[test]
    fn lookup_by_name() {
        let index = setup_index();
        let tech = index.lookup("GRO_GENETIC_ENG").unwrap();
        assert_eq!(tech.research_cost(), 9.0);
        assert!(index.lookup("GRO_CYBORG").is_none());
        assert!(matches!(
            index.require("GRO_CYBORG"),
            Err(QueryError::UnknownTech(name)) if name == "GRO_CYBORG"
        ));
    }

    #[test]
    fn all_names_are_alphabetical() {
        let index = setup_index();
        assert_eq!(
            index.all_names(),
            vec![
                "GRO_GENETIC_ENG",
                "GRO_PLANET_ECOL",
                "GRO_SYMBIOTIC_BIO",
                "LRN_ALGO_ELEGANCE"
            ]
        );
    }

    #[test]
    fn names_in_category_sorted_and_scoped() {
        let index = setup_index();
        assert_eq!(
            index.names_in_category("GROWTH_CATEGORY"),
            vec!["GRO_GENETIC_ENG", "GRO_PLANET_ECOL", "GRO_SYMBIOTIC_BIO"]
        );
        assert_eq!(
            index.names_in_category("LEARNING_CATEGORY"),
            vec!["LRN_ALGO_ELEGANCE"]
        );
        assert!(index.names_in_category("SHIP_WEAPONS_CATEGORY").is_empty());
    }

    #[test]
    fn category_registry_lookup() {
        let index = setup_index();
        assert_eq!(
            index.category_names(),
            vec!["GROWTH_CATEGORY", "LEARNING_CATEGORY"]
        );
        let growth = index.category("GROWTH_CATEGORY").unwrap();
        assert_eq!(growth.graphic, "icons/tech/growth.png");
        assert!(index.category("NOPE").is_none());
    }

    #[test]
    fn unlocked_techs_are_reverse_edges() {
        let index = setup_index();
        let ecol = index.lookup("GRO_PLANET_ECOL").unwrap();
        assert_eq!(
            ecol.unlocked_techs().iter().collect::<Vec<_>>(),
            vec!["GRO_GENETIC_ENG"]
        );
        let algo = index.lookup("LRN_ALGO_ELEGANCE").unwrap();
        assert!(algo.unlocked_techs().contains("GRO_SYMBIOTIC_BIO"));
        let sym = index.lookup("GRO_SYMBIOTIC_BIO").unwrap();
        assert!(sym.unlocked_techs().is_empty());

        for tech in index.iter() {
            let expected: BTreeSet<String> = index
                .iter()
                .filter(|u| u.prerequisites().contains(tech.name()))
                .map(|u| u.name().to_string())
                .collect();
            assert_eq!(tech.unlocked_techs(), &expected);
        }
    }

    #[test]
    fn recursive_prereqs_collects_closure() {
        let index = setup_index();
        assert_eq!(
            index.recursive_prereqs("GRO_SYMBIOTIC_BIO").unwrap(),
            vec!["GRO_GENETIC_ENG", "GRO_PLANET_ECOL", "LRN_ALGO_ELEGANCE"]
        );
        assert!(index.recursive_prereqs("GRO_PLANET_ECOL").unwrap().is_empty());
        assert!(index.recursive_prereqs("NOPE").is_err());
    }

    #[test]
    fn duplicate_tech_fails() {
        let mut builder = TechIndexBuilder::new();
        builder.register_category(growth_category()).unwrap();
        builder
            .register_tech(TechDef::new("GRO_PLANET_ECOL", "GROWTH_CATEGORY", 10.0))
            .unwrap();
        let result = builder.register_tech(TechDef::new("GRO_PLANET_ECOL", "GROWTH_CATEGORY", 1.0));
        assert_eq!(
            result,
            Err(TechGraphError::DuplicateTech("GRO_PLANET_ECOL".into()))
        );
        assert_eq!(builder.tech_count(), 1);
    }

    #[test]
    fn duplicate_category_fails() {
        let mut builder = TechIndexBuilder::new();
        builder.register_category(growth_category()).unwrap();
        assert!(matches!(
            builder.register_category(growth_category()),
            Err(TechGraphError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn invalid_costs_rejected_on_registration() {
        let mut builder = TechIndexBuilder::new();
        let negative = TechDef::new("A", "GROWTH_CATEGORY", -1.0);
        assert!(matches!(
            builder.register_tech(negative),
            Err(TechGraphError::InvalidResearchCost { .. })
        ));
        let nan = TechDef::new("B", "GROWTH_CATEGORY", f64::NAN);
        assert!(matches!(
            builder.register_tech(nan),
            Err(TechGraphError::InvalidResearchCost { .. })
        ));
        let instant = TechDef {
            research_turns: 0,
            ..TechDef::new("C", "GROWTH_CATEGORY", 5.0)
        };
        assert_eq!(
            builder.register_tech(instant),
            Err(TechGraphError::InvalidResearchTurns { tech: "C".into() })
        );
        assert_eq!(builder.tech_count(), 0);
    }

    #[test]
    fn build_failure_exposes_no_index() {
        let result = TechIndex::from_parts(
            [growth_category()],
            [
                TechDef::new("A", "GROWTH_CATEGORY", 1.0).with_prerequisites(["B"]),
                TechDef::new("B", "GROWTH_CATEGORY", 1.0).with_prerequisites(["A"]),
            ],
        );
        assert!(matches!(
            result,
            Err(TechGraphError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn definitions_rebuild_identical_index() {
        let index = setup_index();
        let (categories, techs) = index.definitions();
        let rebuilt = TechIndex::from_parts(categories, techs).unwrap();
        assert_eq!(rebuilt.all_names(), index.all_names());
        for tech in index.iter() {
            assert_eq!(rebuilt.lookup(tech.name()), Some(tech));
        }
    }

    #[test]
    fn empty_index_builds_successfully() {
        let index = TechIndexBuilder::new().build().unwrap();
        assert_eq!(index.tech_count(), 0);
        assert!(index.all_names().is_empty());
    }

    #[test]
    fn batch_capacity_is_bounded_by_slot_width() {
        assert!(check_capacity(TechIdx::MAX_TECHS - 1, "LAST").is_ok());
        let err = check_capacity(TechIdx::MAX_TECHS, "ONE_TOO_MANY").unwrap_err();
        assert_eq!(
            err,
            TechGraphError::TooManyTechs {
                tech: "ONE_TOO_MANY".into(),
                limit: TechIdx::MAX_TECHS,
            }
        );
        assert_eq!(err.offending_techs(), vec!["ONE_TOO_MANY"]);
    }

    #[test]
    fn index_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TechIndex>();
    }
}
