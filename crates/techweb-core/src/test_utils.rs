//! Fixture builders for tests and benchmarks. Enabled by the `test-utils`
//! feature.

use crate::category::TechCategory;
use crate::index::TechIndex;
use crate::tech::TechDef;
use std::collections::BTreeSet;

/// Category used by every fixture tech.
pub const TEST_CATEGORY: &str = "TEST_CATEGORY";

pub fn test_category() -> TechCategory {
    TechCategory::new(TEST_CATEGORY)
}

/// A researchable tech in [`TEST_CATEGORY`].
pub fn tech(name: &str, cost: f64, prereqs: &[&str]) -> TechDef {
    TechDef::new(name, TEST_CATEGORY, cost).with_prerequisites(prereqs.iter().copied())
}

/// Build an index from fixture techs. Panics on an invalid batch.
pub fn build_index(techs: Vec<TechDef>) -> TechIndex {
    TechIndex::from_parts([test_category()], techs).expect("fixture tech set should be valid")
}

pub fn known(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Growth (10) -> Biology (20) -> Genetics (30).
pub fn growth_chain() -> TechIndex {
    build_index(vec![
        tech("Growth", 10.0, &[]),
        tech("Biology", 20.0, &["Growth"]),
        tech("Genetics", 30.0, &["Biology"]),
    ])
}

/// Name of the tech at `(layer, slot)` in [`layered_techs`].
pub fn layered_name(layer: usize, slot: usize) -> String {
    format!("T{layer:02}_{slot:02}")
}

/// A tree of `layers` rows with `width` techs each. Every tech past the
/// first row depends on the tech above it and on its right-hand neighbour
/// in the previous row (when `width > 1`). Both prerequisites sit in the
/// same row, so neither implies the other and the set is always valid.
pub fn layered_techs(layers: usize, width: usize) -> Vec<TechDef> {
    let mut techs = Vec::with_capacity(layers * width);
    for layer in 0..layers {
        for slot in 0..width {
            let cost = (10 + layer * 7 + (slot * 13) % 17) as f64;
            let mut prereqs = BTreeSet::new();
            if layer > 0 {
                prereqs.insert(layered_name(layer - 1, slot));
                prereqs.insert(layered_name(layer - 1, (slot + 1) % width));
            }
            techs.push(TechDef {
                prerequisites: prereqs,
                ..TechDef::new(layered_name(layer, slot), TEST_CATEGORY, cost)
            });
        }
    }
    techs
}

pub fn layered_index(layers: usize, width: usize) -> TechIndex {
    build_index(layered_techs(layers, width))
}
