//! Progression queries: what can be researched next, and in which order to
//! reach a goal.
//!
//! Every query takes the caller's set of known tech names by reference and
//! never keeps it. Names in `known` that the index does not contain are
//! ignored. Results are deterministic: sets come back in name order, and
//! cost ties are broken by name.

use crate::error::QueryError;
use crate::id::TechIdx;
use crate::index::TechIndex;
use crate::tech::Tech;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Stateless query surface borrowed from a [`TechIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Progression<'a> {
    index: &'a TechIndex,
}

impl<'a> Progression<'a> {
    pub fn new(index: &'a TechIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a TechIndex {
        self.index
    }

    // -- Frontier --

    /// Every researchable tech not in `known` whose prerequisites are all in
    /// `known`, sorted by name.
    pub fn frontier(&self, known: &BTreeSet<String>) -> Vec<&'a Tech> {
        let known = self.known_mask(known);
        self.index
            .techs()
            .iter()
            .filter(|tech| self.is_available(tech.idx(), &known))
            .collect()
    }

    /// The frontier tech with the lowest research cost, ties broken by name.
    pub fn cheapest_frontier(&self, known: &BTreeSet<String>) -> Option<&'a Tech> {
        self.frontier(known).into_iter().min_by(|a, b| by_cost(a, b))
    }

    // -- Goal-directed queries --

    /// The techs still to research before `goal` can be completed, `goal`
    /// included, in a valid research order.
    ///
    /// Techs are grouped by depth inside the remaining set (a tech comes
    /// after its deepest remaining prerequisite) and ordered by cost, then
    /// name, within each depth. Empty when `goal` is already known.
    pub fn path_towards(
        &self,
        known: &BTreeSet<String>,
        goal: &str,
    ) -> Result<Vec<&'a Tech>, QueryError> {
        let (_, required) = self.required_for(known, goal)?;

        let mut depth: BTreeMap<TechIdx, usize> = BTreeMap::new();
        for &idx in self.index.topological_slots() {
            if !required.contains(&idx) {
                continue;
            }
            let level = self
                .index
                .prerequisite_slots(idx)
                .iter()
                .filter_map(|prereq| depth.get(prereq))
                .map(|&d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(idx, level);
        }

        let mut path: Vec<(usize, &'a Tech)> = depth
            .into_iter()
            .map(|(idx, level)| (level, &self.index.techs()[idx.slot()]))
            .collect();
        path.sort_by(|(la, a), (lb, b)| la.cmp(lb).then_with(|| by_cost(a, b)));

        trace!(goal, steps = path.len(), "path towards goal");
        Ok(path.into_iter().map(|(_, tech)| tech).collect())
    }

    /// Same set of techs as [`Self::path_towards`], ordered by repeatedly
    /// taking the cheapest tech that is researchable at that point.
    pub fn cheapest_path_towards(
        &self,
        known: &BTreeSet<String>,
        goal: &str,
    ) -> Result<Vec<&'a Tech>, QueryError> {
        let (mut satisfied, mut remaining) = self.required_for(known, goal)?;

        let mut path = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let next = remaining
                .iter()
                .filter(|&&idx| self.prerequisites_met(idx, &satisfied))
                .map(|idx| &self.index.techs()[idx.slot()])
                .min_by(|a, b| by_cost(a, b));
            // The remaining set is closed under unknown prerequisites, so
            // some member is always ready.
            let Some(next) = next else {
                break;
            };
            satisfied[next.idx().slot()] = true;
            remaining.remove(&next.idx());
            path.push(next);
        }

        trace!(goal, steps = path.len(), "cheapest path towards goal");
        Ok(path)
    }

    /// Frontier techs that are part of [`Self::path_towards`] for `goal`,
    /// sorted by name.
    pub fn next_techs_towards(
        &self,
        known: &BTreeSet<String>,
        goal: &str,
    ) -> Result<Vec<&'a Tech>, QueryError> {
        let (known, required) = self.required_for(known, goal)?;
        Ok(required
            .iter()
            .filter(|&&idx| self.prerequisites_met(idx, &known))
            .map(|idx| &self.index.techs()[idx.slot()])
            .collect())
    }

    /// The cheapest of [`Self::next_techs_towards`]. `None` when `goal` is
    /// already known.
    pub fn cheapest_next_tech_towards(
        &self,
        known: &BTreeSet<String>,
        goal: &str,
    ) -> Result<Option<&'a Tech>, QueryError> {
        Ok(self
            .next_techs_towards(known, goal)?
            .into_iter()
            .min_by(|a, b| by_cost(a, b)))
    }

    // -- Internal helpers --

    fn known_mask(&self, known: &BTreeSet<String>) -> Vec<bool> {
        let mut mask = vec![false; self.index.tech_count()];
        for idx in known.iter().filter_map(|name| self.index.idx_of(name)) {
            mask[idx.slot()] = true;
        }
        mask
    }

    fn prerequisites_met(&self, idx: TechIdx, known: &[bool]) -> bool {
        self.index
            .prerequisite_slots(idx)
            .iter()
            .all(|prereq| known[prereq.slot()])
    }

    fn is_available(&self, idx: TechIdx, known: &[bool]) -> bool {
        self.index.techs()[idx.slot()].researchable()
            && !known[idx.slot()]
            && self.prerequisites_met(idx, known)
    }

    /// Resolve `goal` and collect the unknown techs it still needs, itself
    /// included. The walk stops at known techs, so whatever sits behind them
    /// is treated as satisfied. Fails if any collected tech can never be
    /// researched.
    fn required_for(
        &self,
        known: &BTreeSet<String>,
        goal: &str,
    ) -> Result<(Vec<bool>, BTreeSet<TechIdx>), QueryError> {
        let goal_tech = self.index.require(goal)?;
        let known = self.known_mask(known);
        let goal_idx = goal_tech.idx();

        let mut required: BTreeSet<TechIdx> = BTreeSet::new();
        let mut stack = vec![goal_idx];
        while let Some(idx) = stack.pop() {
            if known[idx.slot()] || !required.insert(idx) {
                continue;
            }
            stack.extend_from_slice(self.index.prerequisite_slots(idx));
        }

        if required.is_empty() {
            return Ok((known, required));
        }

        // Check the goal itself before any of its prerequisites.
        let blocker = std::iter::once(goal_idx)
            .chain(required.iter().copied())
            .map(|idx| &self.index.techs()[idx.slot()])
            .find(|tech| !tech.researchable());
        if let Some(blocker) = blocker {
            return Err(QueryError::UnreachableGoal {
                goal: goal.to_string(),
                blocker: blocker.name().to_string(),
            });
        }

        Ok((known, required))
    }
}

/// Ascending research cost, then name.
fn by_cost(a: &Tech, b: &Tech) -> Ordering {
    a.research_cost()
        .total_cmp(&b.research_cost())
        .then_with(|| a.name().cmp(b.name()))
}
