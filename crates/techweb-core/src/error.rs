//! Error types for building and querying a tech graph.

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

/// Errors that reject a batch of tech definitions. Any of these aborts
/// construction; a [`crate::TechIndex`] is never handed out in a partially
/// valid state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TechGraphError {
    #[error("duplicate tech name: {0}")]
    DuplicateTech(String),

    #[error("duplicate tech category: {0}")]
    DuplicateCategory(String),

    #[error("tech {tech} does not fit: a tech set holds at most {limit} techs")]
    TooManyTechs { tech: String, limit: usize },

    #[error("tech {tech} has invalid research cost {cost}")]
    InvalidResearchCost { tech: String, cost: f64 },

    #[error("tech {tech} must take at least one research turn")]
    InvalidResearchTurns { tech: String },

    #[error("tech {tech} belongs to unknown category {category}")]
    UnknownCategory { tech: String, category: String },

    #[error("tech {tech} requires missing tech {prerequisite} as its prerequisite")]
    UnknownPrerequisite { tech: String, prerequisite: String },

    #[error("prerequisite cycle: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// Names along the cycle, following prerequisite -> dependent edges.
        /// The first and last entries are the same tech.
        cycle: Vec<String>,
    },

    #[error(
        "redundant dependency: {prerequisite} -> {dependent} is already implied through {via}"
    )]
    RedundantDependency {
        prerequisite: String,
        dependent: String,
        via: String,
    },
}

impl TechGraphError {
    /// Every tech name this error points at, in reporting order.
    pub fn offending_techs(&self) -> Vec<&str> {
        match self {
            TechGraphError::DuplicateTech(name) => vec![name.as_str()],
            TechGraphError::DuplicateCategory(_) => Vec::new(),
            TechGraphError::TooManyTechs { tech, .. }
            | TechGraphError::InvalidResearchCost { tech, .. }
            | TechGraphError::InvalidResearchTurns { tech }
            | TechGraphError::UnknownCategory { tech, .. } => vec![tech.as_str()],
            TechGraphError::UnknownPrerequisite { tech, prerequisite } => {
                vec![tech.as_str(), prerequisite.as_str()]
            }
            TechGraphError::CyclicDependency { cycle } => {
                // The closing entry repeats the first.
                let open = cycle.len().saturating_sub(1);
                cycle[..open].iter().map(String::as_str).collect()
            }
            TechGraphError::RedundantDependency {
                prerequisite,
                dependent,
                via,
            } => vec![prerequisite.as_str(), dependent.as_str(), via.as_str()],
        }
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Recoverable errors returned by queries on a built index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no such tech: {0}")]
    UnknownTech(String),

    #[error("tech {goal} can never be researched: {blocker} is not researchable")]
    UnreachableGoal { goal: String, blocker: String },
}
