//! techweb core -- the technology dependency-graph engine.
//!
//! Stores every researchable item ("tech"), guarantees that prerequisite
//! relationships form a valid graph, and answers the progression queries a
//! research screen or an AI planner needs.
//!
//! # Lifecycle
//!
//! 1. A content loader registers [`TechCategory`] and [`TechDef`] records on
//!    a [`TechIndexBuilder`].
//! 2. [`TechIndexBuilder::build`] validates the whole batch once. Any
//!    violation is returned as a [`TechGraphError`] and no index exists.
//! 3. The resulting [`TechIndex`] is immutable. Queries borrow it, either
//!    directly (lookup, enumeration) or through a [`Progression`].
//!
//! ```rust,ignore
//! let index = TechIndex::from_parts(categories, techs)?;
//! let known = BTreeSet::from(["GRO_PLANET_ECOL".to_string()]);
//! for tech in index.progression().path_towards(&known, "GRO_SYMBIOTIC_BIO")? {
//!     println!("{} ({} RP)", tech.name(), tech.research_cost());
//! }
//! ```
//!
//! # Graph invariants
//!
//! After construction:
//!
//! - every prerequisite names a tech in the index;
//! - the prerequisite graph has no cycle;
//! - no direct prerequisite is also an indirect one;
//! - [`Tech::unlocked_techs`] is exactly the set of techs listing that tech
//!   as a prerequisite.

pub mod category;
pub mod error;
pub mod id;
pub mod index;
pub mod resolver;
pub mod snapshot;
pub mod tech;
mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use category::{Colour, TechCategory};
pub use error::{QueryError, TechGraphError};
pub use id::TechIdx;
pub use index::{TechIndex, TechIndexBuilder};
pub use resolver::Progression;
pub use snapshot::SnapshotError;
pub use tech::{ItemSpec, Tech, TechDef, TechType, UnlockableItemType};
