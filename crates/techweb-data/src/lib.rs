//! Content loading for techweb: reads category and tech records from RON,
//! TOML or JSON data files and builds a validated [`techweb_core::TechIndex`].

pub mod loader;
pub mod schema;

pub use loader::{load_tech_set, load_tech_set_from_files, DataLoadError};
