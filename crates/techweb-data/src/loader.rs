//! Loading pipeline: finds data files, deserializes them, and builds a
//! validated tech index.
//!
//! A content directory holds two files, `categories.{ron,toml,json}` and
//! `techs.{ron,toml,json}`. The format is picked from the extension and the
//! two files may use different formats.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use techweb_core::{TechGraphError, TechIndex, TechIndexBuilder};
use tracing::{debug, info};

use crate::schema::{CategoryData, TechData, TomlCategories, TomlTechs};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The same category or tech name appears twice.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The records parsed but do not form a valid tech graph.
    #[error("invalid tech graph: {0}")]
    Graph(#[from] TechGraphError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|format| Some(format.extension()) == ext)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` if none exists and `ConflictingFormats` if more than
/// one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, err: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: err.to_string(),
    }
}

/// Deserialize a list of records. RON and JSON files hold a bare list; TOML
/// files hold a table whose single array is unwrapped by `unwrap_toml`.
fn deserialize_list<T, W>(
    path: &Path,
    unwrap_toml: fn(W) -> Vec<T>,
) -> Result<Vec<T>, DataLoadError>
where
    T: DeserializeOwned,
    W: DeserializeOwned,
{
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str::<W>(&content)
            .map(unwrap_toml)
            .map_err(|e| parse_error(path, e)),
    }
}

/// Read every category record from a data file.
pub fn read_categories(path: &Path) -> Result<Vec<CategoryData>, DataLoadError> {
    deserialize_list::<CategoryData, TomlCategories>(path, |wrapper| wrapper.categories)
}

/// Read every tech record from a data file.
pub fn read_techs(path: &Path) -> Result<Vec<TechData>, DataLoadError> {
    deserialize_list::<TechData, TomlTechs>(path, |wrapper| wrapper.techs)
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Load `categories.*` and `techs.*` from `dir` and build a validated index.
pub fn load_tech_set(dir: &Path) -> Result<TechIndex, DataLoadError> {
    info!(dir = %dir.display(), "loading tech set");
    let categories_path = require_data_file(dir, "categories")?;
    let techs_path = require_data_file(dir, "techs")?;
    load_tech_set_from_files(&categories_path, &techs_path)
}

/// Build a validated index from an explicit pair of data files.
pub fn load_tech_set_from_files(
    categories_path: &Path,
    techs_path: &Path,
) -> Result<TechIndex, DataLoadError> {
    let categories = read_categories(categories_path)?;
    let techs = read_techs(techs_path)?;
    debug!(
        categories = categories.len(),
        techs = techs.len(),
        "parsed tech content"
    );

    let mut builder = TechIndexBuilder::new();
    for category in categories {
        builder
            .register_category(category.into())
            .map_err(|err| attribute_duplicate(err, categories_path))?;
    }
    for tech in techs {
        builder
            .register_tech(tech.into())
            .map_err(|err| attribute_duplicate(err, techs_path))?;
    }

    let index = builder.build()?;
    info!(
        techs = index.tech_count(),
        categories = index.category_count(),
        "tech set loaded"
    );
    Ok(index)
}

/// Duplicate names are reported against the file they came from; every
/// other registration error passes through unchanged.
fn attribute_duplicate(err: TechGraphError, file: &Path) -> DataLoadError {
    match err {
        TechGraphError::DuplicateTech(name) | TechGraphError::DuplicateCategory(name) => {
            DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name,
            }
        }
        other => DataLoadError::Graph(other),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
