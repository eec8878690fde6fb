//! Binary snapshots of a validated tech set.
//!
//! A snapshot stores the categories and tech definitions, encoded with
//! `bitcode` behind a versioned header. Restoring a snapshot goes through
//! [`crate::TechIndexBuilder`] again, so a tampered or stale payload can
//! never produce an index that skipped validation.

use crate::category::TechCategory;
use crate::error::TechGraphError;
use crate::index::TechIndex;
use crate::tech::TechDef;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a tech set snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x7EC4_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot holds an invalid tech set: {0}")]
    Graph(#[from] TechGraphError),
}

// ---------------------------------------------------------------------------
// Wire layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: u32,
    version: u32,
}

impl SnapshotHeader {
    fn current() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TechSetSnapshot {
    header: SnapshotHeader,
    categories: Vec<TechCategory>,
    techs: Vec<TechDef>,
}

impl TechIndex {
    /// Encode this tech set into a binary snapshot.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let (categories, techs) = self.definitions();
        let snapshot = TechSetSnapshot {
            header: SnapshotHeader::current(),
            categories,
            techs,
        };
        bitcode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode a snapshot and rebuild the index, re-running every check.
    pub fn from_snapshot(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: TechSetSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        debug!(
            techs = snapshot.techs.len(),
            categories = snapshot.categories.len(),
            "restoring tech set snapshot"
        );
        Ok(TechIndex::from_parts(snapshot.categories, snapshot.techs)?)
    }
}
