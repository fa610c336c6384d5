//! Layer persistence
//!
//! A [`Layer`] is the serialized form of a [`Stage`](crate::Stage): a flat,
//! parent-before-child list of prim specs plus stage metadata, stored as RON.
//! Writes go to a temporary file in the destination directory and are then
//! atomically moved into place, so a failed export never leaves a partially
//! written layer behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StageError;
use crate::prim::PrimSpec;

/// Inclusive animation frame range of a stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, frame: i64) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}

/// Serialized stage contents
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer identifier (for display/debugging)
    pub identifier: String,
    /// Name of the root prim that references without a prim path target
    #[serde(default)]
    pub default_prim: Option<String>,
    /// Animation frame range
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    /// Prim specs, parents before children, siblings in authoring order
    #[serde(default)]
    pub prims: Vec<PrimSpec>,
}

impl Layer {
    /// Render the layer as pretty RON text
    pub fn to_ron_string(&self) -> Result<String, StageError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Parse a layer from RON text
    pub fn from_ron_str(contents: &str) -> Result<Self, StageError> {
        Ok(ron::from_str(contents)?)
    }
}

/// What an export does when the destination already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Leave an existing layer untouched
    SkipIfExists,
    /// Replace an existing layer wholesale
    #[default]
    Overwrite,
}

/// Result of an export call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The layer was written
    Written,
    /// The destination existed and the policy was [`WritePolicy::SkipIfExists`]
    Skipped,
}

/// Check whether a persisted layer exists at `path`
///
/// Something other than a regular file at `path` (a directory, for one) is
/// an error, never a layer.
pub fn layer_exists(path: impl AsRef<Path>) -> Result<bool, StageError> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(_) => Err(StageError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} exists but is not a layer file", path.display()),
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Write `contents` to `path` via a temporary sibling file and an atomic rename
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), StageError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
