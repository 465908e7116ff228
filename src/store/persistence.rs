//! JSON persistence of the dataset.
//!
//! The whole dataset is read at session start and rewritten after every
//! mutation. A missing or unreadable file never stops a session: the
//! loader falls back to an empty seeded dataset.

use crate::error::PersistenceError;
use crate::models::{Dataset, StudentId};
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads the dataset at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load(path: &Path) -> Result<Option<Dataset>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let data: Dataset =
        serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        "Loaded {} students from {}",
        data.students.len(),
        path.display()
    );
    Ok(Some(data))
}

/// Loads the dataset, or returns an empty one starting at `id_start`.
pub fn load_or_seed(path: &Path, id_start: StudentId) -> Dataset {
    match load(path) {
        Ok(Some(data)) => data,
        Ok(None) => {
            info!("No data file at {}, starting empty", path.display());
            Dataset::seeded(id_start)
        }
        Err(e) => {
            warn!("{}; starting with an empty dataset", e);
            Dataset::seeded(id_start)
        }
    }
}

/// Writes the whole dataset to `path` as pretty-printed JSON.
pub fn save(path: &Path, data: &Dataset) -> Result<(), PersistenceError> {
    let content = serde_json::to_string_pretty(data).map_err(PersistenceError::Encode)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    std::fs::write(path, content).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Saved {} students to {}", data.students.len(), path.display());
    Ok(())
}
