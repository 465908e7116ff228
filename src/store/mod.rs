//! In-memory record store.
//!
//! The store owns the dataset for the length of a session together with
//! the path of its backing file. Mutations only touch memory; callers
//! save explicitly after each one.

pub mod persistence;

use crate::error::{PersistenceError, RecordError};
use crate::models::{Dataset, Score, ScoreRange, Student, StudentId};
use crate::validation::{is_valid_subject, normalize_name};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the dataset and knows where to persist it.
#[derive(Debug)]
pub struct RecordStore {
    data: Dataset,
    path: PathBuf,
    range: ScoreRange,
    dirty: bool,
}

impl RecordStore {
    /// Creates a store over an already loaded dataset.
    pub fn new(data: Dataset, path: impl Into<PathBuf>, range: ScoreRange) -> Self {
        Self {
            data,
            path: path.into(),
            range,
            dirty: false,
        }
    }

    /// Loads the dataset at `path`, falling back to an empty seeded one.
    pub fn open(path: impl Into<PathBuf>, id_start: StudentId, range: ScoreRange) -> Self {
        let path = path.into();
        let mut data = persistence::load_or_seed(&path, id_start);

        match data.repair(range) {
            Ok(0) => {}
            Ok(repairs) => warn!(
                "Repaired {} invalid entries in {}",
                repairs,
                path.display()
            ),
            Err(e) => {
                warn!("Cannot use {}: {}; starting empty", path.display(), e);
                data = Dataset::seeded(id_start);
            }
        }

        Self::new(data, path, range)
    }

    /// Read-only view of the dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn range(&self) -> ScoreRange {
        self.range
    }

    /// Returns true if there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the whole dataset to the backing file.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        persistence::save(&self.path, &self.data)?;
        self.dirty = false;
        Ok(())
    }

    /// Adds a student and returns the identifier assigned to it.
    ///
    /// The name is title-cased before it is stored.
    pub fn create_student(&mut self, name: &str) -> Result<StudentId, RecordError> {
        let name = normalize_name(name)?;

        let id = self.data.next_id;
        let next_id = id.checked_add(1).ok_or(RecordError::IdsExhausted)?;
        info!("Added student {} - {}", id, name);
        self.data.students.insert(id, Student::new(name));
        self.data.next_id = next_id;
        self.dirty = true;

        Ok(id)
    }

    /// Removes a student. Its identifier is never handed out again.
    pub fn delete_student(&mut self, id: StudentId) -> Result<Student, RecordError> {
        let student = self
            .data
            .students
            .remove(&id)
            .ok_or(RecordError::StudentNotFound(id))?;
        self.dirty = true;

        info!("Deleted student {} - {}", id, student.name);
        Ok(student)
    }

    /// Inserts or overwrites a subject score. Returns the previous score.
    pub fn set_score(
        &mut self,
        id: StudentId,
        subject: &str,
        score: Score,
    ) -> Result<Option<Score>, RecordError> {
        if !is_valid_subject(subject) {
            return Err(RecordError::InvalidInput(format!(
                "invalid subject name '{}'",
                subject
            )));
        }
        if !self.range.contains(score) {
            return Err(RecordError::InvalidInput(format!(
                "score {} is outside {}",
                score, self.range
            )));
        }

        let student = self
            .data
            .students
            .get_mut(&id)
            .ok_or(RecordError::StudentNotFound(id))?;
        let previous = student.scores.insert(subject.to_string(), score);
        self.dirty = true;

        info!("Set {} -> {}: {}", student.name, subject, score);
        Ok(previous)
    }

    /// Removes one subject score from a student. Returns the removed score.
    pub fn remove_score(&mut self, id: StudentId, subject: &str) -> Result<Score, RecordError> {
        let student = self
            .data
            .students
            .get_mut(&id)
            .ok_or(RecordError::StudentNotFound(id))?;

        // shift_remove keeps the remaining subjects in insertion order
        let score = student
            .scores
            .shift_remove(subject)
            .ok_or_else(|| RecordError::SubjectNotFound {
                id,
                subject: subject.to_string(),
            })?;
        self.dirty = true;

        info!("Removed {} from {}", subject, student.name);
        Ok(score)
    }

    /// Looks up a single student.
    pub fn student(&self, id: StudentId) -> Result<&Student, RecordError> {
        self.data
            .students
            .get(&id)
            .ok_or(RecordError::StudentNotFound(id))
    }

    /// All students in identifier order.
    pub fn list_students(&self) -> Vec<(StudentId, &Student)> {
        self.data
            .students
            .iter()
            .map(|(id, student)| (*id, student))
            .collect()
    }

    /// Case-insensitive partial name search, in identifier order.
    pub fn search_by_name(&self, query: &str) -> Vec<(StudentId, &Student)> {
        let needle = query.trim().to_lowercase();
        debug!("Searching for '{}'", needle);

        self.data
            .students
            .iter()
            .filter(|(_, student)| student.name.to_lowercase().contains(&needle))
            .map(|(id, student)| (*id, student))
            .collect()
    }

    /// Every subject recorded for at least one student, sorted.
    pub fn subjects(&self) -> BTreeSet<&str> {
        self.data
            .students
            .values()
            .flat_map(|student| student.scores.keys().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.data.students.is_empty()
    }
}
