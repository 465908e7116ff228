//! Data models for the score record-keeper.
//!
//! This module contains the persisted record types (`Student`, `Dataset`)
//! and the result types produced by the aggregation engine.

use crate::error::RecordError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric student identifier. Persisted as a string key (`"101"`).
pub type StudentId = u32;

/// A single subject score.
pub type Score = u32;

/// Closed range of accepted scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: Score,
    pub max: Score,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: 0, max: 10 }
    }
}

impl ScoreRange {
    pub fn contains(&self, score: Score) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Display name, title-cased on entry.
    pub name: String,
    /// Subject name to score, in insertion order.
    #[serde(default)]
    pub scores: IndexMap<String, Score>,
}

impl Student {
    /// Creates a student with no scores.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scores: IndexMap::new(),
        }
    }

    /// Returns true if at least one score is recorded.
    pub fn has_scores(&self) -> bool {
        !self.scores.is_empty()
    }
}

/// The full record set: every student plus the identifier counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Next identifier to hand out. Only ever increases.
    pub next_id: StudentId,
    /// Students keyed by identifier, iterated in ascending order.
    pub students: BTreeMap<StudentId, Student>,
}

impl Dataset {
    /// Creates an empty dataset whose first identifier is `id_start`.
    pub fn seeded(id_start: StudentId) -> Self {
        Self {
            next_id: id_start,
            students: BTreeMap::new(),
        }
    }

    /// Restores the dataset invariants after loading from disk.
    ///
    /// Bumps `next_id` past the highest identifier and drops scores outside
    /// `range`. Returns the number of repairs made, or `IdsExhausted` when
    /// no identifier is left above the highest one in use.
    pub fn repair(&mut self, range: ScoreRange) -> Result<usize, RecordError> {
        let mut repairs = 0;

        if let Some(&max_id) = self.students.keys().next_back() {
            if self.next_id <= max_id {
                self.next_id = max_id.checked_add(1).ok_or(RecordError::IdsExhausted)?;
                repairs += 1;
            }
        }

        for student in self.students.values_mut() {
            let before = student.scores.len();
            student.scores.retain(|_, score| range.contains(*score));
            repairs += before - student.scores.len();
        }

        Ok(repairs)
    }
}

/// A subject paired with the score it was awarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectScore {
    pub subject: String,
    pub score: Score,
}

/// Highest and lowest score of a single student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extremes {
    pub highest: SubjectScore,
    pub lowest: SubjectScore,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: usize,
    pub id: StudentId,
    pub name: String,
    pub average: f64,
}

/// Average score of one subject across all students.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
    /// Number of students with a score in this subject.
    pub count: usize,
}

/// Best student of one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopScorer {
    pub subject: String,
    pub id: StudentId,
    pub name: String,
    pub score: Score,
}

/// Performance summary of one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub id: StudentId,
    pub name: String,
    pub subject_count: usize,
    pub average: f64,
    pub highest: SubjectScore,
    pub lowest: SubjectScore,
}
