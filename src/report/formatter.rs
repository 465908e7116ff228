//! Report tables and their renderings.
//!
//! Aggregation results are first turned into a [`Table`] (a title, fixed
//! headers and ordered rows of display strings) and then rendered as a
//! comfy-table grid or as Markdown. JSON output serializes the raw results instead, so
//! averages keep full precision there.

use crate::models::{LeaderboardEntry, Student, StudentId, StudentReport, SubjectAverage, TopScorer};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{presets, Cell, Table as Grid};
use serde::Serialize;

pub const NO_RANKING_DATA: &str = "No score data to rank.";
pub const NO_SUBJECT_DATA: &str = "No subjects recorded yet.";
pub const NO_STUDENT_SCORES: &str = "This student has no scores.";
pub const NO_STUDENTS: &str = "No students.";
pub const NO_MATCHES: &str = "No matches found.";

/// Display-ready report: every row has one cell per header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }
}

/// Rounds an average to two decimals for display.
pub fn format_average(average: f64) -> String {
    format!("{:.2}", average)
}

/// Brief roster: identifier, name and number of scored subjects.
pub fn roster_table(title: &str, students: &[(StudentId, &Student)]) -> Table {
    let mut table = Table::new(title, &["ID", "Name", "Subjects"]);
    for (id, student) in students {
        table.push(vec![
            id.to_string(),
            student.name.clone(),
            student.scores.len().to_string(),
        ]);
    }
    table
}

/// Every student with every score, one row per score.
pub fn details_table(students: &[(StudentId, &Student)]) -> Table {
    let mut table = Table::new("All students and scores", &["ID", "Name", "Subject", "Score"]);
    for (id, student) in students {
        if student.scores.is_empty() {
            table.push(vec![
                id.to_string(),
                student.name.clone(),
                "(no scores)".to_string(),
                String::new(),
            ]);
            continue;
        }
        for (subject, score) in &student.scores {
            table.push(vec![
                id.to_string(),
                student.name.clone(),
                subject.clone(),
                score.to_string(),
            ]);
        }
    }
    table
}

pub fn leaderboard_table(entries: &[LeaderboardEntry]) -> Table {
    let mut table = Table::new(
        "Leaderboard (by average score)",
        &["Rank", "ID", "Name", "Average"],
    );
    for entry in entries {
        table.push(vec![
            entry.rank.to_string(),
            entry.id.to_string(),
            entry.name.clone(),
            format_average(entry.average),
        ]);
    }
    table
}

pub fn subject_average_table(stats: &[SubjectAverage]) -> Table {
    let mut table = Table::new(
        "Average score per subject",
        &["Subject", "Average", "Students"],
    );
    for stat in stats {
        table.push(vec![
            stat.subject.clone(),
            format_average(stat.average),
            stat.count.to_string(),
        ]);
    }
    table
}

pub fn top_scorer_table(scorers: &[TopScorer]) -> Table {
    let mut table = Table::new(
        "Highest scorers per subject",
        &["Subject", "ID", "Name", "Score"],
    );
    for top in scorers {
        table.push(vec![
            top.subject.clone(),
            top.id.to_string(),
            top.name.clone(),
            top.score.to_string(),
        ]);
    }
    table
}

pub fn student_report_table(report: &StudentReport) -> Table {
    let mut table = Table::new(
        format!("Report for {} - {}", report.id, report.name),
        &["Field", "Value"],
    );
    table.push(vec![
        "Total subjects".to_string(),
        report.subject_count.to_string(),
    ]);
    table.push(vec![
        "Average score".to_string(),
        format_average(report.average),
    ]);
    table.push(vec![
        "Highest".to_string(),
        format!("{} ({})", report.highest.subject, report.highest.score),
    ]);
    table.push(vec![
        "Lowest".to_string(),
        format!("{} ({})", report.lowest.subject, report.lowest.score),
    ]);
    table
}

/// Plain text: the title line followed by a bordered grid.
pub fn render_text(table: &Table) -> String {
    let mut grid = Grid::new();
    grid.load_preset(presets::ASCII_FULL_CONDENSED);
    grid.set_header(table.headers.iter().map(Cell::new));
    for row in &table.rows {
        grid.add_row(row.iter().map(Cell::new));
    }

    format!("{}:\n{}\n", table.title, grid)
}

/// Markdown heading followed by a pipe table.
pub fn render_markdown(table: &Table) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}\n\n", table.title));
    output.push_str(&format!("| {} |\n", table.headers.join(" | ")));
    output.push_str(&format!(
        "|{}|\n",
        table
            .headers
            .iter()
            .map(|_| ":---")
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    output.push('\n');

    output
}

/// Envelope for JSON output.
#[derive(Debug, Serialize)]
struct JsonReport<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    title: &'a str,
    data: &'a T,
}

/// Serializes raw aggregation results with a timestamp.
pub fn render_json<T: Serialize>(title: &str, data: &T) -> Result<String> {
    let report = JsonReport {
        generated_at: Utc::now(),
        title,
        data,
    };
    serde_json::to_string_pretty(&report).map_err(Into::into)
}
