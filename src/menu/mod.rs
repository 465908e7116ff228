//! Interactive text menu.
//!
//! A line-oriented front end over the record store. Input and output are
//! generic so the whole menu can be driven from a byte buffer in tests.

use crate::analysis;
use crate::config::Config;
use crate::error::RecordError;
use crate::models::StudentId;
use crate::report::{self, Table};
use crate::store::RecordStore;
use crate::validation::{normalize_name, normalize_subject, parse_score};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

const MENU: &str = "
==== Quiz Score Manager ====
1. Add New Student
2. Add / Update Student Score
3. Delete a Student
4. Delete a Subject Score (for a student)
5. Show All Scores
6. Highest Scorer Per Subject
7. Average Score Per Subject
8. Student Performance Report
9. Search Student By Name
10. Ranking / Leaderboard
11. Save & Exit
12. Exit without saving";

/// What the main loop does after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// The interactive session.
pub struct Menu<'a, R, W> {
    store: &'a mut RecordStore,
    config: &'a Config,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a mut RecordStore, config: &'a Config, input: R, out: W) -> Self {
        Self {
            store,
            config,
            input,
            out,
        }
    }

    /// Runs until the operator exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            match self.step() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    writeln!(self.out, "\nEnd of input. Exiting.")?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn step(&mut self) -> io::Result<Flow> {
        writeln!(self.out, "{}", MENU)?;
        let choice = self.read_line("Enter choice: ")?;
        debug!("Menu choice: {}", choice);

        match choice.as_str() {
            "1" => self.add_student()?,
            "2" => self.update_score()?,
            "3" => self.delete_student()?,
            "4" => self.delete_subject()?,
            "5" => self.show_all()?,
            "6" => self.top_scorers()?,
            "7" => self.subject_averages()?,
            "8" => self.student_report()?,
            "9" => self.search()?,
            "10" => self.leaderboard()?,
            "11" => {
                match self.store.save() {
                    Ok(()) => writeln!(self.out, "Saved. Goodbye!")?,
                    Err(e) => writeln!(self.out, "Error: could not save data: {}", e)?,
                }
                return Ok(Flow::Exit);
            }
            "12" => {
                if self.store.is_dirty() {
                    writeln!(self.out, "Discarding unsaved changes.")?;
                }
                writeln!(
                    self.out,
                    "Exiting without saving changes (if any). Goodbye!"
                )?;
                return Ok(Flow::Exit);
            }
            _ => writeln!(self.out, "Invalid choice. Enter a number from 1 to 12.")?,
        }

        Ok(Flow::Continue)
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    fn read_nonempty(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let value = self.read_line(prompt)?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.out, "Input cannot be empty. Try again.")?;
        }
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Ok(self.read_line(prompt)?.eq_ignore_ascii_case("y"))
    }

    /// Prompts for an identifier and resolves it against the store.
    fn read_student_id(&mut self, prompt: &str) -> io::Result<Option<StudentId>> {
        let raw = self.read_nonempty(prompt)?;
        match raw.parse::<StudentId>() {
            Ok(id) if self.store.student(id).is_ok() => Ok(Some(id)),
            _ => {
                writeln!(self.out, "Student ID not found.")?;
                Ok(None)
            }
        }
    }

    fn show(&mut self, table: &Table) -> io::Result<()> {
        writeln!(self.out)?;
        write!(self.out, "{}", report::render_text(table))
    }

    fn report_error(&mut self, e: &RecordError) -> io::Result<()> {
        match e {
            RecordError::NoData => writeln!(self.out, "{}", report::NO_RANKING_DATA),
            e if e.is_not_found() => writeln!(self.out, "Not found: {}.", e),
            e => writeln!(self.out, "Error: {}.", e),
        }
    }

    /// Saves after a change when autosave is on.
    fn persist(&mut self) -> io::Result<()> {
        if !self.config.general.autosave {
            return Ok(());
        }
        if let Err(e) = self.store.save() {
            writeln!(self.out, "Error: could not save data: {}", e)?;
        }
        Ok(())
    }

    fn show_students_brief(&mut self) -> io::Result<()> {
        let table = report::roster_table("Students", &self.store.list_students());
        self.show(&table)
    }

    fn add_student(&mut self) -> io::Result<()> {
        let raw = self.read_nonempty("Enter new student name: ")?;
        let name = match normalize_name(&raw) {
            Ok(name) => name,
            Err(e) => return self.report_error(&e),
        };

        match self.store.create_student(&name) {
            Ok(id) => {
                self.persist()?;
                writeln!(self.out, "Added student: {} - {}", id, name)
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn update_score(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.out, "No students available. Add a student first.");
        }
        self.show_students_brief()?;

        let Some(id) = self.read_student_id("Enter student ID to update: ")? else {
            return Ok(());
        };
        let name = self
            .store
            .student(id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        writeln!(self.out, "Selected: {} - {}", id, name)?;

        let known = self.store.subjects().into_iter().collect::<Vec<_>>().join(", ");
        if !known.is_empty() {
            writeln!(self.out, "Known subjects: {}", known)?;
        }

        let subject = loop {
            let raw = self.read_nonempty("Enter subject name (letters & spaces): ")?;
            match normalize_subject(&raw) {
                Ok(subject) => break subject,
                Err(_) => writeln!(
                    self.out,
                    "Invalid subject name. Use letters and spaces only."
                )?,
            }
        };

        let range = self.store.range();
        let raw = self.read_line(&format!("Enter score ({}): ", range))?;
        let score = match parse_score(&raw, range) {
            Ok(score) => score,
            Err(e) => return self.report_error(&e),
        };

        match self.store.set_score(id, &subject, score) {
            Ok(_) => {
                self.persist()?;
                writeln!(self.out, "Updated {} -> {}: {}", name, subject, score)
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn delete_student(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.out, "No students to delete.");
        }
        self.show_students_brief()?;

        let raw = self.read_nonempty("Enter student ID to delete (or 'c' to cancel): ")?;
        if raw.eq_ignore_ascii_case("c") {
            return writeln!(self.out, "Cancelled.");
        }
        let Some(id) = raw.parse::<StudentId>().ok() else {
            return writeln!(self.out, "Student ID not found.");
        };
        let name = match self.store.student(id) {
            Ok(student) => student.name.clone(),
            Err(e) => return self.report_error(&e),
        };

        if !self.confirm(&format!("Confirm delete {} - {}? (y/n): ", id, name))? {
            return writeln!(self.out, "Cancelled.");
        }
        match self.store.delete_student(id) {
            Ok(_) => {
                self.persist()?;
                writeln!(self.out, "Student deleted.")
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn delete_subject(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.out, "No students available.");
        }
        self.show_students_brief()?;

        let Some(id) = self.read_student_id("Enter student ID: ")? else {
            return Ok(());
        };
        let (name, subjects) = match self.store.student(id) {
            Ok(s) => (s.name.clone(), s.scores.keys().cloned().collect::<Vec<_>>()),
            Err(e) => return self.report_error(&e),
        };
        if subjects.is_empty() {
            return writeln!(self.out, "{}", report::NO_STUDENT_SCORES);
        }

        writeln!(self.out, "Subjects for {} - {}:", id, name)?;
        for subject in &subjects {
            writeln!(self.out, " - {}", subject)?;
        }

        let raw = self.read_nonempty("Enter subject to remove: ")?;
        let subject = crate::validation::title_case(&raw);
        if !subjects.contains(&subject) {
            return writeln!(self.out, "Subject not found for this student.");
        }

        if !self.confirm(&format!("Confirm delete {} for {}? (y/n): ", subject, name))? {
            return writeln!(self.out, "Cancelled.");
        }
        match self.store.remove_score(id, &subject) {
            Ok(_) => {
                self.persist()?;
                writeln!(self.out, "Subject removed.")
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn show_all(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.out, "No records.");
        }
        let table = report::details_table(&self.store.list_students());
        self.show(&table)
    }

    fn top_scorers(&mut self) -> io::Result<()> {
        match analysis::top_scorer_per_subject(self.store.dataset()) {
            Ok(scorers) => {
                let table = report::top_scorer_table(&scorers);
                self.show(&table)
            }
            Err(RecordError::NoData) => writeln!(self.out, "{}", report::NO_SUBJECT_DATA),
            Err(e) => self.report_error(&e),
        }
    }

    fn subject_averages(&mut self) -> io::Result<()> {
        match analysis::per_subject_average(self.store.dataset()) {
            Ok(stats) => {
                let table = report::subject_average_table(&stats);
                self.show(&table)
            }
            Err(RecordError::NoData) => writeln!(self.out, "{}", report::NO_SUBJECT_DATA),
            Err(e) => self.report_error(&e),
        }
    }

    fn student_report(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return writeln!(self.out, "{}", report::NO_STUDENTS);
        }
        self.show_students_brief()?;

        let Some(id) = self.read_student_id("Enter student ID for report: ")? else {
            return Ok(());
        };
        let result = self
            .store
            .student(id)
            .and_then(|student| analysis::student_report(id, student));

        match result {
            Ok(report) => {
                let table = report::student_report_table(&report);
                self.show(&table)
            }
            Err(RecordError::NoData) => writeln!(self.out, "{}", report::NO_STUDENT_SCORES),
            Err(e) => self.report_error(&e),
        }
    }

    fn search(&mut self) -> io::Result<()> {
        let query = self.read_nonempty("Enter name to search (partial allowed): ")?;
        let found = self.store.search_by_name(&query);
        if found.is_empty() {
            return writeln!(self.out, "{}", report::NO_MATCHES);
        }
        let table = report::roster_table("Matches", &found);
        self.show(&table)
    }

    fn leaderboard(&mut self) -> io::Result<()> {
        let top_n = Some(self.config.report.leaderboard_top_n);
        match analysis::leaderboard(self.store.dataset(), top_n) {
            Ok(entries) => {
                info!("Leaderboard with {} entries", entries.len());
                let table = report::leaderboard_table(&entries);
                self.show(&table)
            }
            Err(e) => self.report_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, ScoreRange};
    use tempfile::TempDir;

    struct Session {
        _dir: TempDir,
        store: RecordStore,
        config: Config,
    }

    fn session() -> Session {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quiz_data.json");
        let store = RecordStore::new(Dataset::seeded(101), path, ScoreRange::default());
        Session {
            _dir: dir,
            store,
            config: Config::default(),
        }
    }

    fn drive(session: &mut Session, input: &str) -> String {
        let mut out = Vec::new();
        Menu::new(
            &mut session.store,
            &session.config,
            input.as_bytes(),
            &mut out,
        )
        .run()
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    /// True if some grid line of `out` holds exactly `expected`.
    fn has_row(out: &str, expected: &[&str]) -> bool {
        out.lines().any(|line| {
            line.starts_with('|')
                && line
                    .trim_matches('|')
                    .split('|')
                    .map(str::trim)
                    .eq(expected.iter().copied())
        })
    }

    #[test]
    fn test_add_student_and_exit() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice smith\n12\n");

        assert!(out.contains("Added student: 101 - Alice Smith"));
        assert!(out.contains("Goodbye!"));
        assert_eq!(s.store.student(101).unwrap().name, "Alice Smith");
    }

    #[test]
    fn test_autosave_writes_after_mutation() {
        let mut s = session();
        drive(&mut s, "1\nBob\n12\n");

        assert!(s.store.path().exists());
        assert!(!s.store.is_dirty());
    }

    #[test]
    fn test_without_autosave_exit_discards() {
        let mut s = session();
        s.config.general.autosave = false;
        drive(&mut s, "1\nBob\n12\n");

        assert!(!s.store.path().exists());
        assert!(s.store.is_dirty());
    }

    #[test]
    fn test_save_and_exit() {
        let mut s = session();
        s.config.general.autosave = false;
        let out = drive(&mut s, "1\nBob\n11\n");

        assert!(out.contains("Saved. Goodbye!"));
        assert!(s.store.path().exists());
    }

    #[test]
    fn test_update_score_retries_bad_subject() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n2\n101\nmath 2\nmath\n8\n12\n");

        assert!(out.contains("Invalid subject name. Use letters and spaces only."));
        assert!(out.contains("Updated Alice -> Math: 8"));
        assert_eq!(s.store.student(101).unwrap().scores["Math"], 8);
    }

    #[test]
    fn test_update_score_rejects_out_of_range() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n2\n101\nmath\n11\n12\n");

        assert!(out.contains("score must be an integer between 0 and 10"));
        assert!(!s.store.student(101).unwrap().has_scores());
    }

    #[test]
    fn test_update_unknown_student() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n2\n999\n12\n");
        assert!(out.contains("Student ID not found."));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n3\n101\nn\n3\n101\ny\n12\n");

        assert!(out.contains("Cancelled."));
        assert!(out.contains("Student deleted."));
        assert!(s.store.is_empty());
    }

    #[test]
    fn test_delete_cancel_with_c() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n3\nc\n12\n");

        assert!(out.contains("Cancelled."));
        assert!(!s.store.is_empty());
    }

    #[test]
    fn test_delete_subject() {
        let mut s = session();
        let out = drive(
            &mut s,
            "1\nalice\n2\n101\nmath\n8\n4\n101\nart\n4\n101\nmath\ny\n12\n",
        );

        assert!(out.contains("Subject not found for this student."));
        assert!(out.contains("Subject removed."));
        assert!(!s.store.student(101).unwrap().has_scores());
    }

    #[test]
    fn test_leaderboard_and_reports() {
        let mut s = session();
        let out = drive(
            &mut s,
            "1\nalice\n1\nbob\n2\n101\nmath\n8\n2\n101\nenglish\n6\n2\n102\nmath\n9\n10\n7\n6\n8\n101\n12\n",
        );

        assert!(has_row(&out, &["1", "102", "Bob", "9.00"]));
        assert!(has_row(&out, &["2", "101", "Alice", "7.00"]));
        assert!(out.contains("Average score per subject:"));
        assert!(has_row(&out, &["Math", "8.50", "2"]));
        assert!(out.contains("Highest scorers per subject:"));
        assert!(out.contains("Report for 101 - Alice:"));
        assert!(has_row(&out, &["Highest", "Math (8)"]));
    }

    #[test]
    fn test_empty_leaderboard_reports_no_data() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n10\n12\n");
        assert!(out.contains(report::NO_RANKING_DATA));
    }

    #[test]
    fn test_search() {
        let mut s = session();
        let out = drive(&mut s, "1\nalice\n1\nbob\n9\nALI\n9\nzed\n12\n");

        assert!(out.contains("Matches:"));
        assert!(out.contains(report::NO_MATCHES));
    }

    #[test]
    fn test_empty_input_reprompts() {
        let mut s = session();
        let out = drive(&mut s, "1\n\n  \ncarol\n12\n");

        assert!(out.contains("Input cannot be empty. Try again."));
        assert!(out.contains("Added student: 101 - Carol"));
    }

    #[test]
    fn test_invalid_choice() {
        let mut s = session();
        let out = drive(&mut s, "42\n12\n");
        assert!(out.contains("Invalid choice."));
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let mut s = session();
        let out = drive(&mut s, "1\n");
        assert!(out.contains("End of input. Exiting."));
    }
}
