//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::StudentId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QuizKeeper - student quiz score record-keeper
///
/// Keeps student names and per-subject scores in a JSON file and reports
/// averages, leaderboards and per-subject statistics. Runs the interactive
/// menu when no subcommand is given.
///
/// Examples:
///   quizkeeper add alice smith
///   quizkeeper set-score 101 math 8
///   quizkeeper leaderboard --top 5
///   quizkeeper subjects --format markdown
///   quizkeeper --data class_b.json menu
///   quizkeeper --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path of the JSON data file
    ///
    /// Overrides `storage.data_file` from the config file.
    #[arg(long, value_name = "FILE", env = "QUIZKEEPER_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .quizkeeper.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for reports (text, markdown, json)
    #[arg(long, default_value = "text", value_name = "FORMAT", global = true)]
    pub format: OutputFormat,

    /// Generate a default .quizkeeper.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// One request against the record store.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new student (name is title-cased)
    Add {
        /// Student name; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Add or update a subject score
    SetScore {
        id: StudentId,
        /// Subject name (letters and spaces)
        subject: String,
        #[arg(allow_hyphen_values = true)]
        score: String,
    },

    /// Remove a subject score from a student
    RemoveScore { id: StudentId, subject: String },

    /// Delete a student
    Delete { id: StudentId },

    /// List students
    List {
        /// Show every score of every student
        #[arg(long)]
        details: bool,
    },

    /// Search students by (partial) name
    Search { query: String },

    /// Performance report for one student
    Report { id: StudentId },

    /// Rank students by average score
    Leaderboard {
        /// Number of entries to show (default from config)
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Average score per subject
    Subjects,

    /// Highest scorer per subject
    TopScorers,

    /// Interactive text menu
    Menu,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain text (default)
    #[default]
    Text,
    /// Markdown table
    Markdown,
    /// JSON document with unrounded values
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The requested command; the menu when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Menu)
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(Command::Leaderboard { top: Some(0) }) = self.command {
            return Err("--top must be at least 1".to_string());
        }

        if let Some(Command::Menu) | None = self.command {
            if self.format != OutputFormat::Text {
                return Err("--format only applies to report commands".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// Human-facing output goes through stdout, so the default only
    /// surfaces warnings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}
