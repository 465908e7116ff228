//! QuizKeeper - student quiz score record-keeper
//!
//! A CLI tool that keeps student names and per-subject quiz scores in a
//! JSON file and reports averages, leaderboards and subject statistics,
//! either one command at a time or through an interactive menu.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (unknown student or subject, invalid input, config, save failure)
//!   2 - The requested report had no score data

mod analysis;
mod cli;
mod config;
mod error;
mod menu;
mod models;
mod report;
mod store;
mod validation;

use anyhow::{Context, Result};
use cli::{Args, Command, OutputFormat};
use config::Config;
use error::RecordError;
use models::{Student, StudentId};
use report::Table;
use serde::Serialize;
use store::RecordStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const EXIT_ERROR: i32 = 1;
const EXIT_NO_DATA: i32 = 2;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_ERROR);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("QuizKeeper v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let command = args.command();
    match run(args) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<RecordError>() {
            Some(RecordError::NoData) => {
                println!("{}", no_data_message(&command));
                std::process::exit(EXIT_NO_DATA);
            }
            _ => {
                error!("Command failed: {:#}", e);
                eprintln!("Error: {:#}", e);
                std::process::exit(EXIT_ERROR);
            }
        },
    }
}

/// Handle --init-config: generate a default .quizkeeper.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(EXIT_ERROR);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to change the data file, starting ID, score range and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration, open the store and execute the requested command.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let mut store = RecordStore::open(
        config.storage.data_file.clone(),
        config.storage.id_start,
        config.scores.range(),
    );

    // First run: create the data file right away
    if !store.path().exists() {
        match store.save() {
            Ok(()) => info!("Created data file {}", store.path().display()),
            Err(e) => warn!("Could not create data file: {}", e),
        }
    }

    run_command(args.command(), &mut store, &config, args.format)
}

/// Execute one command against the store.
fn run_command(
    command: Command,
    store: &mut RecordStore,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Command::Add { name } => {
            let id = store.create_student(&name.join(" "))?;
            save(store)?;
            let student = store.student(id)?;
            println!("Added student: {} - {}", id, student.name);
        }
        Command::SetScore { id, subject, score } => {
            let subject = validation::normalize_subject(&subject)?;
            let score = validation::parse_score(&score, store.range())?;
            store.set_score(id, &subject, score)?;
            save(store)?;
            println!("Updated {} -> {}: {}", store.student(id)?.name, subject, score);
        }
        Command::RemoveScore { id, subject } => {
            let subject = validation::title_case(&subject);
            store.remove_score(id, &subject)?;
            save(store)?;
            println!("Removed {} from {}", subject, store.student(id)?.name);
        }
        Command::Delete { id } => {
            let student = store.delete_student(id)?;
            save(store)?;
            println!("Deleted student: {} - {}", id, student.name);
        }
        Command::List { details } => {
            let students = store.list_students();
            if students.is_empty() && format != OutputFormat::Json {
                println!("{}", report::NO_STUDENTS);
                return Ok(());
            }
            let table = if details {
                report::details_table(&students)
            } else {
                report::roster_table("Students", &students)
            };
            emit(format, &table, &student_records(&students))?;
        }
        Command::Search { query } => {
            let found = store.search_by_name(&query);
            if found.is_empty() && format != OutputFormat::Json {
                println!("{}", report::NO_MATCHES);
                return Ok(());
            }
            let table = report::roster_table("Matches", &found);
            emit(format, &table, &student_records(&found))?;
        }
        Command::Report { id } => {
            let report = analysis::student_report(id, store.student(id)?)?;
            emit(format, &report::student_report_table(&report), &report)?;
        }
        Command::Leaderboard { top } => {
            let top_n = top.unwrap_or(config.report.leaderboard_top_n);
            let entries = analysis::leaderboard(store.dataset(), Some(top_n))?;
            emit(format, &report::leaderboard_table(&entries), &entries)?;
        }
        Command::Subjects => {
            let stats = analysis::per_subject_average(store.dataset())?;
            emit(format, &report::subject_average_table(&stats), &stats)?;
        }
        Command::TopScorers => {
            let scorers = analysis::top_scorer_per_subject(store.dataset())?;
            emit(format, &report::top_scorer_table(&scorers), &scorers)?;
        }
        Command::Menu => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            menu::Menu::new(store, config, stdin.lock(), stdout.lock())
                .run()
                .context("Menu I/O failed")?;
        }
    }

    Ok(())
}

fn save(store: &mut RecordStore) -> Result<()> {
    store
        .save()
        .with_context(|| format!("Could not save data to {}", store.path().display()))
}

/// A student with its identifier, for JSON listings.
#[derive(Serialize)]
struct StudentRecord<'a> {
    id: StudentId,
    #[serde(flatten)]
    student: &'a Student,
}

fn student_records<'a>(students: &[(StudentId, &'a Student)]) -> Vec<StudentRecord<'a>> {
    students
        .iter()
        .map(|(id, student)| StudentRecord { id: *id, student })
        .collect()
}

/// Print a report in the requested format.
fn emit<T: Serialize>(format: OutputFormat, table: &Table, data: &T) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report::render_text(table)),
        OutputFormat::Markdown => print!("{}", report::render_markdown(table)),
        OutputFormat::Json => println!("{}", report::render_json(&table.title, data)?),
    }
    Ok(())
}

/// The message shown when a report has nothing to show.
fn no_data_message(command: &Command) -> &'static str {
    match command {
        Command::Subjects | Command::TopScorers => report::NO_SUBJECT_DATA,
        Command::Report { .. } => report::NO_STUDENT_SCORES,
        _ => report::NO_RANKING_DATA,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
