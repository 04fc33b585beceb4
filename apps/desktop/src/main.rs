use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ClientConfig, Credentials, PortalClient, RequestState, SubmitOutcome};
use serde::Deserialize;
use shared::{
    course::{calculate_metrics, organize_modules, validate_structure, CourseModule, SortBy},
    domain::CourseId,
};
use storage::SqliteIdentityStore;
use tokio::sync::broadcast;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Course portal client")]
struct Args {
    /// Backend base address, e.g. http://127.0.0.1:8787
    #[arg(long, env = "PORTAL_API_URL", default_value = "http://127.0.0.1:8787")]
    api_url: String,
    /// SQLite database holding the signed-in identity.
    #[arg(long, env = "PORTAL_IDENTITY_DB", default_value = "./data/identity.db")]
    identity_db: PathBuf,
    #[arg(long, env = "PORTAL_TIMEOUT_SECS", default_value_t = 15)]
    timeout_secs: u64,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the account locally.
    Login {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },
    /// Show lesson progress for a course.
    Progress {
        #[arg(long, default_value = "course1")]
        course_id: String,
    },
    /// Forget the signed-in account.
    Logout,
    /// Print the signed-in account, if any.
    Whoami,
    /// Summarize a course definition file (TOML with [[modules]]).
    CourseReport {
        file: PathBuf,
        #[arg(long, default_value = "order")]
        sort_by: SortBy,
    },
}

#[derive(Debug, Deserialize)]
struct CourseFile {
    #[serde(default)]
    title: Option<String>,
    modules: Vec<CourseModule>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    match &args.command {
        Command::Login { email, password } => {
            let client = connect(&args).await?;
            let mut states = client.login_controller().subscribe();
            let outcome = client
                .login(Credentials::new(email.as_str(), password.as_str()))
                .await?;
            print_transitions(&mut states);
            Ok(report(outcome, args.json, |session| {
                format!("Logged in as {}", session.user_id)
            }))
        }
        Command::Progress { course_id } => {
            let client = connect(&args).await?;
            let mut states = client.progress_controller().subscribe();
            let outcome = client
                .course_progress(CourseId::new(course_id.as_str()))
                .await?;
            print_transitions(&mut states);
            Ok(report(outcome, args.json, |progress| {
                format!(
                    "{} ({}%)",
                    progress.summary(),
                    progress.rounded_percentage()
                )
            }))
        }
        Command::Logout => {
            connect(&args).await?.logout().await?;
            println!("Logged out");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            match connect(&args).await?.current_user().await? {
                Some(user) => println!("{user}"),
                None => println!("Not logged in"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::CourseReport { file, sort_by } => {
            course_report(file, *sort_by, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn connect(args: &Args) -> Result<PortalClient> {
    let database_url = format!(
        "sqlite://{}",
        args.identity_db.to_string_lossy().replace('\\', "/")
    );
    let identity = SqliteIdentityStore::new(&database_url)
        .await
        .with_context(|| format!("failed to open identity store at {database_url}"))?;
    let config = ClientConfig::new(&args.api_url)?
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    PortalClient::new(config, Arc::new(identity))
}

fn print_transitions<T: Clone>(states: &mut broadcast::Receiver<RequestState<T>>) {
    while let Ok(state) = states.try_recv() {
        debug!(state = state.label(), "controller state");
        if matches!(state, RequestState::InFlight) {
            eprintln!("Loading...");
        }
    }
}

fn report<T: serde::Serialize>(
    outcome: SubmitOutcome<T>,
    json: bool,
    describe: impl Fn(&T) -> String,
) -> ExitCode {
    match outcome {
        SubmitOutcome::Success(value) => {
            if json {
                match serde_json::to_string_pretty(&value) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(err) => eprintln!("failed to render result: {err}"),
                }
            } else {
                println!("{}", describe(&value));
            }
            ExitCode::SUCCESS
        }
        SubmitOutcome::Failure(reason) => {
            eprintln!("{reason}");
            ExitCode::FAILURE
        }
        SubmitOutcome::Ignored => {
            eprintln!("A request is already in progress");
            ExitCode::FAILURE
        }
    }
}

fn course_report(file: &Path, sort_by: SortBy, json: bool) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read course file {}", file.display()))?;
    let course: CourseFile = toml::from_str(&raw)
        .with_context(|| format!("invalid course file {}", file.display()))?;

    let metrics = calculate_metrics(&course.modules);
    let ordered = organize_modules(&course.modules, sort_by);
    let warnings = validate_structure(&course.modules);

    if json {
        let rendered = serde_json::to_string_pretty(&serde_json::json!({
            "title": course.title,
            "metrics": metrics,
            "modules": ordered,
            "warnings": warnings,
        }))?;
        println!("{rendered}");
        return Ok(());
    }

    if let Some(title) = &course.title {
        println!("{title}");
    }
    println!("Course Metrics:");
    println!("Total Duration: {} minutes", metrics.total_duration);
    println!("Average Difficulty: {}/5", metrics.average_difficulty);
    println!("Total Exercises: {}", metrics.total_exercises);

    println!("\nModules by {sort_by:?}:");
    for (position, module) in ordered.iter().enumerate() {
        let title = module
            .title
            .clone()
            .unwrap_or_else(|| format!("Module {}", position + 1));
        println!(
            "- {title} (order {}, {} min, difficulty {})",
            module.order, module.duration, module.difficulty
        );
    }

    if warnings.is_empty() {
        println!("\nNo structure warnings found.");
    } else {
        println!("\nStructure Warnings:");
        for warning in warnings {
            println!("- {warning}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
