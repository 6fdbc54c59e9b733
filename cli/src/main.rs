use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use pw_core::{Outcome, Status};
use pw_sqlite::{CredentialStore, with_handle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::PwConfig;
use output::{OutputFormat, format_listing, format_outcome};

#[derive(Debug, Parser)]
#[command(name = "pw")]
#[command(about = "Store and retrieve application user names and passwords")]
#[command(version)]
struct Cli {
    /// Store file path (default: `store` next to the pw executable).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Configuration file (default: `pw.yaml` next to the pw executable).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, global = true)]
    format: Option<OutputFormat>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the user name and password stored for an app.
    Get(GetArgs),
    /// Store or replace the user name and password for an app.
    Set(SetArgs),
    /// Remove the credentials stored for an app.
    Rm(RmArgs),
    /// Dump stored apps (or all columns with --all-data).
    Dump(DumpArgs),
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Application name (case-insensitive).
    app: String,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Application name (case-insensitive).
    app: String,
    /// User name.
    user: String,
    /// Password.
    password: String,
}

#[derive(Debug, Args)]
struct RmArgs {
    /// Application name (case-insensitive).
    app: String,
}

#[derive(Debug, Args)]
struct DumpArgs {
    /// Write the dump to a file instead of stdout.
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Include every column, not just app names.
    #[arg(long)]
    all_data: bool,
}

/// Settings resolved from flags, config file and defaults.
struct Settings {
    store: PathBuf,
    format: OutputFormat,
    min_password_length: usize,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(Status::Failed) => std::process::exit(1),
        Ok(_) => {}
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<Status, String> {
    let install_dir = config::install_dir()?;
    let config = match &cli.config {
        Some(path) => PwConfig::load(path)?,
        None => PwConfig::load_from_install_dir(&install_dir)?,
    };
    init_logging(&config.log_level, cli.verbose);

    let settings = Settings {
        store: cli.db.unwrap_or_else(|| config.store_path(&install_dir)),
        format: cli.format.unwrap_or(config.format),
        min_password_length: config.min_password_length,
    };
    debug!(store = %settings.store.display(), "resolved store path");

    match cli.command {
        Command::Get(args) => run_get(args, &settings),
        Command::Set(args) => run_set(args, &settings),
        Command::Rm(args) => run_rm(args, &settings),
        Command::Dump(args) => run_dump(args, &settings),
    }
}

/// `RUST_LOG` wins; otherwise the configured level, raised by `-v`.
fn init_logging(level: &str, verbose: u8) {
    let default_level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_get(args: GetArgs, settings: &Settings) -> Result<Status, String> {
    let app = normalize_app(&args.app);
    let outcome = open_store(&settings.store, |store| store.get(&app))?;
    print_outcome(&outcome, settings.format)
}

fn run_set(args: SetArgs, settings: &Settings) -> Result<Status, String> {
    validate_password(&args.password, settings.min_password_length)?;
    let app = normalize_app(&args.app);
    let outcome = open_store(&settings.store, |store| {
        store.set(&app, &args.user, &args.password)
    })?;
    print_outcome(&outcome, settings.format)
}

fn run_rm(args: RmArgs, settings: &Settings) -> Result<Status, String> {
    let app = normalize_app(&args.app);
    let outcome = open_store(&settings.store, |store| store.remove(&app))?;
    print_outcome(&outcome, settings.format)
}

fn run_dump(args: DumpArgs, settings: &Settings) -> Result<Status, String> {
    let outcome = open_store(&settings.store, |store| store.list(args.all_data))?;
    if outcome.status != Status::Success {
        return print_outcome(&outcome, settings.format);
    }
    let rendered = format_listing(&outcome, settings.format)?;

    match &args.file {
        Some(path) => {
            write_dump(path, &rendered)?;
            println!(
                "Wrote {} record(s) to '{}'.",
                outcome.records().len(),
                path.display()
            );
        }
        None => print!("{}", with_trailing_newline(rendered)),
    }
    Ok(outcome.status)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_store<F>(path: &Path, op: F) -> Result<Outcome, String>
where
    F: FnOnce(&CredentialStore<'_>) -> Outcome,
{
    with_handle(path, |handle| op(&CredentialStore::new(handle))).map_err(|e| e.to_string())
}

fn print_outcome(outcome: &Outcome, format: OutputFormat) -> Result<Status, String> {
    let rendered = format_outcome(outcome, format)?;
    print!("{}", with_trailing_newline(rendered));
    Ok(outcome.status)
}

fn write_dump(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, with_trailing_newline(contents.to_string()))
        .map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn with_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// App names are stored lowercase.
fn normalize_app(app: &str) -> String {
    app.trim().to_lowercase()
}

fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "password needs to be at least {min_length} characters"
        ));
    }
    Ok(())
}
