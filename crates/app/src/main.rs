use std::fmt;
use std::path::PathBuf;

use corso_core::model::{DifficultyFilter, LessonId};
use services::{AppServices, Clock, ContentService};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Command;

const EMBEDDED_LESSONS: &str = include_str!("../content/lessons.json");
const EMBEDDED_QUIZZES: &str = include_str!("../content/quizzes.json");

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidValue {
        flag: &'static str,
        source: corso_core::Error,
    },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command } => write!(f, "{command} requires an id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidValue { flag, source } => write!(f, "invalid {flag} value: {source}"),
        }
    }
}

impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::InvalidValue { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  corso [--db <sqlite_url>] [--content <dir>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  lessons [--search <text>] [--difficulty <all|base|intermedio|avanzato>]");
    eprintln!("  stats");
    eprintln!("  toggle <lesson-id>");
    eprintln!("  completed");
    eprintln!("  quiz <quiz-id|lesson-id>");
    eprintln!("  scores");
    eprintln!("  reset");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://<cwd>/corso.sqlite3");
    eprintln!("  --content built-in course");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CORSO_DB_URL, CORSO_CONTENT_DIR, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    db_url: String,
    content_dir: Option<PathBuf>,
    command: Command,
}

impl Args {
    fn from_env() -> Result<Self, ArgsError> {
        let db_url = std::env::var("CORSO_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| normalize_sqlite_url("corso.sqlite3".into()), normalize_sqlite_url);
        let content_dir = std::env::var_os("CORSO_CONTENT_DIR").map(PathBuf::from);
        Self::parse(std::env::args().skip(1), db_url, content_dir)
    }

    fn parse(
        argv: impl IntoIterator<Item = String>,
        mut db_url: String,
        mut content_dir: Option<PathBuf>,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();
        let mut command = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => {
                    content_dir = Some(PathBuf::from(require_value(&mut args, "--content")?));
                }
                "--help" | "-h" => {
                    command = Some(Command::Help);
                    break;
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => {
                    command = Some(Command::parse(&arg, &mut args)?);
                    break;
                }
            }
        }

        Ok(Self {
            db_url,
            content_dir,
            command: command.unwrap_or(Command::Help),
        })
    }
}

impl Command {
    fn parse(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let command = match name {
            "lessons" => {
                let mut search = String::new();
                let mut difficulty = DifficultyFilter::All;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--search" => search = require_value(args, "--search")?,
                        "--difficulty" => {
                            let value = require_value(args, "--difficulty")?;
                            difficulty = value.parse().map_err(|err| ArgsError::InvalidValue {
                                flag: "--difficulty",
                                source: corso_core::Error::from(err),
                            })?;
                        }
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                return Ok(Command::Lessons { search, difficulty });
            }
            "stats" => Command::Stats,
            "toggle" => {
                let raw = args
                    .next()
                    .ok_or(ArgsError::MissingOperand { command: "toggle" })?;
                let id = LessonId::new(raw).map_err(|err| ArgsError::InvalidValue {
                    flag: "toggle",
                    source: corso_core::Error::from(err),
                })?;
                Command::Toggle(id)
            }
            "completed" => Command::Completed,
            "quiz" => {
                let raw = args
                    .next()
                    .filter(|raw| !raw.trim().is_empty())
                    .ok_or(ArgsError::MissingOperand { command: "quiz" })?;
                Command::Quiz(raw)
            }
            "scores" => Command::Scores,
            "reset" => Command::Reset,
            other => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        match args.next() {
            Some(extra) => Err(ArgsError::UnknownArg(extra)),
            None => Ok(command),
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_content(dir: Option<&std::path::Path>) -> Result<ContentService, services::ContentError> {
    let (content, _issues) = match dir {
        Some(dir) => ContentService::from_dir(dir)?,
        None => ContentService::from_json(EMBEDDED_LESSONS, EMBEDDED_QUIZZES)?,
    };
    Ok(content)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let parsed = Args::from_env().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let content = load_content(parsed.content_dir.as_deref())?;

    // Open + migrate SQLite at startup; core/services never see URLs.
    prepare_sqlite_file(&parsed.db_url)?;
    debug!(db = %parsed.db_url, "opening progress database");
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::system(), content).await?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout().lock();
    commands::execute(&services, parsed.command, &mut input, &mut output).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
