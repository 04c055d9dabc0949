use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use taskhub_shared::TaskId;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskhub",
    version,
    about = "TaskHub: manage your tasks from the terminal",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config override, e.g. `--rc toast.display_ms=5000`.
    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Server API root, e.g. `http://127.0.0.1:8000/api`.
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    #[arg(long = "session-file", global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long = "full-name")]
        full_name: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long = "password-confirm")]
        password_confirm: Option<String>,
    },
    /// Sign in and show your tasks.
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    #[command(subcommand)]
    Tasks(TaskCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Password(PasswordCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// File to attach.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Show {
        id: TaskId,
    },
    /// Change a task; omitted fields keep their current value.
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Rm {
        id: TaskId,
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every task.
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "full-name")]
        full_name: Option<String>,
        /// YYYY-MM-DD
        #[arg(long = "date-of-birth")]
        date_of_birth: Option<NaiveDate>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long = "mobile-number")]
        mobile_number: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PasswordCommand {
    Reset {
        #[arg(long)]
        old: Option<String>,
        #[arg(long)]
        new: Option<String>,
        #[arg(long)]
        confirm: Option<String>,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Reads one line from stdin after printing `label` to stderr.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("failed to read {label}"))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Returns the given value or asks for it.
pub fn value_or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(label),
    }
}

/// `y`/`yes` confirms; anything else declines.
pub fn confirm(question: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let answer = prompt(&format!("{question} [y/N]"))?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
