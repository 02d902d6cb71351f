//! Configuration for the `TeamBoard` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/teamboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use teamboard_proto::task::{Difficulty, TaskStatus};

use crate::session::SessionContext;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    session: SessionFileConfig,
    store: StoreFileConfig,
    board: BoardFileConfig,
    log: LogFileConfig,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    team_id: Option<String>,
    user_id: Option<String>,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    data_file: Option<PathBuf>,
}

/// `[board]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    snapshot_timeout_ms: Option<u64>,
}

/// `[log]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LogFileConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Team whose board is shown. Without one every column stays empty.
    pub team_id: Option<String>,
    /// Signed-in user.
    pub user_id: Option<String>,
    /// File the local document store is persisted to.
    pub data_file: PathBuf,
    /// How long to wait for the first snapshot of each column.
    pub snapshot_timeout: Duration,
    /// Log level filter string.
    pub log_level: String,
    /// Log file path (default: `$TMPDIR/teamboard.log`).
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            team_id: None,
            user_id: None,
            data_file: default_data_file(),
            snapshot_timeout: Duration::from_millis(2000),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and silently
    /// ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > env > file > default. Clap fills `cli` from the env.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            team_id: cli.team.clone().or_else(|| file.session.team_id.clone()),
            user_id: cli.user.clone().or_else(|| file.session.user_id.clone()),
            data_file: cli
                .data_file
                .clone()
                .or_else(|| file.store.data_file.clone())
                .unwrap_or(defaults.data_file),
            snapshot_timeout: file
                .board
                .snapshot_timeout_ms
                .map_or(defaults.snapshot_timeout, Duration::from_millis),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.log.level.clone())
                .unwrap_or(defaults.log_level),
            log_file: cli.log_file.clone().or_else(|| file.log.file.clone()),
        }
    }

    /// The session described by this configuration.
    #[must_use]
    pub fn session(&self) -> SessionContext {
        let mut session = SessionContext::new();
        if let Some(user) = &self.user_id {
            session = session.with_user(user.clone());
        }
        if let Some(team) = &self.team_id {
            session = session.with_team(team.clone());
        }
        session
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Realtime Kanban task board")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/teamboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Team whose board to use.
    #[arg(long, env = "TEAMBOARD_TEAM")]
    pub team: Option<String>,

    /// Signed-in user id.
    #[arg(long, env = "TEAMBOARD_USER")]
    pub user: Option<String>,

    /// Path to the board data file.
    #[arg(long, env = "TEAMBOARD_DATA")]
    pub data_file: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, env = "TEAMBOARD_LOG")]
    pub log_level: Option<String>,

    /// Path to log file (default: `$TMPDIR/teamboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do. Defaults to `list`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Board operations available from the command line.
#[derive(clap::Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print every column of the board.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Create a task.
    Add {
        /// Task title.
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Column to create the task in (todo, inProgress, completed).
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        /// veryEasy, easy, normal, hard or veryHard.
        #[arg(long, default_value = "easy")]
        difficulty: Difficulty,
        #[arg(long)]
        pinned: bool,
    },
    /// Drag a task to another column.
    Move {
        /// Task id.
        id: String,
        /// Target column.
        status: TaskStatus,
    },
    /// Drop a raw drag payload (e.g. `"Task <id>"`) onto a column.
    Drop {
        payload: String,
        #[arg(long)]
        column: TaskStatus,
    },
    /// Edit fields of an existing task. Each given field is written on its own.
    Edit {
        /// Task id.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Completion percentage, clamped to 0..=100.
        #[arg(long)]
        progress: Option<f64>,
        #[arg(long)]
        pinned: Option<bool>,
        /// RFC 3339 due date; enables the deadline.
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
    },
    /// Delete a task.
    Delete {
        /// Task id.
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_data_file() -> PathBuf {
    dirs::data_dir().map_or_else(
        || std::env::temp_dir().join("teamboard-board.bin"),
        |dir| dir.join("teamboard").join("board.bin"),
    )
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("teamboard").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
