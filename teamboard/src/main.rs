//! `TeamBoard`: realtime Kanban task board.
//!
//! Opens the board of the configured team against the local document store,
//! runs one command and persists the store again. Configuration via CLI
//! flags, environment variables, or config file
//! (`~/.config/teamboard/config.toml`).
//!
//! ```bash
//! # Show the board
//! cargo run --bin teamboard -- --team design list
//!
//! # Create a task and drag it to "in progress"
//! cargo run --bin teamboard -- --team design add "Draft logo" --difficulty hard
//! cargo run --bin teamboard -- --team design move <id> inProgress
//!
//! # Or via environment variables
//! TEAMBOARD_TEAM=design cargo run --bin teamboard -- list --json
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use teamboard::board::{Board, DropReport, EditorError, PendingWrite, TaskEditor};
use teamboard::config::{CliArgs, ClientConfig, Command};
use teamboard::store::StoreError;
use teamboard::store::memory::MemoryStore;
use teamboard_proto::drag::encode_task;
use teamboard_proto::task::{DecodeError, Task, TaskFieldUpdate, TaskId, TaskStatus};

/// Errors that end a command.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("invalid task id: {0}")]
    InvalidId(#[from] DecodeError),

    #[error("no task with id {0} on this board")]
    UnknownTask(TaskId),

    #[error("failed to encode board: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file so command output stays clean.
    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());

    tracing::info!(team_id = ?config.team_id, "teamboard starting");

    let command = cli.command.unwrap_or(Command::List { json: false });
    match run(command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("teamboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Runs one command against the persisted store.
async fn run(command: Command, config: &ClientConfig) -> Result<(), AppError> {
    let store = Arc::new(MemoryStore::load(&config.data_file)?);
    let session = config.session();
    if session.team_id().is_none() {
        eprintln!("Warning: no team configured, the board is empty (use --team)");
    }

    let mut board = Board::open(&store, &session);
    board.wait_for_snapshots(config.snapshot_timeout).await;

    let pending = match command {
        Command::List { json } => {
            print_board(&board, json)?;
            Vec::new()
        }
        Command::Add {
            title,
            description,
            status,
            difficulty,
            pinned,
        } => {
            let mut editor = TaskEditor::new_draft(&store, &session, status)?;
            let _ = editor.set_title(title);
            let _ = editor.set_description(description);
            let _ = editor.set_difficulty(difficulty);
            let _ = editor.set_pinned(pinned);
            println!("{}", editor.task().id);
            editor.save().into_iter().collect()
        }
        Command::Move { id, status } => {
            let id = find_on_board(&board, &id)?.id;
            let report = drop_onto(&board, status, &encode_task(&id));
            report.settled().await;
            Vec::new()
        }
        Command::Drop { payload, column } => {
            let report = drop_onto(&board, column, &payload);
            println!(
                "{} task(s) moved, {} payload(s) ignored",
                report.reassigned.len(),
                report.ignored
            );
            report.settled().await;
            Vec::new()
        }
        Command::Edit {
            id,
            title,
            description,
            difficulty,
            progress,
            pinned,
            deadline,
        } => {
            let task = find_on_board(&board, &id)?;
            let mut editor = TaskEditor::existing(&store, task);
            let mut updates: Vec<TaskFieldUpdate> = Vec::new();
            updates.extend(title.map(TaskFieldUpdate::Title));
            updates.extend(description.map(TaskFieldUpdate::Description));
            updates.extend(difficulty.map(TaskFieldUpdate::Difficulty));
            updates.extend(progress.map(TaskFieldUpdate::Progress));
            updates.extend(pinned.map(TaskFieldUpdate::Pinned));
            if let Some(deadline) = deadline {
                updates.push(TaskFieldUpdate::DeadlineEnabled(true));
                updates.push(TaskFieldUpdate::Deadline(deadline));
            }
            updates
                .into_iter()
                .filter_map(|update| editor.apply(update))
                .collect()
        }
        Command::Delete { id } => {
            let task = find_on_board(&board, &id)?;
            let Some(column) = board.column(task.status) else {
                return Err(AppError::UnknownTask(task.id));
            };
            vec![column.request_delete(&task.id)]
        }
    };

    futures_util::future::join_all(pending.into_iter().map(PendingWrite::settled)).await;
    board.teardown();
    store.save(&config.data_file)?;
    tracing::info!(documents = store.len(), "teamboard exiting");
    Ok(())
}

fn find_on_board(board: &Board<MemoryStore>, raw_id: &str) -> Result<Task, AppError> {
    let id = TaskId::parse(raw_id)?;
    board.find_task(&id).ok_or(AppError::UnknownTask(id))
}

fn drop_onto(board: &Board<MemoryStore>, status: TaskStatus, payload: &str) -> DropReport {
    board
        .column(status)
        .map(|column| column.handle_drop(&[payload]))
        .unwrap_or_default()
}

#[derive(serde::Serialize)]
struct ColumnView<'a> {
    status: TaskStatus,
    experience_points: u32,
    tasks: &'a [Task],
}

fn print_board(board: &Board<MemoryStore>, json: bool) -> Result<(), AppError> {
    let columns: Vec<(TaskStatus, u32, Vec<Task>)> = board
        .columns()
        .iter()
        .map(|c| (c.status(), c.experience_points(), c.current_tasks()))
        .collect();

    if json {
        let views: Vec<ColumnView<'_>> = columns
            .iter()
            .map(|(status, experience_points, tasks)| ColumnView {
                status: *status,
                experience_points: *experience_points,
                tasks,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for (status, _, tasks) in &columns {
        println!("== {} ({}) ==", status.label(), tasks.len());
        for task in tasks {
            let pin = if task.is_pinned { "*" } else { " " };
            let deadline = if task.is_deadline_enabled {
                format!(" due {}", task.deadline.format("%Y-%m-%d"))
            } else {
                String::new()
            };
            println!(
                "{pin} {}  {}  [{} {}xp] {:.0}%{deadline}",
                task.id,
                task.title,
                task.difficulty,
                task.difficulty.experience_points(),
                task.progress,
            );
        }
    }
    println!("Experience earned: {}", board.experience_earned());
    Ok(())
}
