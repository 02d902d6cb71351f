//! Task record types for the `TeamBoard` Kanban board.
//!
//! Defines the task model, its status and difficulty enumerations, the
//! single-field partial updates used for editing, and the conversion
//! between [`Task`] and the store's [`Document`] representation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{Document, FieldMap, FieldValue};

/// Document field names used by task records.
pub mod fields {
    /// Owning team identifier.
    pub const TEAM_ID: &str = "teamId";
    /// Task title.
    pub const TITLE: &str = "title";
    /// Free-text description.
    pub const DESCRIPTION: &str = "description";
    /// Creation timestamp.
    pub const CREATED_DATE: &str = "createdDate";
    /// Column status.
    pub const STATUS: &str = "status";
    /// Difficulty level.
    pub const DIFFICULTY: &str = "difficulty";
    /// Pinned flag.
    pub const IS_PINNED: &str = "isPinned";
    /// Progress percentage.
    pub const PROGRESS: &str = "progress";
    /// Deadline-enabled flag.
    pub const IS_DEADLINE_ENABLED: &str = "isDeadlineEnabled";
    /// Deadline timestamp.
    pub const DEADLINE: &str = "deadline";
}

/// Lower bound of [`Task::progress`].
pub const MIN_PROGRESS: f64 = 0.0;
/// Upper bound of [`Task::progress`].
pub const MAX_PROGRESS: f64 = 100.0;

/// Errors raised when a task or one of its parts cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A required field is absent from the document.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A field holds a value of the wrong type.
    #[error("field `{field}` should be {expected}, found {found}")]
    WrongType {
        /// Field name.
        field: &'static str,
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        found: &'static str,
    },
    /// The status string is not one of the known columns.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),
    /// The difficulty string is not one of the known levels.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    /// The task id is empty or contains whitespace.
    #[error("invalid task id: {0:?}")]
    InvalidId(String),
}

/// Opaque, store-unique task identifier.
///
/// Ids never contain whitespace, so they can be carried in a drag token
/// without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh time-ordered identifier (UUID v7, no hyphens).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Validates and wraps an existing identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidId`] if `raw` is empty or contains
    /// whitespace.
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(DecodeError::InvalidId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Column a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Every status, in board column order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    /// Returns the value stored in the `status` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
        }
    }

    /// Returns the human-readable column heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "inProgress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(DecodeError::UnknownStatus(other.to_string())),
        }
    }
}

/// How hard a task is. Ordered from easiest to hardest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    /// Trivial.
    VeryEasy,
    /// Default for new tasks.
    #[default]
    Easy,
    /// Ordinary.
    Normal,
    /// Demanding.
    Hard,
    /// Very demanding.
    VeryHard,
}

impl Difficulty {
    /// Every level, easiest first.
    pub const ALL: [Self; 5] = [
        Self::VeryEasy,
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::VeryHard,
    ];

    /// Returns the value stored in the `difficulty` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryEasy => "veryEasy",
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::VeryHard => "veryHard",
        }
    }

    /// Experience points awarded for completing a task of this difficulty.
    #[must_use]
    pub const fn experience_points(self) -> u32 {
        match self {
            Self::VeryEasy => 5,
            Self::Easy => 10,
            Self::Normal => 20,
            Self::Hard => 35,
            Self::VeryHard => 50,
        }
    }

    /// Display color as a `#RRGGBB` hex string.
    #[must_use]
    pub const fn color_hex(self) -> &'static str {
        match self {
            Self::VeryEasy => "#4CAF50",
            Self::Easy => "#8BC34A",
            Self::Normal => "#2196F3",
            Self::Hard => "#FF9800",
            Self::VeryHard => "#F44336",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownDifficulty(s.to_string()))
    }
}

/// Clamps a progress value into `[0, 100]`. NaN becomes 0.
#[must_use]
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        MIN_PROGRESS
    } else {
        value.clamp(MIN_PROGRESS, MAX_PROGRESS)
    }
}

/// A unit of work tracked on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-unique identifier, immutable after creation.
    pub id: TaskId,
    /// Team that owns the task.
    pub team_id: String,
    /// Short title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// When the task was created.
    pub created_date: DateTime<Utc>,
    /// Column the task is in.
    pub status: TaskStatus,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Pinned tasks sort before unpinned ones.
    pub is_pinned: bool,
    /// Completion percentage in `[0, 100]`.
    pub progress: f64,
    /// Whether [`deadline`](Self::deadline) is meaningful.
    pub is_deadline_enabled: bool,
    /// Due date; ignored unless the deadline is enabled.
    pub deadline: DateTime<Utc>,
}

impl Task {
    /// Creates an unsaved task with default field values.
    #[must_use]
    pub fn draft(team_id: impl Into<String>, status: TaskStatus) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            team_id: team_id.into(),
            title: String::new(),
            description: String::new(),
            created_date: now,
            status,
            difficulty: Difficulty::default(),
            is_pinned: false,
            progress: MIN_PROGRESS,
            is_deadline_enabled: false,
            deadline: now,
        }
    }

    /// Encodes the task as a store document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let fields = FieldMap::from([
            (fields::TEAM_ID.into(), FieldValue::String(self.team_id.clone())),
            (fields::TITLE.into(), FieldValue::String(self.title.clone())),
            (
                fields::DESCRIPTION.into(),
                FieldValue::String(self.description.clone()),
            ),
            (
                fields::CREATED_DATE.into(),
                FieldValue::Timestamp(self.created_date),
            ),
            (
                fields::STATUS.into(),
                FieldValue::String(self.status.as_str().into()),
            ),
            (
                fields::DIFFICULTY.into(),
                FieldValue::String(self.difficulty.as_str().into()),
            ),
            (fields::IS_PINNED.into(), FieldValue::Bool(self.is_pinned)),
            (
                fields::PROGRESS.into(),
                FieldValue::Double(clamp_progress(self.progress)),
            ),
            (
                fields::IS_DEADLINE_ENABLED.into(),
                FieldValue::Bool(self.is_deadline_enabled),
            ),
            (fields::DEADLINE.into(), FieldValue::Timestamp(self.deadline)),
        ]);
        Document::new(self.id.as_str(), fields)
    }

    /// Decodes a task from a store document.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the id is invalid, a field is missing or
    /// has the wrong type, or the status or difficulty is unknown.
    pub fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        Ok(Self {
            id: TaskId::parse(&doc.id)?,
            team_id: read_string(doc, fields::TEAM_ID)?,
            title: read_string(doc, fields::TITLE)?,
            description: read_string(doc, fields::DESCRIPTION)?,
            created_date: read_timestamp(doc, fields::CREATED_DATE)?,
            status: read_string(doc, fields::STATUS)?.parse()?,
            difficulty: read_string(doc, fields::DIFFICULTY)?.parse()?,
            is_pinned: read_bool(doc, fields::IS_PINNED)?,
            progress: clamp_progress(read_f64(doc, fields::PROGRESS)?),
            is_deadline_enabled: read_bool(doc, fields::IS_DEADLINE_ENABLED)?,
            deadline: read_timestamp(doc, fields::DEADLINE)?,
        })
    }
}

fn read_field<'a>(doc: &'a Document, field: &'static str) -> Result<&'a FieldValue, DecodeError> {
    doc.get(field).ok_or(DecodeError::MissingField(field))
}

const fn wrong_type(field: &'static str, expected: &'static str, found: &FieldValue) -> DecodeError {
    DecodeError::WrongType {
        field,
        expected,
        found: found.type_name(),
    }
}

fn read_string(doc: &Document, field: &'static str) -> Result<String, DecodeError> {
    let value = read_field(doc, field)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(field, "string", value))
}

fn read_bool(doc: &Document, field: &'static str) -> Result<bool, DecodeError> {
    let value = read_field(doc, field)?;
    value.as_bool().ok_or_else(|| wrong_type(field, "bool", value))
}

fn read_f64(doc: &Document, field: &'static str) -> Result<f64, DecodeError> {
    let value = read_field(doc, field)?;
    value.as_f64().ok_or_else(|| wrong_type(field, "number", value))
}

fn read_timestamp(doc: &Document, field: &'static str) -> Result<DateTime<Utc>, DecodeError> {
    let value = read_field(doc, field)?;
    value
        .as_timestamp()
        .ok_or_else(|| wrong_type(field, "timestamp", value))
}

/// An edit to exactly one task field.
///
/// Each edit becomes a partial store update whose field map holds a single
/// entry, so concurrent edits to different fields never clobber each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskFieldUpdate {
    /// Replace the title.
    Title(String),
    /// Replace the description.
    Description(String),
    /// Move the task to another column.
    Status(TaskStatus),
    /// Change the difficulty.
    Difficulty(Difficulty),
    /// Pin or unpin.
    Pinned(bool),
    /// Set progress; clamped into `[0, 100]`.
    Progress(f64),
    /// Enable or disable the deadline.
    DeadlineEnabled(bool),
    /// Move the deadline.
    Deadline(DateTime<Utc>),
}

impl TaskFieldUpdate {
    /// Returns the document field this update writes.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Title(_) => fields::TITLE,
            Self::Description(_) => fields::DESCRIPTION,
            Self::Status(_) => fields::STATUS,
            Self::Difficulty(_) => fields::DIFFICULTY,
            Self::Pinned(_) => fields::IS_PINNED,
            Self::Progress(_) => fields::PROGRESS,
            Self::DeadlineEnabled(_) => fields::IS_DEADLINE_ENABLED,
            Self::Deadline(_) => fields::DEADLINE,
        }
    }

    /// Returns the encoded value written to [`field_name`](Self::field_name).
    #[must_use]
    pub fn field_value(&self) -> FieldValue {
        match self {
            Self::Title(s) | Self::Description(s) => FieldValue::String(s.clone()),
            Self::Status(s) => FieldValue::String(s.as_str().to_string()),
            Self::Difficulty(d) => FieldValue::String(d.as_str().to_string()),
            Self::Pinned(b) | Self::DeadlineEnabled(b) => FieldValue::Bool(*b),
            Self::Progress(p) => FieldValue::Double(clamp_progress(*p)),
            Self::Deadline(t) => FieldValue::Timestamp(*t),
        }
    }

    /// Builds the single-entry field map sent to the store.
    #[must_use]
    pub fn to_field_map(&self) -> FieldMap {
        FieldMap::from([(self.field_name().to_string(), self.field_value())])
    }

    /// Applies the edit to a local copy of a task.
    pub fn apply_to(&self, task: &mut Task) {
        match self {
            Self::Title(s) => task.title.clone_from(s),
            Self::Description(s) => task.description.clone_from(s),
            Self::Status(s) => task.status = *s,
            Self::Difficulty(d) => task.difficulty = *d,
            Self::Pinned(b) => task.is_pinned = *b,
            Self::Progress(p) => task.progress = clamp_progress(*p),
            Self::DeadlineEnabled(b) => task.is_deadline_enabled = *b,
            Self::Deadline(t) => task.deadline = *t,
        }
    }
}
