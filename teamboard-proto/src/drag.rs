//! Drag-and-drop payloads.
//!
//! A drag carries a plain-text token of the form `"<Kind> <id>"`. The
//! receiving drop zone decodes it once into a [`DragPayload`] and handles
//! each kind exhaustively. Unrecognised payloads decode to
//! [`DragPayload::Unknown`] so several token kinds can share one drop zone.

use std::fmt;

use crate::task::TaskId;

/// Leading token of a task drag payload.
pub const TASK_KIND: &str = "Task";

/// Leading token of a tag drag payload.
pub const TAG_KIND: &str = "Tag";

/// A decoded drag payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragPayload {
    /// A task being moved between columns.
    Task(TaskId),
    /// A tag being dragged onto something.
    Tag(String),
    /// Anything else; receivers ignore it.
    Unknown,
}

impl DragPayload {
    /// Decodes a dropped plain-text payload.
    ///
    /// The payload is split on whitespace. Fewer than two tokens, an
    /// unrecognised first token, or an invalid task id all yield
    /// [`DragPayload::Unknown`]. Tokens after the second are ignored.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        let mut tokens = raw.split_whitespace();
        let (Some(kind), Some(id)) = (tokens.next(), tokens.next()) else {
            return Self::Unknown;
        };
        match kind {
            TASK_KIND => TaskId::parse(id).map_or(Self::Unknown, Self::Task),
            TAG_KIND => Self::Tag(id.to_string()),
            _ => Self::Unknown,
        }
    }

    /// Encodes the payload as a drag token. `Unknown` has no encoding.
    #[must_use]
    pub fn encode(&self) -> Option<String> {
        match self {
            Self::Task(id) => Some(encode_task(id)),
            Self::Tag(id) => Some(format!("{TAG_KIND} {id}")),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for DragPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "{TASK_KIND} {id}"),
            Self::Tag(id) => write!(f, "{TAG_KIND} {id}"),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Builds the drag token for a task: `"Task <id>"`.
#[must_use]
pub fn encode_task(id: &TaskId) -> String {
    format!("{TASK_KIND} {id}")
}
