//! Store queries: equality filters plus ordering clauses.
//!
//! A [`TaskQuery`] is evaluated by the store, never by the client. The
//! evaluation helpers here are pure so any store implementation can share
//! the same semantics.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::document::{Document, FieldValue};
use crate::task::{TaskStatus, fields};

/// Sort direction of an ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One ordering clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Ascending clause on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    /// Descending clause on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// Equality filter: `field == value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field to compare.
    pub field: String,
    /// Required value.
    pub value: FieldValue,
}

/// A filtered, ordered query over task documents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// All filters must match.
    pub filters: Vec<Filter>,
    /// Applied in order; document id ascending breaks remaining ties.
    pub order: Vec<OrderBy>,
}

impl TaskQuery {
    /// The query backing one board column: tasks of `team_id` with
    /// `status`, pinned first, then newest first.
    #[must_use]
    pub fn column(team_id: &str, status: TaskStatus) -> Self {
        Self::default()
            .filter(fields::TEAM_ID, FieldValue::String(team_id.to_string()))
            .filter(fields::STATUS, FieldValue::String(status.as_str().to_string()))
            .order_by(OrderBy::desc(fields::IS_PINNED))
            .order_by(OrderBy::desc(fields::CREATED_DATE))
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value,
        });
        self
    }

    /// Appends an ordering clause.
    #[must_use]
    pub fn order_by(mut self, clause: OrderBy) -> Self {
        self.order.push(clause);
        self
    }

    /// Returns `true` if `doc` satisfies every filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|f| doc.get(&f.field) == Some(&f.value))
    }

    /// Compares two documents under this query's ordering.
    ///
    /// A missing field sorts as [`FieldValue::Null`].
    #[must_use]
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for clause in &self.order {
            let left = a.get(&clause.field).unwrap_or(&FieldValue::Null);
            let right = b.get(&clause.field).unwrap_or(&FieldValue::Null);
            let ord = match clause.direction {
                Direction::Ascending => left.sort_cmp(right),
                Direction::Descending => right.sort_cmp(left),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id.cmp(&b.id)
    }

    /// Filters and sorts `docs`, returning the full result set.
    #[must_use]
    pub fn evaluate<'a>(&self, docs: impl IntoIterator<Item = &'a Document>) -> Vec<Document> {
        let mut result: Vec<Document> = docs
            .into_iter()
            .filter(|d| self.matches(d))
            .cloned()
            .collect();
        result.sort_by(|a, b| self.compare(a, b));
        result
    }
}
