//! Property-based tests for column query ordering.
//!
//! Uses proptest to verify, for any mix of tasks:
//! 1. A column result only holds tasks of its team and status.
//! 2. Pinned tasks come first, then newer creation dates, then lower ids.
//! 3. The result does not depend on the order documents are supplied in.
//! 4. Decoding documents of a column result never fails and gives back
//!    the task that was stored.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use teamboard_proto::document::Document;
use teamboard_proto::query::TaskQuery;
use teamboard_proto::task::{Task, TaskStatus};

/// Strategy for generating arbitrary statuses.
fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

/// Strategy for generating tasks across two teams. Creation times come
/// from a small range so ties actually occur.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        prop::bool::ANY,
        arb_status(),
        0i64..20,
        any::<bool>(),
        "[a-z ]{0,16}",
        0.0f64..=100.0,
    )
        .prop_map(|(other_team, status, created, pinned, title, progress)| {
            let team = if other_team { "team-b" } else { "team-a" };
            let mut task = Task::draft(team, status);
            task.created_date = Utc.timestamp_opt(1_700_000_000 + created, 0).unwrap();
            task.is_pinned = pinned;
            task.title = title;
            task.progress = progress;
            task
        })
}

fn arb_documents() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec(arb_task(), 0..40)
        .prop_map(|tasks| tasks.iter().map(Task::to_document).collect())
}

proptest! {
    #[test]
    fn column_holds_only_its_team_and_status(docs in arb_documents(), status in arb_status()) {
        let query = TaskQuery::column("team-a", status);
        let result = query.evaluate(&docs);
        for doc in &result {
            let task = Task::from_document(doc).unwrap();
            prop_assert_eq!(task.team_id.as_str(), "team-a");
            prop_assert_eq!(task.status, status);
        }
        let expected = docs
            .iter()
            .filter(|d| {
                let task = Task::from_document(d).unwrap();
                task.team_id == "team-a" && task.status == status
            })
            .count();
        prop_assert_eq!(result.len(), expected);
    }

    #[test]
    fn column_is_sorted_pinned_then_newest_then_id(docs in arb_documents(), status in arb_status()) {
        let result = TaskQuery::column("team-a", status).evaluate(&docs);
        let tasks: Vec<Task> = result.iter().map(|d| Task::from_document(d).unwrap()).collect();
        for pair in tasks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key_a = (!a.is_pinned, std::cmp::Reverse(a.created_date), a.id.as_str());
            let key_b = (!b.is_pinned, std::cmp::Reverse(b.created_date), b.id.as_str());
            prop_assert!(key_a < key_b, "{:?} sorted before {:?}", key_a, key_b);
        }
    }

    #[test]
    fn input_order_does_not_matter(docs in arb_documents(), status in arb_status()) {
        let query = TaskQuery::column("team-a", status);
        let forward = query.evaluate(&docs);
        let backward = query.evaluate(docs.iter().rev());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn column_results_always_decode(
        tasks in prop::collection::vec(arb_task(), 0..40),
        status in arb_status(),
    ) {
        let docs: Vec<Document> = tasks.iter().map(Task::to_document).collect();
        let result = TaskQuery::column("team-a", status).evaluate(&docs);
        for doc in &result {
            let decoded = Task::from_document(doc);
            prop_assert!(decoded.is_ok(), "{:?} failed to decode: {:?}", doc, decoded);
            let decoded = decoded.unwrap();
            let original = tasks.iter().find(|t| t.id == decoded.id).unwrap();
            prop_assert_eq!(&decoded, original);
        }
    }
}
