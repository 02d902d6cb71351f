//! Property-based tests for drag payload tokens.
//!
//! Uses proptest to verify:
//! 1. Any task id survives encode → decode.
//! 2. Arbitrary text never causes a panic in `decode`.
//! 3. Only payloads starting with the exact `Task` token decode to a task.
//! 4. Surrounding and repeated whitespace does not change the result.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use teamboard_proto::drag::{DragPayload, TASK_KIND, encode_task};
use teamboard_proto::task::TaskId;

/// Strategy for generating valid task ids (non-empty, no whitespace).
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    "[A-Za-z0-9_-]{1,40}".prop_map(|s| TaskId::parse(&s).unwrap())
}

proptest! {
    #[test]
    fn task_token_round_trips(id in arb_task_id()) {
        let token = encode_task(&id);
        prop_assert_eq!(DragPayload::decode(&token), DragPayload::Task(id.clone()));
        prop_assert_eq!(DragPayload::Task(id).encode(), Some(token));
    }

    #[test]
    fn generated_ids_round_trip(_seed in any::<u8>()) {
        let id = TaskId::generate();
        prop_assert_eq!(DragPayload::decode(&encode_task(&id)), DragPayload::Task(id));
    }

    #[test]
    fn decode_never_panics(raw in any::<String>()) {
        let _ = DragPayload::decode(&raw);
    }

    #[test]
    fn other_kinds_never_decode_to_task(kind in "[A-Za-z]{1,8}", id in arb_task_id()) {
        prop_assume!(kind != TASK_KIND);
        let decoded = DragPayload::decode(&format!("{kind} {id}"));
        prop_assert!(!matches!(decoded, DragPayload::Task(_)));
    }

    #[test]
    fn whitespace_is_insignificant(
        id in arb_task_id(),
        lead in "[ \t\n]{0,4}",
        gap in "[ \t\n]{1,4}",
        trail in "[ \t\n]{0,4}",
    ) {
        let raw = format!("{lead}{TASK_KIND}{gap}{id}{trail}");
        prop_assert_eq!(DragPayload::decode(&raw), DragPayload::Task(id));
    }
}
