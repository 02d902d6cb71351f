//! Shared record types for the `TeamBoard` task board.
//!
//! Everything in this crate is pure data: task records and their document
//! encoding, store queries, drag tokens, and the snapshot codec.

pub mod codec;
pub mod document;
pub mod drag;
pub mod query;
pub mod task;
