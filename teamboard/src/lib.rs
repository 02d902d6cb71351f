//! `TeamBoard`: realtime Kanban task board client library.

pub mod board;
pub mod config;
pub mod session;
pub mod store;
