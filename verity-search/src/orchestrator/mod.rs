//! Search orchestrator: concurrent fan-out over query configs and page windows.
//!
//! This module issues every configured call concurrently, waits for all of
//! them to settle, and keeps the items of the calls that succeeded.

pub mod fanout;
pub mod pagination;
