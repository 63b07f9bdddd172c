//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: opt-in periodic purge of stale local entries

mod cleanup;

pub use cleanup::spawn_cleanup_task;
