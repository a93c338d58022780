//! Filesystem utilities for docval.
//!
//! Session state is written through `atomic_write_file` so that an interrupted
//! write never leaves a truncated `session.json` behind.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file};
