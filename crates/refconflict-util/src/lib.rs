//! Shared utilities for refconflict.
//!
//! This crate provides cross-cutting concerns used by all other refconflict
//! crates: the unified error type, filesystem probing helpers, hex encoding
//! and terminal status lines.

pub mod errors;
pub mod fs;
pub mod hex;
pub mod progress;
