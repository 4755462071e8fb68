//! Core data types for refconflict.
//!
//! This crate defines the values shared by every stage of an analysis:
//! four-part module versions and inclusive version ranges, module identities
//! with their full-name keys, binding-redirect rules, and the global
//! configuration.
//!
//! This crate is intentionally free of metadata parsing and filesystem
//! probing.

pub mod config;
pub mod identity;
pub mod redirect;
pub mod version;
