//! Shared utilities for reqcheck.
//!
//! This crate provides cross-cutting concerns used by all other reqcheck crates:
//! error types, filesystem helpers, content hashing, and terminal status lines.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
