//! Core data types for reqcheck.
//!
//! This crate defines the fundamental types that represent a requirements
//! manifest: versions, version specifiers, requirement lines, the parsed
//! manifest itself, lock files, and layered configuration.
//!
//! This crate is intentionally free of terminal output and network I/O.

pub mod config;
pub mod lockfile;
pub mod manifest;
pub mod requirement;
pub mod specifier;
pub mod version;
