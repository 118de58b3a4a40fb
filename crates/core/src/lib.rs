//! Store Locator Core - Shared types library.
//!
//! This crate provides the domain types used by every store locator component:
//! - `locator` - HTTP backend for store ingestion and stale-record reporting
//! - `cli` - Command-line tools for migrations and reports
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Everything here can be tested without a network or
//! a database.
//!
//! # Modules
//!
//! - [`types`] - Customer identifiers, lenient payload coercion, order dates,
//!   staleness thresholds, store records and geographic points

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
