//! Domain models for Tally.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod context;
pub mod principal;
pub mod role;
pub mod tenant;
