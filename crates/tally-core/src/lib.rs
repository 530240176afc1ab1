//! Tally Core: domain models, the error taxonomy, repository ports, and
//! the authorization gate shared by every other crate.

pub mod access;
pub mod error;
pub mod models;
pub mod repository;
