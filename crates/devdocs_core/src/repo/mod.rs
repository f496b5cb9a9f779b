//! Repository layer over the cache database.
//!
//! # Invariants
//! - SQL stays inside this layer; callers see `DbResult` values only.

pub mod cache_repo;
