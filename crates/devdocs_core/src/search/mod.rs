//! Quick search entry points.
//!
//! # Responsibility
//! - Match a free-text query against task and document text.
//! - Keep result shaping (ordering, limit) inside core.

pub mod substring;
