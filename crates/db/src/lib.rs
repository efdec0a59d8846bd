//! Relational store for the normalized world-country dataset.
//!
//! Provides the SQLite schema, the write primitives used by the importer and
//! the read-only queries used by the viewer.

pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod store;

pub use pool::DbPool;
pub use schema::{Dimension, Relation};
