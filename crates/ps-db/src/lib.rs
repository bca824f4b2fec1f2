//! ps-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed models, and query modules for all
//! picstash entities. Image bytes are stored inline as blobs, so a
//! single database file holds the entire state of an instance.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
