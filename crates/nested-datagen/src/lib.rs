//! Deterministic nested data generation.
//!
//! This crate builds composite records on top of [`nested_random`]: every
//! record, field and array element reads its randomness from its own node in
//! the random tree, so records can be generated in any order, on any number
//! of threads, and still come out identical for a given seed.
//!
//! # Quick Start
//!
//! ```rust
//! use nested_datagen::{generate_users, DatasetConfig};
//!
//! let config = DatasetConfig {
//!     seed: 42,
//!     count: 10,
//!     ..Default::default()
//! };
//! let users = generate_users(&config).unwrap();
//! assert_eq!(users.len(), 10);
//! assert_eq!(users, generate_users(&config).unwrap());
//! ```

pub mod config;
pub mod dataset;
pub mod gen;
pub mod generators;
pub mod record;

pub use config::DatasetConfig;
pub use dataset::{collection_node, generate_users, write_jsonl, write_jsonl_file};
pub use gen::Gen;
pub use generators::*;
pub use record::{Address, AddressGenerator, User, UserGenerator};
