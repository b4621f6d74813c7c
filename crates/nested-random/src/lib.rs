//! Deterministic, hierarchically addressed random streams.
//!
//! A [`NestedRandom`] root spawns children by string key or integer index,
//! and those children spawn their own, forming a tree that mirrors the shape
//! of the data being generated. Any node can produce a conventional seeded
//! generator. The seed depends only on the root seed and the path to the
//! node, so workers that build different parts of a structure in parallel
//! still produce the same overall result for a given root seed.
//!
//! # Quick Start
//!
//! ```rust
//! use nested_random::NestedRandom;
//! use rand::Rng;
//!
//! let root = NestedRandom::root(42);
//! let users = root.key("users");
//!
//! let ages: Vec<u32> = users
//!     .children()
//!     .take(3)
//!     .map(|user| user.key("age").random_generator().gen_range(18..90))
//!     .collect();
//!
//! // The second user's age does not depend on having generated the first.
//! let second: u32 = root.key("users").index(1).key("age").random_generator().gen_range(18..90);
//! assert_eq!(ages[1], second);
//! ```

pub mod error;
pub mod murmur;
pub mod node;
pub mod path;

pub use error::{Error, Result};
pub use murmur::{murmur2, Murmur2, SeedHash};
pub use node::{Children, NestedRandom};
pub use path::{decode_index, encode_index, SeedPath, Segment};
