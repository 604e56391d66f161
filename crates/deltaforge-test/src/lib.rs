//! Shared test fixtures for deltaforge crates.
//!
//! This crate provides data types and seeded operation generators for
//! testing. It does NOT depend on `deltaforge-scoring`, which uses it as a
//! dev-dependency.
//!
//! - [`entity`] - entities with interior-mutable planning fields
//! - [`script`] - seeded insert/update/retract sequences
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! deltaforge-test = { workspace = true }
//! ```

pub mod entity;
pub mod script;

pub use entity::{Entity, Visit};
pub use script::{Operation, OperationScript};
