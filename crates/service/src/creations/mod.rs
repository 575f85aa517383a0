//! Creations module: staged writes over a durable `creations` table.
//!
//! Same three-layer split as `auth`: domain types, a repository seam for the
//! backing table, and the `StagedStore` holding the in-memory overlay.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod repo;
pub mod store;

pub use store::{StagedStore, StoreOptions};
