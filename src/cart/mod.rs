//! Shopping Cart Domain Module
//!
//! This module contains all cart business logic, including:
//! - Domain models (CatalogItem, CartLine, operation outcomes)
//! - Pure cart helpers (add/remove/clear, quantity sanitizing, totals)
//! - Inverse mutations used to roll back failed remote updates
//! - The cart controller tying state, storage and the remote store together

pub mod controller;
pub mod helpers;
pub mod models;
pub mod rollback;

// Re-export commonly used types for convenience
pub use controller::{CartController, Initialization};
pub use models::{BlankCatId, CartLine, CatId, CatalogItem, LoadCartOutcome, MutationOutcome};
pub use rollback::Rollback;
