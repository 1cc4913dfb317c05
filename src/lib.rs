//! Cat Adoption Cart Library
//!
//! Client-side shopping cart state for a cat-adoption storefront: the
//! catalog of adoptable cats, the adoption cart, its local persistence and
//! optional optimistic synchronization with a REST collection API.

// Domain modules
pub mod cart;
pub mod catalog;

// Infrastructure
pub mod config;
pub mod confirm;
pub mod error;
pub mod remote;
pub mod storage;

pub use cart::{CartController, CartLine, CatId, CatalogItem, LoadCartOutcome, MutationOutcome};
pub use config::CartConfig;
pub use error::{CartError, Result};
