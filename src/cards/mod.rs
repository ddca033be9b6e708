//! Cards and their review lifecycle
//!
//! This module provides:
//! - The card data model and typed partial updates
//! - The canonical text codec (frontmatter + front/back body)
//! - The fixed-interval review scheduler
//! - The card store (in-memory set with write-through persistence)

pub mod codec;
pub mod models;
pub mod scheduler;
pub mod store;

pub use models::*;
pub use store::{CardStore, StoreError};
