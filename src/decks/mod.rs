//! Deck hierarchy
//!
//! Decks form a forest keyed by slash-delimited path (`/Japanese/Kanji`).
//! The root `/` is the implicit ancestor of all top-level decks and is not
//! itself a deck. Structural operations (rename, delete) cascade over the
//! whole subtree.

pub mod hierarchy;
pub mod models;

pub use hierarchy::{DeckHierarchy, HierarchyError};
pub use models::*;
