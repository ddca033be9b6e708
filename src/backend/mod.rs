//! Persistence backends
//!
//! Two interchangeable implementations of one save/load/delete contract:
//! a file tree (decks are directories, cards are `.md` files) and a single
//! embedded SQLite index. The stores never touch storage directly; every
//! durable write goes through a [`Backend`].

mod file_tree;
mod index;

pub use file_tree::FileTreeBackend;
pub use index::IndexBackend;

use async_trait::async_trait;
use thiserror::Error;

use crate::cards::Card;
use crate::decks::Deck;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Scan error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// The persistence contract both backends implement.
///
/// Reads are full scans; the stores hold the indexed in-memory view.
/// Decode failures inside a backend are recovered with permissive defaults
/// (the card stays available) and never surface through this trait.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn read_all_cards(&self) -> Result<Vec<Card>>;
    async fn read_all_decks(&self) -> Result<Vec<Deck>>;

    /// Persist a card under its current deck path, replacing any previous
    /// version at that key.
    async fn write_card(&self, card: &Card) -> Result<()>;
    /// Remove a card's record. `deck_path` locates the storage key; absent
    /// records are not an error.
    async fn delete_card(&self, id: &str, deck_path: &str) -> Result<()>;

    async fn write_deck(&self, deck: &Deck) -> Result<()>;
    /// Remove a deck and everything under it: descendant decks and all of
    /// their cards cascade away with the deck.
    async fn delete_deck(&self, path: &str) -> Result<()>;
}
