//! The workspace: explicit owned state for one card collection
//!
//! Owns the card store, the deck hierarchy, and the shared backend handle,
//! and coordinates the operations that span both sets (deck rename and
//! delete cascade into the cards underneath). There is no ambient global;
//! callers hold a `Workspace` and pass it where it is needed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::{Backend, BackendError, FileTreeBackend, IndexBackend};
use crate::cards::{CardStore, StoreError};
use crate::decks::{Deck, DeckHierarchy, DeckTreeItem, HierarchyError};
use crate::review::ReviewController;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Deck error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;

pub struct Workspace {
    backend: Option<Arc<dyn Backend>>,
    pub cards: CardStore,
    pub decks: DeckHierarchy,
    pub review: ReviewController,
}

impl Workspace {
    /// A workspace with no backend: every operation is a no-op returning
    /// empty. Lets the caller come up before a storage location is chosen.
    pub fn detached() -> Self {
        Self::from_backend(None)
    }

    /// Open a directory of decks and markdown cards.
    pub fn open_file_tree(root: PathBuf) -> Result<Self> {
        Ok(Self::with_backend(Arc::new(FileTreeBackend::open(root)?)))
    }

    /// Open a single embedded SQLite index.
    pub fn open_index(db_path: PathBuf) -> Result<Self> {
        Ok(Self::with_backend(Arc::new(IndexBackend::open(db_path)?)))
    }

    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self::from_backend(Some(backend))
    }

    fn from_backend(backend: Option<Arc<dyn Backend>>) -> Self {
        Self {
            cards: CardStore::new(backend.clone()),
            decks: DeckHierarchy::new(backend.clone()),
            review: ReviewController::new(),
            backend,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Full re-read of decks then cards. Any card pointing at a deck the
    /// backend has no record of gets the missing chain registered, so a
    /// load never leaves orphaned cards behind.
    pub async fn load(&mut self) -> Result<()> {
        self.decks.load().await?;
        self.cards.load().await?;

        let missing: Vec<String> = self
            .cards
            .all()
            .into_iter()
            .map(|c| c.deck_path)
            .filter(|p| p != "/" && !self.decks.contains(p))
            .collect();
        for path in missing {
            log::warn!("Card references unknown deck {}; registering it", path);
            self.decks.ensure_path(&path).await?;
        }
        Ok(())
    }

    pub async fn create_deck(
        &mut self,
        name: &str,
        parent_path: Option<&str>,
    ) -> Result<Option<Deck>> {
        Ok(self.decks.create(name, parent_path).await?)
    }

    /// Rename a deck and cascade: every descendant deck is re-pathed, every
    /// card underneath is rewritten (and its storage key moved), then the
    /// old subtree records are dropped. The cascade is multi-step and
    /// best-effort; on a partial failure, re-run `load` to reconcile.
    pub async fn rename_deck(&mut self, path: &str, new_name: &str) -> Result<Option<String>> {
        let moves = self.decks.rename(path, new_name).await?;
        let Some((old_root, new_root)) = moves.first().cloned() else {
            return Ok(None);
        };

        self.cards.rebase_deck_prefix(&old_root, &new_root).await?;

        if let Some(backend) = &self.backend {
            backend.delete_deck(&old_root).await?;
        }
        Ok(Some(new_root))
    }

    /// Delete a deck subtree. Cards under it are deleted with their decks
    /// in both backends; this workspace does not keep orphans.
    pub async fn delete_deck(&mut self, path: &str) -> Result<usize> {
        self.decks.delete(path).await?;
        Ok(self.cards.evict_deck_prefix(path))
    }

    /// The nested deck tree with per-deck exact-match card counts.
    pub fn deck_tree(&self) -> Vec<DeckTreeItem> {
        let counts: HashMap<String, usize> = self.cards.count_by_deck();
        self.decks.tree(&counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::cards::{CardPatch, CardState, ReviewQuality};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn create_test_workspace() -> (Workspace, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut ws = Workspace::open_file_tree(temp_dir.path().to_path_buf()).unwrap();
        ws.load().await.unwrap();
        (ws, temp_dir)
    }

    #[tokio::test]
    async fn test_rename_cascade_rewrites_cards_and_files() {
        let (mut ws, temp) = create_test_workspace().await;
        ws.create_deck("A", None).await.unwrap();
        ws.create_deck("X", Some("/A")).await.unwrap();

        let card = ws
            .cards
            .create("/A/X", "q".into(), "a".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();

        let new_root = ws.rename_deck("/A", "B").await.unwrap().unwrap();
        assert_eq!(new_root, "/B");

        let deck_paths: Vec<String> = ws.decks.all().into_iter().map(|d| d.path).collect();
        assert_eq!(deck_paths, vec!["/B", "/B/X"]);
        assert_eq!(ws.cards.get(&card.id).unwrap().deck_path, "/B/X");

        // The old subtree is gone on disk; the card file moved with it.
        assert!(!temp.path().join("A").exists());
        assert!(temp
            .path()
            .join("B/X")
            .join(format!("{}.md", card.id))
            .exists());

        // A full reload agrees with memory.
        ws.load().await.unwrap();
        let deck_paths: Vec<String> = ws.decks.all().into_iter().map(|d| d.path).collect();
        assert_eq!(deck_paths, vec!["/B", "/B/X"]);
        assert_eq!(ws.cards.get(&card.id).unwrap().deck_path, "/B/X");
    }

    #[tokio::test]
    async fn test_delete_deck_cascades_cards() {
        let (mut ws, _temp) = create_test_workspace().await;
        ws.create_deck("A", None).await.unwrap();
        ws.create_deck("X", Some("/A")).await.unwrap();
        ws.create_deck("B", None).await.unwrap();

        let doomed = ws
            .cards
            .create("/A/X", "q".into(), "a".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();
        let safe = ws
            .cards
            .create("/B", "q".into(), "a".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();

        let evicted = ws.delete_deck("/A").await.unwrap();
        assert_eq!(evicted, 1);
        assert!(ws.cards.get(&doomed.id).is_none());
        assert!(ws.cards.get(&safe.id).is_some());

        ws.load().await.unwrap();
        assert!(ws.cards.get(&doomed.id).is_none());
        assert!(ws.cards.get(&safe.id).is_some());
    }

    #[tokio::test]
    async fn test_deck_tree_counts_are_exact_match() {
        let (mut ws, _temp) = create_test_workspace().await;
        ws.create_deck("A", None).await.unwrap();
        ws.create_deck("X", Some("/A")).await.unwrap();
        ws.cards
            .create("/A/X", "q".into(), "a".into(), Vec::new())
            .await
            .unwrap();
        ws.cards
            .create("/A/X", "q2".into(), "a".into(), Vec::new())
            .await
            .unwrap();

        let tree = ws.deck_tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].card_count, 0);
        assert_eq!(tree[0].children[0].card_count, 2);
    }

    #[tokio::test]
    async fn test_index_backend_workspace_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join(".karuta/index.db");

        let mut ws = Workspace::open_index(db_path.clone()).unwrap();
        ws.load().await.unwrap();
        ws.create_deck("A", None).await.unwrap();
        let card = ws
            .cards
            .create("/A", "q".into(), "a".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();
        ws.rename_deck("/A", "B").await.unwrap();

        let mut reopened = Workspace::open_index(db_path).unwrap();
        reopened.load().await.unwrap();
        assert!(reopened.decks.contains("/B"));
        assert!(!reopened.decks.contains("/A"));
        assert_eq!(reopened.cards.get(&card.id).unwrap().deck_path, "/B");
    }

    #[tokio::test]
    async fn test_load_registers_missing_decks() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("index.db");

        // Seed a card row whose deck has no record, as a partial cascade
        // would leave behind.
        {
            let backend = IndexBackend::open(db_path.clone()).unwrap();
            let card = crate::cards::Card::new(
                "/Lost/Deck".into(),
                "q".into(),
                "a".into(),
                Vec::new(),
            );
            backend.write_card(&card).await.unwrap();
        }

        let mut ws = Workspace::open_index(db_path).unwrap();
        ws.load().await.unwrap();
        assert!(ws.decks.contains("/Lost"));
        assert!(ws.decks.contains("/Lost/Deck"));
    }

    #[tokio::test]
    async fn test_full_session_through_workspace() {
        let (mut ws, _temp) = create_test_workspace().await;
        let c1 = ws
            .cards
            .create("/", "c1".into(), "".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();
        ws.cards
            .update(
                &c1.id,
                CardPatch {
                    state: Some(CardState::Review),
                    next_review_date: Some(Some(Utc::now() - Duration::days(1))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(ws.review.start(&ws.cards, None).is_some());
        ws.review
            .answer(&mut ws.cards, ReviewQuality::Good)
            .await
            .unwrap();
        assert!(ws.review.session().unwrap().is_complete());

        // good leaves a review card in review, due in three days.
        let card = ws.cards.get(&c1.id).unwrap();
        assert_eq!(card.state, CardState::Review);
        assert!(card.next_review_date.unwrap() > Utc::now() + Duration::days(2));
    }

    #[tokio::test]
    async fn test_detached_workspace() {
        let mut ws = Workspace::detached();
        assert!(!ws.is_ready());
        ws.load().await.unwrap();
        assert_eq!(ws.create_deck("A", None).await.unwrap(), None);
        assert!(ws.deck_tree().is_empty());
    }
}
