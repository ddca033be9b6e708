//! The deck hierarchy: a path-keyed forest with cascading operations

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::models::{is_under, Deck, DeckTreeItem};
use crate::backend::{Backend, BackendError};

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Deck not found: {0}")]
    NotFound(String),

    #[error("Deck already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid deck name: {0:?}")]
    InvalidName(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, HierarchyError>;

/// Owns the authoritative deck set. Without a configured backend every
/// operation is a no-op returning empty, so callers need no special
/// "no workspace yet" handling.
pub struct DeckHierarchy {
    backend: Option<Arc<dyn Backend>>,
    decks: HashMap<String, Deck>,
}

impl DeckHierarchy {
    pub fn new(backend: Option<Arc<dyn Backend>>) -> Self {
        Self {
            backend,
            decks: HashMap::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Replace the in-memory set with a full re-read from the backend.
    pub async fn load(&mut self) -> Result<usize> {
        let Some(backend) = &self.backend else {
            return Ok(0);
        };
        let decks = backend.read_all_decks().await?;
        self.decks.clear();
        for deck in decks {
            self.decks.insert(deck.path.clone(), deck);
        }
        log::info!("Loaded {} decks", self.decks.len());
        Ok(self.decks.len())
    }

    pub fn get(&self, path: &str) -> Option<&Deck> {
        self.decks.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.decks.contains_key(path)
    }

    pub fn all(&self) -> Vec<Deck> {
        let mut decks: Vec<Deck> = self.decks.values().cloned().collect();
        decks.sort_by(|a, b| a.path.cmp(&b.path));
        decks
    }

    /// Immediate children only: exact `parentPath` match, not a prefix scan.
    pub fn children(&self, parent_path: Option<&str>) -> Vec<Deck> {
        let mut children: Vec<Deck> = self
            .decks
            .values()
            .filter(|d| d.parent_path.as_deref() == parent_path)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Create a deck under `parent_path` (or under the root). Creating a
    /// path that already exists returns the existing deck, so repeated
    /// creation requests are harmless.
    pub async fn create(
        &mut self,
        name: &str,
        parent_path: Option<&str>,
    ) -> Result<Option<Deck>> {
        let Some(backend) = self.backend.clone() else {
            return Ok(None);
        };

        let name = name.trim();
        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            return Err(HierarchyError::InvalidName(name.to_string()));
        }
        if let Some(parent) = parent_path {
            if !self.contains(parent) {
                return Err(HierarchyError::NotFound(parent.to_string()));
            }
        }

        let path = Deck::child_path(parent_path, name);
        if let Some(existing) = self.decks.get(&path) {
            log::debug!("Deck already exists: {}", path);
            return Ok(Some(existing.clone()));
        }

        let deck = Deck::from_path(&path);
        backend.write_deck(&deck).await?;
        self.decks.insert(path, deck.clone());
        Ok(Some(deck))
    }

    /// Rename a deck, rewriting the path of every descendant. Returns the
    /// `(old, new)` path pairs, the renamed deck first. Fails with
    /// `AlreadyExists` when the destination path is already taken.
    ///
    /// Cards under the subtree are not touched here; `Workspace` rewrites
    /// them and removes the old backend records once they have moved.
    pub async fn rename(
        &mut self,
        path: &str,
        new_name: &str,
    ) -> Result<Vec<(String, String)>> {
        let Some(backend) = self.backend.clone() else {
            return Ok(Vec::new());
        };

        let deck = self
            .decks
            .get(path)
            .cloned()
            .ok_or_else(|| HierarchyError::NotFound(path.to_string()))?;

        let new_name = new_name.trim();
        if new_name.is_empty() || new_name.contains('/') || new_name.starts_with('.') {
            return Err(HierarchyError::InvalidName(new_name.to_string()));
        }

        let new_path = Deck::child_path(deck.parent_path.as_deref(), new_name);
        if new_path == path {
            return Ok(Vec::new());
        }
        if self.contains(&new_path) {
            return Err(HierarchyError::AlreadyExists(new_path));
        }

        let mut affected: Vec<String> = self
            .decks
            .keys()
            .filter(|p| is_under(p, path))
            .cloned()
            .collect();
        // Renamed deck first, then descendants shallowest-first, so parent
        // directories exist before their children are written.
        affected.sort_by_key(|p| p.len());

        let mut moves = Vec::with_capacity(affected.len());
        for old in &affected {
            let new = format!("{}{}", new_path, &old[path.len()..]);
            backend.write_deck(&Deck::from_path(&new)).await?;
            moves.push((old.clone(), new));
        }

        // The backend writes went through; commit the in-memory rewrite.
        for (old, new) in &moves {
            self.decks.remove(old);
            self.decks.insert(new.clone(), Deck::from_path(new));
        }
        log::info!("Renamed deck {} -> {} ({} decks)", path, new_path, moves.len());
        Ok(moves)
    }

    /// Delete a deck and every descendant deck. The backend cascades the
    /// cards away with the subtree. Returns the removed deck paths.
    pub async fn delete(&mut self, path: &str) -> Result<Vec<String>> {
        let Some(backend) = self.backend.clone() else {
            return Ok(Vec::new());
        };
        if !self.contains(path) {
            return Err(HierarchyError::NotFound(path.to_string()));
        }

        backend.delete_deck(path).await?;

        let removed: Vec<String> = self
            .decks
            .keys()
            .filter(|p| is_under(p, path))
            .cloned()
            .collect();
        for p in &removed {
            self.decks.remove(p);
        }
        log::info!("Deleted deck {} ({} decks)", path, removed.len());
        Ok(removed)
    }

    /// Register a deck path and any missing ancestors, e.g. when a loaded
    /// card references a deck the backend has no record of.
    pub async fn ensure_path(&mut self, path: &str) -> Result<()> {
        let Some(backend) = self.backend.clone() else {
            return Ok(());
        };
        if path == "/" {
            return Ok(());
        }

        let mut prefix = String::new();
        for segment in path.trim_start_matches('/').split('/') {
            prefix = format!("{}/{}", prefix, segment);
            if !self.contains(&prefix) {
                let deck = Deck::from_path(&prefix);
                backend.write_deck(&deck).await?;
                self.decks.insert(prefix.clone(), deck);
            }
        }
        Ok(())
    }

    /// Build the nested deck tree bottom-up from the root, attaching the
    /// caller-supplied exact-match card counts.
    pub fn tree(&self, card_counts: &HashMap<String, usize>) -> Vec<DeckTreeItem> {
        self.build_subtree(None, card_counts)
    }

    fn build_subtree(
        &self,
        parent_path: Option<&str>,
        card_counts: &HashMap<String, usize>,
    ) -> Vec<DeckTreeItem> {
        self.children(parent_path)
            .into_iter()
            .map(|deck| DeckTreeItem {
                children: self.build_subtree(Some(&deck.path), card_counts),
                card_count: card_counts.get(&deck.path).copied().unwrap_or(0),
                deck,
            })
            .collect()
    }
}
