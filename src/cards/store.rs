//! The card store: in-memory set with write-through persistence
//!
//! The store owns the authoritative card set, indexed by id. Every
//! mutation writes through to the backend before the in-memory copy
//! changes, so a failed write leaves memory and storage agreeing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::models::{normalize_tags, Card, CardFilter, CardPatch, ReviewQuality};
use super::scheduler;
use crate::backend::{Backend, BackendError};
use crate::decks::is_under;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Card not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Owns the authoritative in-memory card set. Without a configured
/// backend every operation is a no-op returning empty/`None`.
pub struct CardStore {
    backend: Option<Arc<dyn Backend>>,
    cards: HashMap<String, Card>,
}

impl CardStore {
    pub fn new(backend: Option<Arc<dyn Backend>>) -> Self {
        Self {
            backend,
            cards: HashMap::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Replace the in-memory set with a full re-read from the backend.
    /// Duplicate ids (a copied card file, an interrupted move) resolve to
    /// the copy with the most recent write marker.
    pub async fn load(&mut self) -> Result<usize> {
        let Some(backend) = &self.backend else {
            return Ok(0);
        };
        let cards = backend.read_all_cards().await?;
        self.cards.clear();
        for card in cards {
            match self.cards.get(&card.id) {
                Some(existing) => {
                    log::warn!(
                        "Duplicate card id {} under {} and {}; keeping the newer copy",
                        card.id,
                        existing.deck_path,
                        card.deck_path
                    );
                    if card.last_modified > existing.last_modified {
                        self.cards.insert(card.id.clone(), card);
                    }
                }
                None => {
                    self.cards.insert(card.id.clone(), card);
                }
            }
        }
        log::info!("Loaded {} cards", self.cards.len());
        Ok(self.cards.len())
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn all(&self) -> Vec<Card> {
        self.cards.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards whose deck path equals `deck_path` exactly (nested decks are
    /// separate decks).
    pub fn by_deck(&self, deck_path: &str) -> Vec<Card> {
        self.cards
            .values()
            .filter(|c| c.deck_path == deck_path)
            .cloned()
            .collect()
    }

    pub fn filter(&self, filter: &CardFilter) -> Vec<Card> {
        self.cards
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    /// Cards due right now: never-reviewed cards, plus cards whose
    /// scheduled instant has passed. Pure function of stored state and the
    /// wall clock; nothing ticks in the background.
    pub fn due_for_review(&self) -> Vec<Card> {
        let now = Utc::now();
        self.cards
            .values()
            .filter(|c| c.is_due(now))
            .cloned()
            .collect()
    }

    pub fn due_count(&self) -> usize {
        let now = Utc::now();
        self.cards.values().filter(|c| c.is_due(now)).count()
    }

    /// Exact-match tally of cards per deck path, for the deck tree.
    pub fn count_by_deck(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for card in self.cards.values() {
            *counts.entry(card.deck_path.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Create a card and write it through before returning it.
    pub async fn create(
        &mut self,
        deck_path: &str,
        front: String,
        back: String,
        tags: Vec<String>,
    ) -> Result<Option<Card>> {
        let Some(backend) = self.backend.clone() else {
            return Ok(None);
        };

        let card = Card::new(deck_path.to_string(), front, back, tags);
        backend.write_card(&card).await?;
        self.cards.insert(card.id.clone(), card.clone());
        Ok(Some(card))
    }

    /// Merge a patch onto a card, stamp `updatedAt`/`lastModified`, and
    /// write through. The in-memory card only changes once the backend
    /// write has succeeded.
    pub async fn update(&mut self, id: &str, patch: CardPatch) -> Result<Option<Card>> {
        let Some(backend) = self.backend.clone() else {
            return Ok(None);
        };
        let existing = self
            .cards
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let old_deck = existing.deck_path.clone();
        let mut updated = existing.clone();
        if let Some(deck_path) = patch.deck_path {
            updated.deck_path = deck_path;
        }
        if let Some(front) = patch.front {
            updated.front = front;
        }
        if let Some(back) = patch.back {
            updated.back = back;
        }
        if let Some(tags) = patch.tags {
            updated.tags = normalize_tags(tags);
        }
        if let Some(state) = patch.state {
            updated.state = state;
        }
        if let Some(date) = patch.next_review_date {
            updated.next_review_date = date;
        }
        updated.touch();

        backend.write_card(&updated).await?;
        if updated.deck_path != old_deck {
            // The storage key moved with the deck path; drop the old one.
            backend.delete_card(id, &old_deck).await?;
        }
        self.cards.insert(id.to_string(), updated.clone());
        Ok(Some(updated))
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let Some(backend) = self.backend.clone() else {
            return Ok(());
        };
        let card = self
            .cards
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        backend.delete_card(id, &card.deck_path).await?;
        self.cards.remove(id);
        Ok(())
    }

    /// Answer a card: run the scheduler and persist the outcome through
    /// the regular update path.
    pub async fn answer(&mut self, id: &str, quality: ReviewQuality) -> Result<Option<Card>> {
        if !self.is_ready() {
            return Ok(None);
        }
        let card = self
            .cards
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let outcome = scheduler::apply_answer(card.state, quality, Utc::now());
        self.update(
            id,
            CardPatch {
                state: Some(outcome.state),
                next_review_date: Some(Some(outcome.next_review_date)),
                ..Default::default()
            },
        )
        .await
    }

    /// Rewrite every card under `old_prefix` to live under `new_prefix`,
    /// moving each storage key. Part of the deck-rename cascade.
    pub async fn rebase_deck_prefix(
        &mut self,
        old_prefix: &str,
        new_prefix: &str,
    ) -> Result<usize> {
        let moves: Vec<(String, String)> = self
            .cards
            .values()
            .filter(|c| is_under(&c.deck_path, old_prefix))
            .map(|c| {
                let new_deck =
                    format!("{}{}", new_prefix, &c.deck_path[old_prefix.len()..]);
                (c.id.clone(), new_deck)
            })
            .collect();

        for (id, new_deck) in &moves {
            self.update(
                id,
                CardPatch {
                    deck_path: Some(new_deck.clone()),
                    ..Default::default()
                },
            )
            .await?;
        }
        Ok(moves.len())
    }

    /// Forget cards under a deleted deck subtree. The backend has already
    /// cascaded their records away with the deck.
    pub fn evict_deck_prefix(&mut self, prefix: &str) -> usize {
        let before = self.cards.len();
        self.cards.retain(|_, c| !is_under(&c.deck_path, prefix));
        before - self.cards.len()
    }
}
