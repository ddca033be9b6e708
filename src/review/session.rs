//! Review session state and the controller driving it

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::cards::{Card, CardStore, ReviewQuality};
use crate::cards::store::Result;
use crate::decks::is_under;

/// Position within a session, for progress display
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub current: usize,
    pub total: usize,
    pub percent: usize,
}

/// An in-flight review session: a fixed shuffled card sequence, a cursor,
/// and running tallies. Never persisted.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    cards: Vec<Card>,
    current_index: usize,
    correct_count: usize,
    incorrect_count: usize,
    started_at: DateTime<Utc>,
}

impl ReviewSession {
    fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            current_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            started_at: Utc::now(),
        }
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.current_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.cards.len()
    }

    pub fn progress(&self) -> SessionProgress {
        let total = self.cards.len();
        let current = (self.current_index + 1).min(total);
        SessionProgress {
            current,
            total,
            percent: if total == 0 { 0 } else { current * 100 / total },
        }
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> usize {
        self.incorrect_count
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Drives at most one session at a time against a card store.
#[derive(Default)]
pub struct ReviewController {
    session: Option<ReviewSession>,
}

impl ReviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    /// Start a session over the due cards. With a deck path, candidates
    /// come from that deck and every deck nested under it; without one,
    /// from the whole store. No candidates means no session is created and
    /// the previous state is untouched.
    pub fn start(&mut self, store: &CardStore, deck_path: Option<&str>) -> Option<&ReviewSession> {
        let now = Utc::now();
        let mut cards: Vec<Card> = match deck_path {
            Some(path) => store
                .all()
                .into_iter()
                .filter(|c| is_under(&c.deck_path, path) && c.is_due(now))
                .collect(),
            None => store.due_for_review(),
        };

        if cards.is_empty() {
            return None;
        }

        cards.shuffle(&mut rand::thread_rng());
        log::info!("Started review session with {} cards", cards.len());
        self.session = Some(ReviewSession::new(cards));
        self.session.as_ref()
    }

    /// Answer the current card: schedule it through the store, tally the
    /// result, and advance the cursor. Without an active session or a
    /// current card this does nothing.
    pub async fn answer(
        &mut self,
        store: &mut CardStore,
        quality: ReviewQuality,
    ) -> Result<Option<Card>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let Some(card) = session.current_card() else {
            return Ok(None);
        };
        let id = card.id.clone();

        let updated = store.answer(&id, quality).await?;
        if quality.is_correct() {
            session.correct_count += 1;
        } else {
            session.incorrect_count += 1;
        }
        session.current_index += 1;
        Ok(updated)
    }

    /// Advance past the current card without tallying or scheduling.
    pub fn skip(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if !session.is_complete() {
                session.current_index += 1;
            }
        }
    }

    /// Discard the session unconditionally.
    pub fn end(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FileTreeBackend;
    use crate::cards::{CardPatch, CardState};
    use chrono::Duration;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn create_test_store() -> (CardStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileTreeBackend::open(temp_dir.path().to_path_buf()).unwrap();
        let mut store = CardStore::new(Some(Arc::new(backend)));
        store.load().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_empty_candidates_create_no_session() {
        let (store, _temp) = create_test_store().await;
        let mut controller = ReviewController::new();

        assert!(controller.start(&store, None).is_none());
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn test_session_scenario() {
        let (mut store, _temp) = create_test_store().await;

        // c1 is brand new, c2 was due yesterday; both qualify.
        let c1 = store
            .create("/", "c1".into(), "".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();
        let c2 = store
            .create("/", "c2".into(), "".into(), Vec::new())
            .await
            .unwrap()
            .unwrap();
        store
            .update(
                &c2.id,
                CardPatch {
                    state: Some(CardState::Review),
                    next_review_date: Some(Some(Utc::now() - Duration::days(1))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut controller = ReviewController::new();
        let session = controller.start(&store, None).unwrap();
        assert_eq!(session.progress().total, 2);

        let mut ids: Vec<String> = Vec::new();

        let first = controller
            .answer(&mut store, ReviewQuality::Easy)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.state, CardState::Review);
        assert!(first.next_review_date.unwrap() > Utc::now() + Duration::days(6));
        ids.push(first.id.clone());

        let second = controller
            .answer(&mut store, ReviewQuality::Again)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.state, CardState::Learning);
        ids.push(second.id.clone());

        ids.sort();
        let mut expected = vec![c1.id, c2.id];
        expected.sort();
        assert_eq!(ids, expected);

        let session = controller.session().unwrap();
        assert!(session.is_complete());
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.incorrect_count(), 1);

        // Answering past the end does nothing.
        assert!(controller
            .answer(&mut store, ReviewQuality::Good)
            .await
            .unwrap()
            .is_none());

        controller.end();
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn test_deck_scope_includes_nested() {
        let (mut store, _temp) = create_test_store().await;
        store
            .create("/A", "in deck".into(), "".into(), Vec::new())
            .await
            .unwrap();
        store
            .create("/A/X", "nested".into(), "".into(), Vec::new())
            .await
            .unwrap();
        store
            .create("/B", "elsewhere".into(), "".into(), Vec::new())
            .await
            .unwrap();

        let mut controller = ReviewController::new();
        let session = controller.start(&store, Some("/A")).unwrap();
        assert_eq!(session.progress().total, 2);
    }

    #[tokio::test]
    async fn test_skip_advances_without_tally() {
        let (mut store, _temp) = create_test_store().await;
        store
            .create("/", "only".into(), "".into(), Vec::new())
            .await
            .unwrap();

        let mut controller = ReviewController::new();
        controller.start(&store, None).unwrap();
        controller.skip();

        let session = controller.session().unwrap();
        assert!(session.is_complete());
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.incorrect_count(), 0);

        // Skipping a finished session stays put.
        controller.skip();
        assert!(controller.session().unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_progress_reporting() {
        let (mut store, _temp) = create_test_store().await;
        for i in 0..4 {
            store
                .create("/", format!("card {}", i), "".into(), Vec::new())
                .await
                .unwrap();
        }

        let mut controller = ReviewController::new();
        controller.start(&store, None).unwrap();

        let progress = controller.session().unwrap().progress();
        assert_eq!(progress.current, 1);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percent, 25);

        controller.skip();
        controller.skip();
        let progress = controller.session().unwrap().progress();
        assert_eq!(progress.current, 3);
        assert_eq!(progress.percent, 75);
    }
}
