//! Data models for cards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review lifecycle state of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    /// Never reviewed
    New,
    /// In the short-interval learning phase
    Learning,
    /// Graduated to the long-interval phase
    Review,
    /// Terminal state; no answer produces it
    Mastered,
}

impl Default for CardState {
    fn default() -> Self {
        Self::New
    }
}

impl CardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Mastered => "mastered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "review" => Some(Self::Review),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

/// Answer quality for a reviewed card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewQuality {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewQuality {
    /// Good and easy answers count as correct in session tallies.
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Good | Self::Easy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

/// A flashcard with front/back markdown and its scheduling state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub deck_path: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub state: CardState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Millisecond write-ordering marker; strictly advances on every write.
    #[serde(default)]
    pub last_modified: i64,
}

impl Card {
    pub fn new(deck_path: String, front: String, back: String, tags: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            deck_path,
            front,
            back,
            tags: normalize_tags(tags),
            state: CardState::New,
            next_review_date: None,
            created_at: now,
            updated_at: now,
            last_modified: now.timestamp_millis(),
        }
    }

    /// A card is due when it has never been reviewed, or its scheduled
    /// instant has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.state {
            CardState::New => true,
            _ => self
                .next_review_date
                .map(|due| due < now)
                .unwrap_or(false),
        }
    }

    /// Stamp the mutation timestamps. `last_modified` never repeats even if
    /// the wall clock stands still between writes.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = now;
        self.last_modified = now.timestamp_millis().max(self.last_modified + 1);
    }

    /// Split the back text into its ordered hidden sides. Display concern
    /// only; storage treats `back` as one opaque block.
    pub fn hidden_sides(&self) -> Vec<&str> {
        if self.back.trim().is_empty() {
            return Vec::new();
        }
        self.back
            .split("\n---\n")
            .map(str::trim)
            .filter(|side| !side.is_empty())
            .collect()
    }
}

/// Tags behave as a set: trimmed, empties dropped, duplicates removed
/// (first occurrence wins).
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Typed partial update for a card. Identity fields (`id`, `createdAt`)
/// are deliberately not representable here.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub deck_path: Option<String>,
    pub front: Option<String>,
    pub back: Option<String>,
    pub tags: Option<Vec<String>>,
    pub state: Option<CardState>,
    /// Outer `None` leaves the date alone; `Some(None)` clears it.
    pub next_review_date: Option<Option<DateTime<Utc>>>,
}

/// Listing filter over the card set
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    pub deck_path: Option<String>,
    pub tags: Vec<String>,
    pub state: Option<CardState>,
    pub query: Option<String>,
}

impl CardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        if let Some(deck) = &self.deck_path {
            if &card.deck_path != deck {
                return false;
            }
        }
        if !self.tags.iter().all(|t| card.tags.contains(t)) {
            return false;
        }
        if let Some(state) = self.state {
            if card.state != state {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let query = query.to_lowercase();
            if !card.front.to_lowercase().contains(&query)
                && !card.back.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_card_is_due() {
        let card = Card::new("/".into(), "q".into(), "a".into(), Vec::new());
        assert_eq!(card.state, CardState::New);
        assert!(card.is_due(Utc::now()));
    }

    #[test]
    fn test_future_date_is_not_due() {
        let mut card = Card::new("/".into(), "q".into(), "a".into(), Vec::new());
        card.state = CardState::Review;
        card.next_review_date = Some(Utc::now() + Duration::days(2));
        assert!(!card.is_due(Utc::now()));
    }

    #[test]
    fn test_new_state_overrides_future_date() {
        let mut card = Card::new("/".into(), "q".into(), "a".into(), Vec::new());
        card.next_review_date = Some(Utc::now() + Duration::days(2));
        assert!(card.is_due(Utc::now()));
    }

    #[test]
    fn test_unscheduled_non_new_is_not_due() {
        let mut card = Card::new("/".into(), "q".into(), "a".into(), Vec::new());
        card.state = CardState::Mastered;
        card.next_review_date = None;
        assert!(!card.is_due(Utc::now()));
    }

    #[test]
    fn test_touch_advances_marker() {
        let mut card = Card::new("/".into(), "q".into(), "a".into(), Vec::new());
        let first = card.last_modified;
        card.touch();
        let second = card.last_modified;
        card.touch();
        assert!(second > first);
        assert!(card.last_modified > second);
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            " kanji ".into(),
            "".into(),
            "grammar".into(),
            "kanji".into(),
        ]);
        assert_eq!(tags, vec!["kanji".to_string(), "grammar".to_string()]);
    }

    #[test]
    fn test_hidden_sides() {
        let mut card = Card::new("/".into(), "q".into(), String::new(), Vec::new());
        assert!(card.hidden_sides().is_empty());

        card.back = "first\n---\nsecond\n---\nthird".into();
        assert_eq!(card.hidden_sides(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_filter_matches() {
        let mut card = Card::new(
            "/Japanese".into(),
            "What is 猫?".into(),
            "cat".into(),
            vec!["vocab".into()],
        );
        card.state = CardState::Learning;

        let filter = CardFilter {
            deck_path: Some("/Japanese".into()),
            tags: vec!["vocab".into()],
            state: Some(CardState::Learning),
            query: Some("CAT".into()),
        };
        assert!(filter.matches(&card));

        let wrong_deck = CardFilter {
            deck_path: Some("/French".into()),
            ..Default::default()
        };
        assert!(!wrong_deck.matches(&card));
    }
}
