//! Canonical text format for cards
//!
//! ```text
//! ---
//! id: 4f7c...
//! deckPath: /Japanese/Vocabulary
//! tags: kanji, n5
//! state: review
//! nextReviewDate: 2026-03-01T09:00:00+00:00
//! createdAt: 2026-02-01T09:00:00+00:00
//! updatedAt: 2026-02-22T09:00:00+00:00
//! ---
//! front text
//! ---
//! back text
//! ```
//!
//! Decoding is tolerant: unknown frontmatter keys are ignored, missing keys
//! take defaults, and content without a frontmatter block becomes an
//! untagged card whose front is the whole text. Malformed content never
//! fails to decode; the card stays available with permissive defaults.

use chrono::{DateTime, Utc};

use super::models::{normalize_tags, Card, CardState};

/// Literal token encoding a null `nextReviewDate`.
const NONE_DATE: &str = "none";

/// Serialize a card to its canonical text form. Fields are written
/// verbatim; mutation paths stamp `updatedAt` before persisting.
pub fn encode(card: &Card) -> String {
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("id: {}\n", card.id));
    out.push_str(&format!("deckPath: {}\n", card.deck_path));
    if !card.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", card.tags.join(", ")));
    }
    out.push_str(&format!("state: {}\n", card.state.as_str()));
    match card.next_review_date {
        Some(date) => out.push_str(&format!("nextReviewDate: {}\n", date.to_rfc3339())),
        None => out.push_str(&format!("nextReviewDate: {}\n", NONE_DATE)),
    }
    out.push_str(&format!("createdAt: {}\n", card.created_at.to_rfc3339()));
    out.push_str(&format!("updatedAt: {}\n", card.updated_at.to_rfc3339()));
    out.push_str("---\n");
    out.push_str(card.front.trim());
    out.push_str("\n---\n");
    out.push_str(card.back.trim());
    out.push('\n');
    out
}

/// Parse card text. `fallback_id` is derived from the storage key (file
/// stem or row id) and `fallback_deck` from the storage location; both are
/// used when the frontmatter omits the corresponding key.
pub fn decode(text: &str, fallback_id: &str, fallback_deck: &str) -> Card {
    let text = text.replace("\r\n", "\n");
    let now = Utc::now();

    let mut card = Card {
        id: fallback_id.to_string(),
        deck_path: fallback_deck.to_string(),
        front: String::new(),
        back: String::new(),
        tags: Vec::new(),
        state: CardState::New,
        next_review_date: None,
        created_at: now,
        updated_at: now,
        last_modified: 0,
    };

    let (frontmatter, body) = match split_frontmatter(&text) {
        Some((fm, body)) => (fm, body),
        None => {
            // No frontmatter block: the whole text is the front.
            card.front = text.trim().to_string();
            return card;
        }
    };

    for line in frontmatter.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("id:") {
            let value = value.trim();
            if !value.is_empty() {
                card.id = value.to_string();
            }
        } else if let Some(value) = line.strip_prefix("deckPath:") {
            let value = value.trim();
            if !value.is_empty() {
                card.deck_path = value.to_string();
            }
        } else if let Some(value) = line.strip_prefix("tags:") {
            card.tags = normalize_tags(value.split(',').map(str::to_string).collect());
        } else if let Some(value) = line.strip_prefix("state:") {
            card.state = CardState::parse(value.trim()).unwrap_or_default();
        } else if let Some(value) = line.strip_prefix("nextReviewDate:") {
            let value = value.trim();
            card.next_review_date = if value == NONE_DATE {
                None
            } else {
                parse_datetime(value)
            };
        } else if let Some(value) = line.strip_prefix("createdAt:") {
            card.created_at = parse_datetime(value).unwrap_or(now);
        } else if let Some(value) = line.strip_prefix("updatedAt:") {
            card.updated_at = parse_datetime(value).unwrap_or(now);
        }
        // Unknown keys are ignored for forward compatibility.
    }

    let (front, back) = split_body(body);
    card.front = front.trim().to_string();
    card.back = back.trim().to_string();
    card
}

/// Split off the leading `---`-delimited frontmatter block, if present.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;
    let end = rest.find("\n---")?;
    let frontmatter = &rest[..end];
    let body = &rest[end + 4..];
    Some((frontmatter, body.strip_prefix('\n').unwrap_or(body)))
}

/// Split the body on the first line containing only `---`. Text before is
/// the front; text after is the back (empty when the separator is absent).
fn split_body(body: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.strip_suffix('\n').unwrap_or(line) == "---" {
            return (&body[..offset], &body[offset + line.len()..]);
        }
        offset += line.len();
    }
    (body, "")
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
