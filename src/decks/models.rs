//! Data models for decks

use serde::{Deserialize, Serialize};

/// A deck: a named node in the hierarchy, addressed by path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    /// Unique slash-delimited key, always starting with `/`.
    pub path: String,
    /// Final segment of `path`.
    pub name: String,
    /// Path of the immediate parent; `None` for top-level decks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
}

impl Deck {
    /// Build a deck record from its path; name and parent are derived so
    /// they cannot drift apart.
    pub fn from_path(path: &str) -> Self {
        let idx = path.rfind('/').unwrap_or(0);
        let name = path[idx + 1..].to_string();
        let parent_path = if idx == 0 {
            None
        } else {
            Some(path[..idx].to_string())
        };
        Self {
            path: path.to_string(),
            name,
            parent_path,
        }
    }

    /// Compose a child path under `parent` (or under the root).
    pub fn child_path(parent: Option<&str>, name: &str) -> String {
        match parent {
            Some(parent) => format!("{}/{}", parent, name),
            None => format!("/{}", name),
        }
    }
}

/// True when `path` is `prefix` itself or nested anywhere below it.
/// The root `/` contains every path.
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix || path.starts_with(&format!("{}/", prefix))
}

/// One node of the nested deck tree, with its exact-match card count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckTreeItem {
    pub deck: Deck,
    pub children: Vec<DeckTreeItem>,
    /// Cards whose `deckPath` equals this deck's path. Counts do not roll
    /// up from children.
    pub card_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_top_level() {
        let deck = Deck::from_path("/Japanese");
        assert_eq!(deck.name, "Japanese");
        assert_eq!(deck.parent_path, None);
    }

    #[test]
    fn test_from_path_nested() {
        let deck = Deck::from_path("/Japanese/Kanji/N5");
        assert_eq!(deck.name, "N5");
        assert_eq!(deck.parent_path, Some("/Japanese/Kanji".to_string()));
    }

    #[test]
    fn test_child_path() {
        assert_eq!(Deck::child_path(None, "Japanese"), "/Japanese");
        assert_eq!(
            Deck::child_path(Some("/Japanese"), "Kanji"),
            "/Japanese/Kanji"
        );
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("/A", "/A"));
        assert!(is_under("/A/X", "/A"));
        assert!(is_under("/A/X/Y", "/A"));
        assert!(!is_under("/AB", "/A"));
        assert!(!is_under("/B", "/A"));
        assert!(is_under("/anything", "/"));
        assert!(is_under("/", "/"));
    }
}
