//! Record-index persistence backend
//!
//! A single embedded SQLite database holding every card and deck record.
//! Card content is stored in the same canonical text form the file-tree
//! backend writes, so both backends round-trip through one codec.

use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::{Backend, Result};
use crate::cards::{codec, Card};
use crate::decks::Deck;

const SCHEMA_VERSION: &str = "1";

pub struct IndexBackend {
    conn: Mutex<Connection>,
}

impl IndexBackend {
    /// Open (or create) the index database at the given path.
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cards (
                id TEXT PRIMARY KEY,
                deck_path TEXT NOT NULL,
                content TEXT NOT NULL,
                last_modified INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_path);

            CREATE TABLE IF NOT EXISTS decks (
                path TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                parent_path TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_decks_parent ON decks(parent_path);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schemaVersion'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match version {
            None => {
                conn.execute(
                    "INSERT INTO metadata (key, value) VALUES ('schemaVersion', ?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(v) if v != SCHEMA_VERSION => {
                log::warn!("Card index has schema version {}, expected {}", v, SCHEMA_VERSION);
            }
            Some(_) => {}
        }

        log::info!("Opened card index at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Backend for IndexBackend {
    async fn read_all_cards(&self) -> Result<Vec<Card>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, deck_path, content, last_modified FROM cards")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut cards = Vec::new();
        for row in rows {
            let (id, deck_path, content, last_modified) = row?;
            let mut card = codec::decode(&content, &id, &deck_path);
            // The row is the storage key; stale frontmatter does not win.
            card.id = id;
            card.deck_path = deck_path;
            card.last_modified = last_modified;
            cards.push(card);
        }
        Ok(cards)
    }

    async fn read_all_decks(&self) -> Result<Vec<Deck>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT path, name, parent_path FROM decks")?;
        let rows = stmt.query_map([], |row| {
            Ok(Deck {
                path: row.get(0)?,
                name: row.get(1)?,
                parent_path: row.get(2)?,
            })
        })?;

        let mut decks = Vec::new();
        for deck in rows {
            decks.push(deck?);
        }
        Ok(decks)
    }

    async fn write_card(&self, card: &Card) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO cards (id, deck_path, content, last_modified)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                card.id,
                card.deck_path,
                codec::encode(card),
                card.last_modified
            ],
        )?;
        Ok(())
    }

    async fn delete_card(&self, id: &str, deck_path: &str) -> Result<()> {
        // The (id, deck path) pair is the storage key. A card moved across
        // decks replaces its row first; deleting the old key must not take
        // the new row with it.
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM cards WHERE id = ?1 AND deck_path = ?2",
            params![id, deck_path],
        )?;
        Ok(())
    }

    async fn write_deck(&self, deck: &Deck) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO decks (path, name, parent_path) VALUES (?1, ?2, ?3)",
            params![deck.path, deck.name, deck.parent_path],
        )?;
        Ok(())
    }

    async fn delete_deck(&self, path: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let prefix = format!("{}/%", path);
        conn.execute(
            "DELETE FROM decks WHERE path = ?1 OR path LIKE ?2",
            params![path, prefix],
        )?;
        conn.execute(
            "DELETE FROM cards WHERE deck_path = ?1 OR deck_path LIKE ?2",
            params![path, prefix],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_backend() -> (IndexBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = IndexBackend::open(temp_dir.path().join("index.db")).unwrap();
        (backend, temp_dir)
    }

    #[tokio::test]
    async fn test_card_round_trip() {
        let (backend, _temp) = create_test_backend();

        let mut card = Card::new(
            "/Japanese".into(),
            "front".into(),
            "back".into(),
            vec!["vocab".into()],
        );
        card.touch();
        backend.write_card(&card).await.unwrap();

        let cards = backend.read_all_cards().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, card.id);
        assert_eq!(cards[0].front, "front");
        assert_eq!(cards[0].tags, vec!["vocab".to_string()]);
        assert_eq!(cards[0].last_modified, card.last_modified);
    }

    #[tokio::test]
    async fn test_write_card_replaces() {
        let (backend, _temp) = create_test_backend();

        let mut card = Card::new("/".into(), "v1".into(), "a".into(), Vec::new());
        backend.write_card(&card).await.unwrap();

        card.front = "v2".into();
        card.touch();
        backend.write_card(&card).await.unwrap();

        let cards = backend.read_all_cards().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "v2");
    }

    #[tokio::test]
    async fn test_deck_round_trip_and_delete() {
        let (backend, _temp) = create_test_backend();

        for path in ["/A", "/A/X", "/AB", "/B"] {
            backend.write_deck(&Deck::from_path(path)).await.unwrap();
        }

        let card_in = Card::new("/A/X".into(), "q".into(), "a".into(), Vec::new());
        let card_out = Card::new("/B".into(), "q".into(), "a".into(), Vec::new());
        backend.write_card(&card_in).await.unwrap();
        backend.write_card(&card_out).await.unwrap();

        backend.delete_deck("/A").await.unwrap();

        let mut deck_paths: Vec<String> = backend
            .read_all_decks()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.path)
            .collect();
        deck_paths.sort();
        // Prefix match must not catch the sibling /AB.
        assert_eq!(deck_paths, vec!["/AB", "/B"]);

        let cards = backend.read_all_cards().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, card_out.id);
    }

    #[tokio::test]
    async fn test_reopen_keeps_records() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("index.db");

        let card = Card::new("/".into(), "q".into(), "a".into(), Vec::new());
        {
            let backend = IndexBackend::open(db_path.clone()).unwrap();
            backend.write_card(&card).await.unwrap();
        }

        let backend = IndexBackend::open(db_path).unwrap();
        let cards = backend.read_all_cards().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, card.id);
    }
}
