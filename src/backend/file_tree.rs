//! File-tree persistence backend
//!
//! The workspace is a plain directory: every subdirectory is a deck, every
//! `<id>.md` file inside one is a card encoded in the canonical text
//! format. Dot-prefixed entries (`.git`, `.karuta`, editor droppings) are
//! invisible to scans.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use walkdir::{DirEntry, WalkDir};

use super::{Backend, Result};
use crate::cards::{codec, Card};
use crate::decks::Deck;

pub struct FileTreeBackend {
    root: PathBuf,
}

impl FileTreeBackend {
    /// Open a workspace directory, creating it if needed.
    pub fn open(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        log::info!("Opened file-tree workspace at {:?}", root);
        Ok(Self { root })
    }

    /// Directory for a deck path; `/` maps to the workspace root itself.
    fn deck_dir(&self, deck_path: &str) -> PathBuf {
        let rel = deck_path.trim_start_matches('/');
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn card_file(&self, id: &str, deck_path: &str) -> PathBuf {
        self.deck_dir(deck_path).join(format!("{}.md", id))
    }

    /// Deck path of a directory relative to the root (`/` for the root).
    fn deck_path_of(&self, dir: &Path) -> String {
        let rel = dir.strip_prefix(&self.root).unwrap_or(dir);
        let rel = rel.to_string_lossy().replace('\\', "/");
        if rel.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", rel)
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}

#[async_trait]
impl Backend for FileTreeBackend {
    async fn read_all_cards(&self) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != "md")
            {
                continue;
            }

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Skipping unreadable card file {:?}: {}", path, e);
                    continue;
                }
            };

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let deck_path =
                self.deck_path_of(path.parent().unwrap_or(&self.root));

            let mut card = codec::decode(&content, &stem, &deck_path);
            // The directory a card sits in is authoritative; stale
            // frontmatter does not move it.
            card.deck_path = deck_path;
            let mtime: DateTime<Utc> = entry.metadata()?.modified()?.into();
            card.last_modified = mtime.timestamp_millis();
            cards.push(card);
        }

        Ok(cards)
    }

    async fn read_all_decks(&self) -> Result<Vec<Deck>> {
        let mut decks = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                decks.push(Deck::from_path(&self.deck_path_of(entry.path())));
            }
        }

        Ok(decks)
    }

    async fn write_card(&self, card: &Card) -> Result<()> {
        fs::create_dir_all(self.deck_dir(&card.deck_path))?;
        fs::write(self.card_file(&card.id, &card.deck_path), codec::encode(card))?;
        Ok(())
    }

    async fn delete_card(&self, id: &str, deck_path: &str) -> Result<()> {
        let file = self.card_file(id, deck_path);
        if file.exists() {
            fs::remove_file(&file)?;
        }
        Ok(())
    }

    async fn write_deck(&self, deck: &Deck) -> Result<()> {
        fs::create_dir_all(self.deck_dir(&deck.path))?;
        Ok(())
    }

    async fn delete_deck(&self, path: &str) -> Result<()> {
        if path == "/" {
            log::warn!("Refusing to delete the workspace root");
            return Ok(());
        }
        let dir = self.deck_dir(path);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
