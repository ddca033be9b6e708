use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use karuta::cards::Card;
use karuta::config::{BackendKind, Config};
use karuta::Workspace;

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub root: PathBuf,
    pub workspace: Workspace,
}

impl App {
    /// Open the configured workspace (or an explicit override) and load it.
    pub async fn new(workspace_override: Option<PathBuf>) -> Result<Self> {
        let config = Config::load().context("Failed to read config")?;

        let root = match workspace_override.or_else(|| config.workspace_path.clone()) {
            Some(root) => root,
            None => bail!("No workspace configured. Run `karuta init <path>` first."),
        };

        let mut workspace = match config.backend {
            BackendKind::FileTree => Workspace::open_file_tree(root.clone())?,
            BackendKind::Index => {
                Workspace::open_index(root.join(".karuta").join("index.db"))?
            }
        };
        workspace.load().await.context("Failed to load workspace")?;

        Ok(Self {
            config,
            root,
            workspace,
        })
    }

    /// Find a card by id; an unambiguous id prefix also works.
    pub fn find_card(&self, id: &str) -> Result<Card> {
        if let Some(card) = self.workspace.cards.get(id) {
            return Ok(card.clone());
        }

        let matches: Vec<Card> = self
            .workspace
            .cards
            .all()
            .into_iter()
            .filter(|c| c.id.starts_with(id))
            .collect();

        match matches.len() {
            0 => bail!("No card matching '{}'", id),
            1 => Ok(matches[0].clone()),
            n => bail!("Ambiguous card id '{}' ({} matches)", id, n),
        }
    }
}
