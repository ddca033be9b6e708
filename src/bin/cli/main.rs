mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use karuta::config::BackendKind;

#[derive(Parser)]
#[command(name = "karuta", about = "File-backed flashcards with spaced review", version)]
struct Cli {
    /// Workspace directory (overrides the configured workspace)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum BackendArg {
    /// Decks as directories, cards as markdown files
    FileTree,
    /// A single embedded SQLite index
    Index,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::FileTree => BackendKind::FileTree,
            BackendArg::Index => BackendKind::Index,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Select the workspace directory and backend
    Init {
        /// Workspace directory (created if missing)
        path: PathBuf,
        /// Persistence backend
        #[arg(long, value_enum, default_value = "file-tree")]
        backend: BackendArg,
    },

    /// Show the deck tree with card counts
    Tree,

    /// Deck management
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Add a card to a deck
    Add {
        /// Deck path (e.g. /Japanese/Kanji, or / for the root)
        deck: String,
        /// Front (question) text
        front: String,
        /// Back (answer) text; use `---` lines inside for hidden sides
        back: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// List cards
    Ls {
        /// Substring match over front/back text
        query: Option<String>,
        /// Filter by exact deck path
        #[arg(long)]
        deck: Option<String>,
        /// Filter by state (new, learning, review, mastered)
        #[arg(long)]
        state: Option<String>,
        /// Require a tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,
    },

    /// Show one card
    Show {
        /// Card id (an unambiguous prefix works)
        id: String,
        /// Render the card faces to HTML
        #[arg(long)]
        html: bool,
    },

    /// List cards due for review
    Due,

    /// Review due cards interactively
    Review {
        /// Restrict to a deck and every deck nested under it
        #[arg(long)]
        deck: Option<String>,
    },

    /// Delete a card
    Rm {
        /// Card id (an unambiguous prefix works)
        id: String,
    },

    /// Version control for the workspace
    #[command(subcommand)]
    Git(GitCommand),
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a deck
    New {
        name: String,
        /// Parent deck path (top-level when omitted)
        #[arg(long)]
        parent: Option<String>,
    },
    /// Rename a deck (cascades to nested decks and their cards)
    Rename { path: String, new_name: String },
    /// Delete a deck, its nested decks, and all cards under them
    Rm { path: String },
}

#[derive(Subcommand)]
enum GitCommand {
    /// Show repository status
    Status,
    /// Initialize a repository in the workspace
    Init,
    /// Stage everything and commit
    Commit {
        /// Commit message (defaults to "Update cards")
        message: Option<String>,
    },
    /// Push the current branch to origin
    Push,
    /// Pull from origin
    Pull,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Init { path, backend } => {
            commands::init::run(path, backend.into())?;
        }
        Command::Tree => {
            let app = app::App::new(cli.workspace).await?;
            commands::tree::run(&app, &cli.format)?;
        }
        Command::Deck(subcmd) => {
            let mut app = app::App::new(cli.workspace).await?;
            match subcmd {
                DeckCommand::New { name, parent } => {
                    commands::deck::run_new(&mut app, &name, parent.as_deref()).await?;
                }
                DeckCommand::Rename { path, new_name } => {
                    commands::deck::run_rename(&mut app, &path, &new_name).await?;
                }
                DeckCommand::Rm { path } => {
                    commands::deck::run_rm(&mut app, &path).await?;
                }
            }
        }
        Command::Add {
            deck,
            front,
            back,
            tags,
        } => {
            let mut app = app::App::new(cli.workspace).await?;
            commands::add::run(
                &mut app,
                &deck,
                &front,
                back.as_deref(),
                tags.as_deref(),
                &cli.format,
            )
            .await?;
        }
        Command::Ls {
            query,
            deck,
            state,
            tag,
        } => {
            let app = app::App::new(cli.workspace).await?;
            commands::ls::run(&app, query, deck, state.as_deref(), tag, &cli.format)?;
        }
        Command::Show { id, html } => {
            let app = app::App::new(cli.workspace).await?;
            commands::show::run(&app, &id, html, &cli.format)?;
        }
        Command::Due => {
            let app = app::App::new(cli.workspace).await?;
            commands::due::run(&app, &cli.format)?;
        }
        Command::Review { deck } => {
            let mut app = app::App::new(cli.workspace).await?;
            commands::review::run(&mut app, deck.as_deref()).await?;
        }
        Command::Rm { id } => {
            let mut app = app::App::new(cli.workspace).await?;
            commands::rm::run(&mut app, &id).await?;
        }
        Command::Git(subcmd) => {
            let app = app::App::new(cli.workspace).await?;
            match subcmd {
                GitCommand::Status => commands::git::run_status(&app, &cli.format)?,
                GitCommand::Init => commands::git::run_init(&app)?,
                GitCommand::Commit { message } => {
                    commands::git::run_commit(&app, message.as_deref())?;
                }
                GitCommand::Push => commands::git::run_push(&app)?,
                GitCommand::Pull => commands::git::run_pull(&app)?,
            }
        }
    }

    Ok(())
}
