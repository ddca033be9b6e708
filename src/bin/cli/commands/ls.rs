use anyhow::{bail, Result};

use karuta::cards::{CardFilter, CardState};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    query: Option<String>,
    deck: Option<String>,
    state: Option<&str>,
    tags: Vec<String>,
    format: &OutputFormat,
) -> Result<()> {
    let state = match state {
        Some(s) => match CardState::parse(s) {
            Some(state) => Some(state),
            None => bail!("Unknown state '{}' (expected new, learning, review, mastered)", s),
        },
        None => None,
    };

    let filter = CardFilter {
        deck_path: deck,
        tags,
        state,
        query,
    };

    let mut cards = app.workspace.cards.filter(&filter);
    cards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards found.");
                return Ok(());
            }

            for card in &cards {
                let front = card.front.lines().next().unwrap_or_default();
                let front = if front.chars().count() > 60 {
                    format!("{}\u{2026}", front.chars().take(59).collect::<String>())
                } else {
                    front.to_string()
                };
                let short_id: String = card.id.chars().take(8).collect();
                println!(
                    "{:<8}  {:<9} {:<20} {}",
                    short_id,
                    card.state.as_str(),
                    card.deck_path,
                    front
                );
            }
            println!("{} card(s)", cards.len());
        }
    }

    Ok(())
}
