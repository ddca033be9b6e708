use anyhow::{bail, Result};

use crate::app::App;
use crate::OutputFormat;

pub async fn run(
    app: &mut App,
    deck: &str,
    front: &str,
    back: Option<&str>,
    tags: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    if deck != "/" && app.workspace.decks.get(deck).is_none() {
        bail!(
            "No deck at {}. Create it first with `karuta deck new`.",
            deck
        );
    }

    let tags: Vec<String> = tags
        .map(|t| t.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let card = app
        .workspace
        .cards
        .create(
            deck,
            front.to_string(),
            back.unwrap_or_default().to_string(),
            tags,
        )
        .await?;

    match card {
        Some(card) => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
            OutputFormat::Plain => println!("Added card {} to {}", card.id, card.deck_path),
        },
        None => println!("No workspace configured."),
    }
    Ok(())
}
