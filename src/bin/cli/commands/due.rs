use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let mut cards = app.workspace.cards.due_for_review();
    // Never-scheduled cards first, then oldest due date first.
    cards.sort_by_key(|c| c.next_review_date);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("Nothing due.");
                return Ok(());
            }
            for card in &cards {
                let due = card
                    .next_review_date
                    .map(|d| d.to_rfc3339())
                    .unwrap_or_else(|| "never reviewed".to_string());
                let front = card.front.lines().next().unwrap_or_default();
                let short_id: String = card.id.chars().take(8).collect();
                println!("{:<8}  {:<20} {:<28} {}", short_id, card.deck_path, due, front);
            }
            println!("{} card(s) due", cards.len());
        }
    }

    Ok(())
}
