use anyhow::Result;

use karuta::markdown::render_html;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, id: &str, html: bool, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(id)?;

    if html {
        println!("{}", render_html(&card.front));
        for side in card.hidden_sides() {
            println!("<hr>");
            println!("{}", render_html(side));
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("id:        {}", card.id);
            println!("deck:      {}", card.deck_path);
            if !card.tags.is_empty() {
                println!("tags:      {}", card.tags.join(", "));
            }
            println!("state:     {}", card.state.as_str());
            match card.next_review_date {
                Some(date) => println!("due:       {}", date.to_rfc3339()),
                None => println!("due:       (unscheduled)"),
            }
            println!("updated:   {}", card.updated_at.to_rfc3339());
            println!();
            println!("{}", card.front);
            for side in card.hidden_sides() {
                println!("---");
                println!("{}", side);
            }
        }
    }

    Ok(())
}
