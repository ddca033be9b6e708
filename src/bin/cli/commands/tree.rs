use anyhow::Result;

use karuta::decks::DeckTreeItem;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let tree = app.workspace.deck_tree();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        OutputFormat::Plain => {
            let root_count = app.workspace.cards.by_deck("/").len();
            println!("/ ({})", root_count);

            let total = tree.len();
            for (i, item) in tree.iter().enumerate() {
                print_item(item, "", i + 1 == total);
            }

            let cards = &app.workspace.cards;
            println!();
            println!("{} card(s), {} due", cards.len(), cards.due_count());
        }
    }

    Ok(())
}

fn print_item(item: &DeckTreeItem, prefix: &str, is_last: bool) {
    let connector = if is_last {
        "\u{2514}\u{2500}\u{2500} "
    } else {
        "\u{251c}\u{2500}\u{2500} "
    };
    println!(
        "{}{}{} ({})",
        prefix, connector, item.deck.name, item.card_count
    );

    let child_prefix = format!(
        "{}{}",
        prefix,
        if is_last { "    " } else { "\u{2502}   " }
    );
    let total = item.children.len();
    for (i, child) in item.children.iter().enumerate() {
        print_item(child, &child_prefix, i + 1 == total);
    }
}
