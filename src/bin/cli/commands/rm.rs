use anyhow::Result;

use crate::app::App;

pub async fn run(app: &mut App, id: &str) -> Result<()> {
    let card = app.find_card(id)?;
    app.workspace.cards.delete(&card.id).await?;
    println!("Deleted card {}", card.id);
    Ok(())
}
