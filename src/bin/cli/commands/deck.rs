use anyhow::Result;

use crate::app::App;

pub async fn run_new(app: &mut App, name: &str, parent: Option<&str>) -> Result<()> {
    match app.workspace.create_deck(name, parent).await? {
        Some(deck) => println!("Created deck {}", deck.path),
        None => println!("No workspace configured."),
    }
    Ok(())
}

pub async fn run_rename(app: &mut App, path: &str, new_name: &str) -> Result<()> {
    match app.workspace.rename_deck(path, new_name).await? {
        Some(new_path) => println!("Renamed {} to {}", path, new_path),
        None => println!("Nothing to rename."),
    }
    Ok(())
}

pub async fn run_rm(app: &mut App, path: &str) -> Result<()> {
    let evicted = app.workspace.delete_deck(path).await?;
    println!("Deleted {} and {} card(s) under it", path, evicted);
    Ok(())
}
