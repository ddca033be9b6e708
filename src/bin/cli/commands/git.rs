use anyhow::Result;

use karuta::git;

use crate::app::App;
use crate::OutputFormat;

pub fn run_status(app: &App, format: &OutputFormat) -> Result<()> {
    let status = git::status(&app.root)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Plain => {
            if !status.is_repo {
                println!("Not a git repository. Run `karuta git init` to start tracking.");
                return Ok(());
            }
            println!("{} pending change(s)", status.changes);
            if let Some(time) = git::last_commit_time(&app.root)? {
                println!("Last commit: {}", time.to_rfc3339());
            }
        }
    }

    Ok(())
}

pub fn run_init(app: &App) -> Result<()> {
    git::init_repo(&app.root)?;
    println!("Initialized repository in {:?}", app.root);
    Ok(())
}

pub fn run_commit(app: &App, message: Option<&str>) -> Result<()> {
    let message = message.unwrap_or("Update cards");
    let info = git::commit_all(&app.root, message)?;
    println!("[{}] {}", info.short_id, info.message);
    Ok(())
}

pub fn run_push(app: &App) -> Result<()> {
    git::push(&app.root, None)?;
    println!("Pushed.");
    Ok(())
}

pub fn run_pull(app: &App) -> Result<()> {
    git::pull(&app.root, None)?;
    println!("Pulled.");
    Ok(())
}
