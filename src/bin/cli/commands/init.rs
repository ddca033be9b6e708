use std::path::PathBuf;

use anyhow::{Context, Result};

use karuta::config::{BackendKind, Config};

pub fn run(path: PathBuf, backend: BackendKind) -> Result<()> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create workspace directory {:?}", path))?;
    let path = path
        .canonicalize()
        .context("Failed to resolve workspace path")?;

    let mut config = Config::load().context("Failed to read config")?;
    config.workspace_path = Some(path.clone());
    config.backend = backend;
    config.save().context("Failed to write config")?;

    println!("Workspace set to {:?}", path);
    Ok(())
}
