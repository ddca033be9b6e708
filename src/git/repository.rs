//! Git repository operations
//!
//! The narrow command-runner surface the application uses against a
//! workspace root: status, init, commit, push, pull, last commit time.

use std::path::Path;

use chrono::{DateTime, Utc};
use git2::{
    Commit, Cred, Error as GitError, FetchOptions, IndexAddOption, PushOptions,
    RemoteCallbacks, Repository, Signature, StatusOptions,
};
use serde::Serialize;

/// Git operation errors
#[derive(Debug, thiserror::Error)]
pub enum GitOperationError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),
    #[error("Repository not initialized")]
    NotInitialized,
    #[error("Remote not configured")]
    NoRemote,
    #[error("Merge conflict detected")]
    MergeConflict,
}

pub type Result<T> = std::result::Result<T, GitOperationError>;

/// Repository status for a workspace root
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitStatus {
    pub is_repo: bool,
    /// Uncommitted changes, untracked files included.
    pub changes: usize,
}

/// Information about a commit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub id: String,
    pub short_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Check if a directory is a Git repository
pub fn is_git_repo(path: &Path) -> bool {
    Repository::open(path).is_ok()
}

/// Initialize a repository in the workspace, with an ignore file covering
/// editor droppings and the local card index.
pub fn init_repo(path: &Path) -> Result<()> {
    Repository::init(path)?;
    let gitignore = path.join(".gitignore");
    if !gitignore.exists() {
        let _ = std::fs::write(&gitignore, "*.swp\n*~\n.karuta/\n");
    }
    log::info!("Initialized Git repository at {:?}", path);
    Ok(())
}

fn open_repo(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| {
        if e.code() == git2::ErrorCode::NotFound {
            GitOperationError::NotInitialized
        } else {
            GitOperationError::Git(e)
        }
    })
}

/// Get the status of the workspace repository. Never fails on a plain
/// directory; that is simply "not a repo".
pub fn status(path: &Path) -> Result<GitStatus> {
    if !is_git_repo(path) {
        return Ok(GitStatus {
            is_repo: false,
            changes: 0,
        });
    }

    let repo = open_repo(path)?;
    let mut status_opts = StatusOptions::new();
    status_opts.include_untracked(true);
    let statuses = repo.statuses(Some(&mut status_opts))?;

    Ok(GitStatus {
        is_repo: true,
        changes: statuses.len(),
    })
}

/// Stage all changes and create a commit
pub fn commit_all(path: &Path, message: &str) -> Result<CommitInfo> {
    let repo = open_repo(path)?;

    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent_commit = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let sig = get_signature(&repo)?;

    let commit_id = if let Some(parent) = parent_commit {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?
    } else {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])?
    };

    let commit = repo.find_commit(commit_id)?;
    log::info!("Created commit: {} - {}", &commit_id.to_string()[..7], message);

    Ok(commit_to_info(&commit))
}

/// Timestamp of the most recent commit, if any
pub fn last_commit_time(path: &Path) -> Result<Option<DateTime<Utc>>> {
    if !is_git_repo(path) {
        return Ok(None);
    }
    let repo = open_repo(path)?;
    let commit = match repo.head().ok().and_then(|h| h.peel_to_commit().ok()) {
        Some(commit) => commit,
        None => return Ok(None),
    };
    Ok(Some(commit_to_info(&commit).timestamp))
}

/// Push the current branch to origin
pub fn push(path: &Path, credentials: Option<(&str, &str)>) -> Result<()> {
    let repo = open_repo(path)?;
    let mut remote = repo
        .find_remote("origin")
        .map_err(|_| GitOperationError::NoRemote)?;

    let head = repo.head()?;
    let branch_name = head.shorthand().unwrap_or("main");
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch_name, branch_name);

    let mut push_opts = PushOptions::new();
    push_opts.remote_callbacks(make_callbacks(credentials));

    remote.push(&[&refspec], Some(&mut push_opts))?;
    log::info!("Pushed to remote");
    Ok(())
}

/// Pull from origin: fetch, then fast-forward or merge. A conflicting
/// merge is aborted and surfaced as `MergeConflict`.
pub fn pull(path: &Path, credentials: Option<(&str, &str)>) -> Result<()> {
    fetch(path, credentials)?;

    let repo = open_repo(path)?;
    let head = repo.head()?;
    let branch_name = head.shorthand().unwrap_or("main").to_string();

    let remote_ref = format!("refs/remotes/origin/{}", branch_name);
    let remote_branch = repo.find_reference(&remote_ref)?;
    let remote_commit = remote_branch.peel_to_commit()?;
    let local_commit = head.peel_to_commit()?;

    let (_, behind) = repo.graph_ahead_behind(local_commit.id(), remote_commit.id())?;
    if behind == 0 {
        log::info!("Already up to date");
        return Ok(());
    }

    let annotated_commit = repo.find_annotated_commit(remote_commit.id())?;
    let (analysis, _) = repo.merge_analysis(&[&annotated_commit])?;

    if analysis.is_fast_forward() {
        let mut reference = repo.find_reference("HEAD")?;
        reference.set_target(remote_commit.id(), "Fast-forward pull")?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;
        log::info!("Fast-forward merge completed");
    } else if analysis.is_normal() {
        repo.merge(&[&annotated_commit], None, None)?;

        let mut index = repo.index()?;
        if index.has_conflicts() {
            repo.cleanup_state()?;
            return Err(GitOperationError::MergeConflict);
        }

        let sig = get_signature(&repo)?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let message = format!("Merge remote-tracking branch 'origin/{}'", branch_name);
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &message,
            &tree,
            &[&local_commit, &remote_commit],
        )?;
        repo.cleanup_state()?;
        log::info!("Merge commit created");
    }

    Ok(())
}

fn fetch(path: &Path, credentials: Option<(&str, &str)>) -> Result<()> {
    let repo = open_repo(path)?;
    let mut remote = repo
        .find_remote("origin")
        .map_err(|_| GitOperationError::NoRemote)?;

    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(make_callbacks(credentials));

    remote.fetch(
        &["refs/heads/*:refs/remotes/origin/*"],
        Some(&mut fetch_opts),
        None,
    )?;
    log::info!("Fetched from remote");
    Ok(())
}

fn make_callbacks(credentials: Option<(&str, &str)>) -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    if let Some((username, password)) = credentials {
        let username = username.to_string();
        let password = password.to_string();
        callbacks.credentials(move |_url, _username_from_url, _allowed_types| {
            Cred::userpass_plaintext(&username, &password)
        });
    }
    callbacks
}

fn get_signature(repo: &Repository) -> Result<Signature<'static>> {
    if let Ok(sig) = repo.signature() {
        return Ok(Signature::now(
            sig.name().unwrap_or("Karuta User"),
            sig.email().unwrap_or("karuta@local"),
        )?);
    }
    Ok(Signature::now("Karuta User", "karuta@local")?)
}

fn commit_to_info(commit: &Commit) -> CommitInfo {
    let timestamp =
        DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_else(Utc::now);

    CommitInfo {
        id: commit.id().to_string(),
        short_id: commit.id().to_string()[..7].to_string(),
        message: commit.message().unwrap_or("").trim().to_string(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_path_buf();
        init_repo(&path).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_plain_directory_is_not_a_repo() {
        let temp_dir = TempDir::new().unwrap();
        let status = status(temp_dir.path()).unwrap();
        assert!(!status.is_repo);
        assert_eq!(status.changes, 0);
        assert_eq!(last_commit_time(temp_dir.path()).unwrap(), None);
    }

    #[test]
    fn test_init_and_status() {
        let (_temp, path) = create_test_repo();

        let status = status(&path).unwrap();
        assert!(status.is_repo);
        // The generated .gitignore counts as an untracked change.
        assert!(status.changes > 0);
    }

    #[test]
    fn test_commit_all_and_last_commit_time() {
        let (_temp, path) = create_test_repo();
        std::fs::write(path.join("card.md"), "front\n---\nback\n").unwrap();

        assert_eq!(last_commit_time(&path).unwrap(), None);

        let info = commit_all(&path, "Add card").unwrap();
        assert_eq!(info.message, "Add card");
        assert_eq!(info.short_id.len(), 7);

        let time = last_commit_time(&path).unwrap().unwrap();
        assert_eq!(time, info.timestamp);

        let status = status(&path).unwrap();
        assert_eq!(status.changes, 0);
    }

    #[test]
    fn test_push_without_remote() {
        let (_temp, path) = create_test_repo();
        commit_all(&path, "Initial").unwrap();

        assert!(matches!(
            push(&path, None),
            Err(GitOperationError::NoRemote)
        ));
    }
}
