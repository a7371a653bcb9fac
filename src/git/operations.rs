//! Clone and naming helpers for bot repositories

use crate::Result;
use std::path::Path;
use tracing::info;

/// Clone a repository into `dest`
///
/// Refuses to clone over an existing path; `branch` checks out a
/// non-default branch when given. Clones use default credentials, so
/// bot repositories are expected to be publicly readable or local.
pub fn clone_repository(url: &str, dest: &Path, branch: Option<&str>) -> Result<git2::Repository> {
    if dest.exists() {
        return Err(crate::BotyardError::Git(format!(
            "Target directory already exists: {}",
            dest.display()
        )));
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!(url, path = %dest.display(), "Cloning bot repository");

    let mut builder = git2::build::RepoBuilder::new();
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    let repo = builder.clone(url, dest)?;

    info!(path = %dest.display(), "Repository cloned successfully");
    Ok(repo)
}

/// Derive a default bot name from a repository URL stem
///
/// `https://host/org/echo-bot.git` becomes `echo-bot`. Returns None when
/// the URL has no usable final segment.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let stem = trimmed.rsplit('/').next()?;
    let stem = stem.strip_suffix(".git").unwrap_or(stem);

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
