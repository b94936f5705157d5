//! Cloning and updating the ROOT source checkout.
//!
//! The checkout lives at `<install-dir>/root`. If it already exists it must
//! be a git repository; anything else at that path is a user error we refuse
//! to touch. Updates are best-effort: a failed `git pull` (unreachable
//! remote, or `-b` naming an immutable tag) downgrades to a warning and the
//! build proceeds with whatever the checkout contains.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::exec::{self, ExecError};
use crate::paths::InstallLayout;

/// Upstream repository URL.
pub const ROOT_GIT_URL: &str = "https://github.com/root-project/root.git";

/// How the checkout was brought up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
  /// No previous checkout existed; a fresh clone was made.
  Cloned,
  /// An existing checkout was fetched, switched to the branch and pulled.
  Updated,
  /// An existing checkout was switched to the branch, but the pull failed;
  /// the build proceeds with the checkout as-is.
  StaleCheckout {
    /// The pull failure, kept so callers can report or assert on it.
    reason: String,
  },
}

/// Errors from repository synchronization.
#[derive(Debug, Error)]
pub enum RepoError {
  /// Something exists at the checkout path that is not a git repository.
  #[error("found '{0}' but it is not a git repository")]
  NotARepository(PathBuf),

  /// A git invocation other than `git pull` failed.
  #[error(transparent)]
  Git(#[from] ExecError),
}

/// Bring the checkout at `<install-dir>/root` up to date on `branch`.
///
/// Clones if no checkout exists. For an existing checkout: `git fetch`,
/// `git checkout <branch>`, then `git pull`; only the pull is recoverable.
///
/// # Errors
///
/// [`RepoError::NotARepository`] if the checkout path exists without git
/// metadata; this is the one fatal condition rootup diagnoses itself rather
/// than propagating from a tool.
pub async fn sync_repository(layout: &InstallLayout, branch: &str) -> Result<SyncOutcome, RepoError> {
  let checkout = layout.checkout();

  if !checkout.is_dir() {
    info!(url = ROOT_GIT_URL, branch, "no previous checkout, cloning");
    exec::run("git", &["clone", "--branch", branch, ROOT_GIT_URL], layout.base()).await?;
    return Ok(SyncOutcome::Cloned);
  }

  if !checkout.join(".git").is_dir() {
    return Err(RepoError::NotARepository(checkout));
  }

  info!(branch, checkout = %checkout.display(), "updating existing checkout");
  exec::run("git", &["fetch"], &checkout).await?;
  exec::run("git", &["checkout", branch], &checkout).await?;

  match exec::run("git", &["pull"], &checkout).await {
    Ok(()) => Ok(SyncOutcome::Updated),
    Err(e) => {
      warn!(error = %e, "git pull failed, building the checkout as-is");
      Ok(SyncOutcome::StaleCheckout { reason: e.to_string() })
    }
  }
}
