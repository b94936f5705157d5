//! End-to-end setup orchestration.
//!
//! `run_setup` drives the full pipeline:
//!
//! 1. Create the install directory
//! 2. Clone or update the ROOT checkout at the requested branch, then drop
//!    a local copy of the executable into the installation
//! 3. Prepare (optionally clean) the build and install directories
//! 4. Install whichever required apt packages are missing
//! 5. Re-query the package snapshot and compute the cmake flags
//! 6. cmake configure, then build + install
//!
//! Everything but the repository pull is fatal on failure; the dependency
//! step always completes before configure so a missing header fails here,
//! not half an hour into the compile.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::cmake::{self, BASE_CMAKE_FLAGS, CmakeError};
use crate::config::{self, BuildConfig};
use crate::deps::{self, DEPENDENCIES, DepsError};
use crate::paths::InstallLayout;
use crate::repo::{self, RepoError, SyncOutcome};

/// Result of a completed setup run.
#[derive(Debug)]
pub struct SetupReport {
  /// Layout of the installation that was produced.
  pub layout: InstallLayout,

  /// How the checkout was synchronized.
  pub sync: SyncOutcome,

  /// Packages that were missing and got installed (empty if none).
  pub installed_packages: Vec<String>,

  /// The cmake flags the build was configured with.
  pub cmake_flags: Vec<String>,

  /// Wall-clock time for the whole run.
  pub elapsed: Duration,
}

/// Errors that abort a setup run.
#[derive(Debug, Error)]
pub enum SetupError {
  /// The install directory could not be created.
  #[error("failed to create install directory '{path}': {source}")]
  CreateInstallDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Repository synchronization failed.
  #[error(transparent)]
  Repo(#[from] RepoError),

  /// Dependency query or installation failed.
  #[error(transparent)]
  Deps(#[from] DepsError),

  /// Directory preparation, configure or build failed.
  #[error(transparent)]
  Cmake(#[from] CmakeError),
}

impl SetupError {
  /// Process exit status for this failure.
  ///
  /// Mirrors the failing external tool's exit status where one exists; the
  /// explicit not-a-repository diagnostic and local IO failures exit 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      SetupError::Repo(RepoError::Git(e)) => e.exit_code(),
      SetupError::Deps(DepsError::Query(e) | DepsError::Install(e)) => e.exit_code(),
      SetupError::Cmake(CmakeError::Configure(e) | CmakeError::Build(e)) => e.exit_code(),
      _ => 1,
    }
  }
}

/// Run the full setup pipeline described in the module docs.
///
/// Strictly sequential; each step blocks on its external tool with no
/// timeout. Running two setups against the same install directory
/// concurrently is unsupported.
pub async fn run_setup(config: &BuildConfig) -> Result<SetupReport, SetupError> {
  let start = Instant::now();
  let layout = InstallLayout::new(&config.install_dir);

  info!(dir = %layout.base().display(), "using install directory");
  std::fs::create_dir_all(layout.base()).map_err(|e| SetupError::CreateInstallDir {
    path: layout.base().to_path_buf(),
    source: e,
  })?;

  let sync = repo::sync_repository(&layout, &config.branch).await?;

  // Best-effort: the installation carries its own copy of rootup. Runs only
  // once the checkout passed the repository check, so an aborted run does
  // not mark the directory as an installation.
  if let Err(e) = config::install_local_copy(layout.base()) {
    warn!(error = %e, "could not copy rootup into the installation");
  }

  info!("preparing build");
  cmake::prepare_build_dirs(&layout, config.clean)?;

  info!("checking dependencies");
  let installed = deps::query_installed(layout.base()).await?;
  let missing = deps::missing_packages(DEPENDENCIES, &installed);
  if !missing.is_empty() {
    deps::install_packages(&missing, layout.base()).await?;
  }

  // Fresh snapshot: the install above may have pulled in the marker package.
  let installed = deps::query_installed(layout.base()).await?;
  let cmake_flags = cmake::compute_cmake_flags(BASE_CMAKE_FLAGS, &installed);

  info!("compiling (may take a while)");
  cmake::configure(&layout, &cmake_flags).await?;
  cmake::build_install(&layout, config.jobs).await?;

  Ok(SetupReport {
    layout,
    sync,
    installed_packages: missing.iter().map(|s| s.to_string()).collect(),
    cmake_flags,
    elapsed: start.elapsed(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exec::ExecError;

  #[test]
  fn exit_code_mirrors_failing_tool() {
    let err = SetupError::Cmake(CmakeError::Build(ExecError::Failed {
      program: "cmake".to_string(),
      code: Some(2),
    }));
    assert_eq!(err.exit_code(), 2);
  }

  #[test]
  fn exit_code_for_non_repository_is_one() {
    let err = SetupError::Repo(RepoError::NotARepository(PathBuf::from("/x/root")));
    assert_eq!(err.exit_code(), 1);
  }

  #[test]
  fn exit_code_for_signal_death_is_one() {
    let err = SetupError::Deps(DepsError::Install(ExecError::Failed {
      program: "sudo".to_string(),
      code: None,
    }));
    assert_eq!(err.exit_code(), 1);
  }

  #[tokio::test]
  async fn aborts_before_dependency_steps_on_non_repository() {
    // A poisoned checkout must stop the run at the sync step; nothing after
    // it (no build dirs, no local copy, no installation marker) may be
    // touched.
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("root")).unwrap();

    let config = BuildConfig {
      install_dir: temp.path().to_path_buf(),
      branch: "latest-stable".to_string(),
      jobs: 1,
      clean: false,
    };

    let err = run_setup(&config).await.unwrap_err();
    assert!(matches!(err, SetupError::Repo(RepoError::NotARepository(_))));
    assert!(!temp.path().join("build").exists());
    assert!(!temp.path().join("install").exists());
    assert!(!temp.path().join(config::LOCAL_BINARY).exists());
    assert!(!temp.path().join(config::LOCAL_MARKER).exists());
  }
}
