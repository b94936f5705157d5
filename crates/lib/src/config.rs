//! Run configuration.
//!
//! A `BuildConfig` is assembled once from CLI input and stays immutable for
//! the whole run; the pipeline takes it by reference and carries no other
//! global state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::paths::home_dir;

/// Marker file identifying a directory as a rootup-managed installation.
///
/// When it sits beside the running executable, that directory becomes the
/// default install directory, so a copy of rootup dropped into an
/// installation keeps managing it without `-d`.
pub const LOCAL_MARKER: &str = ".rootup";

/// Name under which the executable is copied into the installation.
pub const LOCAL_BINARY: &str = "rootup";

/// Upper bound on the default build concurrency.
pub const MAX_DEFAULT_JOBS: u32 = 8;

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// Installation directory holding the checkout, build and install trees.
  pub install_dir: PathBuf,
  /// Git branch (or tag) of the ROOT repository to build.
  pub branch: String,
  /// Concurrency degree handed to the build tool.
  pub jobs: u32,
  /// Remove old build and install directories before building.
  pub clean: bool,
}

/// Default build concurrency: the number of available cores, capped at 8.
///
/// ROOT links some very large binaries; more than 8 parallel jobs mostly
/// trades link-step memory for no wall-clock gain on typical machines.
pub fn default_jobs() -> u32 {
  let cores = std::thread::available_parallelism().map_or(1, |n| n.get() as u32);
  cores.min(MAX_DEFAULT_JOBS)
}

/// Resolve the install directory from an optional explicit path.
///
/// An explicit `-d` wins. Otherwise, if the running executable sits inside
/// an existing installation (identified by the [`LOCAL_MARKER`] file), that
/// directory is reused; otherwise the default is `$HOME/root`.
pub fn resolve_install_dir(explicit: Option<PathBuf>) -> PathBuf {
  if let Some(dir) = explicit {
    return dir;
  }
  let exe_dir = std::env::current_exe()
    .ok()
    .and_then(|p| p.parent().map(Path::to_path_buf));
  default_install_dir(exe_dir.as_deref())
}

/// Default-resolution rule, split out from [`resolve_install_dir`] so it can
/// be exercised without touching the real executable path.
pub fn default_install_dir(exe_dir: Option<&Path>) -> PathBuf {
  if let Some(dir) = exe_dir {
    if dir.join(LOCAL_MARKER).is_file() {
      debug!(dir = %dir.display(), "local installation marker found");
      return dir.to_path_buf();
    }
  }
  home_dir().join("root")
}

/// Copy the running executable into the installation and drop the marker
/// file, so the installation carries its own copy of rootup.
///
/// Skipped when the running executable already is the installed copy.
/// Callers treat failure as a warning, not a fatal error: the copy is a
/// convenience, not a build prerequisite.
pub fn install_local_copy(install_dir: &Path) -> io::Result<()> {
  let exe = std::env::current_exe()?.canonicalize()?;
  let dest = install_dir.join(LOCAL_BINARY);

  let already_local = dest.exists() && dest.canonicalize().map(|d| d == exe).unwrap_or(false);
  if !already_local {
    debug!(from = %exe.display(), to = %dest.display(), "copying executable into installation");
    fs::copy(&exe, &dest)?;
  }

  let marker = install_dir.join(LOCAL_MARKER);
  if !marker.exists() {
    fs::write(&marker, "")?;
  }
  Ok(())
}
