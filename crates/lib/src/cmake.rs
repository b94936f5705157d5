//! Build-directory preparation, flag selection, and the cmake steps.
//!
//! Configuration flags start from a fixed base and grow by at most one
//! entry: Ubuntu releases shipping OpenSSL 3 (detected by the `libssl3`
//! package) need `-DWITH_OPENSSL3=TRUE` for ROOT's bundled builtins to pick
//! the right API. This is deliberately a single hardcoded condition, not a
//! feature-detection framework.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::exec::{self, ExecError};
use crate::paths::InstallLayout;

/// Flags passed to every cmake configure invocation.
pub const BASE_CMAKE_FLAGS: &[&str] = &["-DCMAKE_CXX_STANDARD=17"];

/// Package whose presence selects the OpenSSL 3 flag.
pub const OPENSSL3_MARKER: &str = "libssl3";

/// Errors from preparing directories or driving cmake.
#[derive(Debug, Error)]
pub enum CmakeError {
  /// Removing or creating the build/install directories failed.
  #[error("failed to prepare '{path}': {source}")]
  PrepareDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The configure step exited non-zero.
  #[error("cmake configure failed: {0}")]
  Configure(#[source] ExecError),

  /// The build/install step exited non-zero.
  #[error("cmake build failed: {0}")]
  Build(#[source] ExecError),
}

/// Ensure empty-or-reused build and install directories exist.
///
/// With `clean`, existing build/ and install/ trees are removed first
/// (absence is fine). Creation is idempotent either way.
pub fn prepare_build_dirs(layout: &InstallLayout, clean: bool) -> Result<(), CmakeError> {
  for dir in [layout.build(), layout.install()] {
    if clean && dir.is_dir() {
      info!(dir = %dir.display(), "clean: removing old directory");
      std::fs::remove_dir_all(&dir).map_err(|e| CmakeError::PrepareDir {
        path: dir.clone(),
        source: e,
      })?;
    }
    std::fs::create_dir_all(&dir).map_err(|e| CmakeError::PrepareDir { path: dir, source: e })?;
  }
  Ok(())
}

/// Base flags plus the OpenSSL 3 flag iff `libssl3` is installed.
///
/// Order is preserved; without the marker package the result equals the
/// base flags unchanged.
pub fn compute_cmake_flags(base: &[&str], installed: &BTreeSet<String>) -> Vec<String> {
  let mut flags: Vec<String> = base.iter().map(|f| f.to_string()).collect();
  if installed.contains(OPENSSL3_MARKER) {
    debug!("{} present, enabling OpenSSL 3 support", OPENSSL3_MARKER);
    flags.push("-DWITH_OPENSSL3=TRUE".to_string());
  }
  flags
}

/// Run the cmake configure step from inside the build directory.
///
/// The install prefix and source directory are given relative to the build
/// directory, matching the layout produced by [`prepare_build_dirs`].
pub async fn configure(layout: &InstallLayout, flags: &[String]) -> Result<(), CmakeError> {
  info!(?flags, "configuring build");
  let mut args = vec!["-DCMAKE_INSTALL_PREFIX=../install"];
  args.extend(flags.iter().map(String::as_str));
  args.push("../root");
  exec::run("cmake", &args, &layout.build())
    .await
    .map_err(CmakeError::Configure)
}

/// Run the build + install step with the given concurrency degree.
pub async fn build_install(layout: &InstallLayout, jobs: u32) -> Result<(), CmakeError> {
  info!(jobs, "building and installing");
  let jobs_arg = format!("-j{jobs}");
  exec::run(
    "cmake",
    &["--build", ".", "--target", "install", &jobs_arg],
    &layout.build(),
  )
  .await
  .map_err(CmakeError::Build)
}
