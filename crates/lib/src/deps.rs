//! OS package dependency handling.
//!
//! The packages ROOT needs to compile on Ubuntu-like systems are a fixed
//! list. We snapshot what apt reports as installed, compute the missing
//! subset, and install exactly that subset with one privileged apt call.
//! The snapshot is re-queried whenever it is needed, never cached across
//! steps, so the flag-selection step sees the post-install state.
//!
//! Parsing of the apt listing is a pure function so it can be tested
//! without a package manager on the machine.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::exec::{self, ExecError};

/// Packages required to build ROOT, in install order.
///
/// TODO: if a package is renamed in a future Ubuntu release, key this list
/// off the distribution release instead of keeping a single flat list.
pub const DEPENDENCIES: &[&str] = &[
  "dpkg-dev",
  "cmake",
  "g++",
  "gcc",
  "binutils",
  "libx11-dev",
  "libxpm-dev",
  "libxft-dev",
  "libxext-dev",
  "python3",
  "libssl-dev",
  "gfortran",
  "libpcre3-dev",
  "libglu1-mesa-dev",
  "libglew-dev",
  "libftgl-dev",
  "libmysqlclient-dev",
  "libfftw3-dev",
  "libcfitsio-dev",
  "libgraphviz-dev",
  "libavahi-compat-libdnssd-dev",
  "libldap2-dev",
  "python3-dev",
  "libxml2-dev",
  "libkrb5-dev",
  "libgsl-dev",
];

/// Errors from querying or installing packages.
#[derive(Debug, Error)]
pub enum DepsError {
  /// `apt list --installed` could not be run or exited non-zero.
  #[error("failed to query installed packages: {0}")]
  Query(#[source] ExecError),

  /// The privileged install of missing packages failed.
  #[error("failed to install missing packages: {0}")]
  Install(#[source] ExecError),
}

/// Parse the output of `apt list --installed` into a set of package names.
///
/// Each listed package appears on its own line as `name/suite,... version`;
/// the name is everything before the first `/`. Lines without a `/` (the
/// `Listing...` header, blanks) are skipped.
pub fn parse_installed(raw: &str) -> BTreeSet<String> {
  raw
    .lines()
    .filter_map(|line| line.split_once('/'))
    .map(|(name, _)| name.to_string())
    .collect()
}

/// Query apt for the currently installed package set.
pub async fn query_installed(cwd: &Path) -> Result<BTreeSet<String>, DepsError> {
  let raw = exec::run_capture("apt", &["list", "--installed"], cwd)
    .await
    .map_err(DepsError::Query)?;
  let installed = parse_installed(&raw);
  debug!(count = installed.len(), "installed packages queried");
  Ok(installed)
}

/// The required packages absent from `installed`, preserving `required`'s
/// order and containing nothing else.
pub fn missing_packages<'a>(required: &[&'a str], installed: &BTreeSet<String>) -> Vec<&'a str> {
  required
    .iter()
    .copied()
    .filter(|pkg| !installed.contains(*pkg))
    .collect()
}

/// Install the given packages via `sudo apt -y install`.
///
/// Callers must skip this entirely when `missing` is empty; a failure here
/// is fatal to the run. If apt fails partway through, its own state decides
/// which packages made it; we make no attempt to repair that.
pub async fn install_packages(missing: &[&str], cwd: &Path) -> Result<(), DepsError> {
  info!(packages = ?missing, "installing missing dependencies");
  warn!("you may want to run an apt update/full-upgrade first");
  let mut args = vec!["apt", "-y", "install"];
  args.extend_from_slice(missing);
  exec::run("sudo", &args, cwd).await.map_err(DepsError::Install)
}

#[cfg(test)]
mod tests {
  use super::*;

  const APT_LISTING: &str = "\
Listing...
adduser/noble,now 3.137ubuntu1 all [installed,automatic]
cmake/noble,now 3.28.3-1build7 amd64 [installed]
g++/noble,now 4:13.2.0-7ubuntu1 amd64 [installed]
libssl3/noble-updates,now 3.0.13-0ubuntu3.4 amd64 [installed]
";

  #[test]
  fn parse_skips_header_and_extracts_names() {
    let installed = parse_installed(APT_LISTING);
    assert_eq!(installed.len(), 4);
    assert!(installed.contains("adduser"));
    assert!(installed.contains("cmake"));
    assert!(installed.contains("g++"));
    assert!(installed.contains("libssl3"));
    assert!(!installed.contains("Listing..."));
  }

  #[test]
  fn parse_empty_output() {
    assert!(parse_installed("").is_empty());
    assert!(parse_installed("Listing...\n").is_empty());
  }

  #[test]
  fn missing_preserves_required_order() {
    let installed: BTreeSet<String> = ["a".to_string()].into();
    let missing = missing_packages(&["a", "b", "c"], &installed);
    assert_eq!(missing, vec!["b", "c"]);
  }

  #[test]
  fn missing_is_empty_for_superset_snapshot() {
    let installed: BTreeSet<String> =
      ["a", "b", "c", "extra"].iter().map(|s| s.to_string()).collect();
    let missing = missing_packages(&["a", "b", "c"], &installed);
    assert!(missing.is_empty());
  }

  #[test]
  fn missing_never_contains_extras() {
    let installed = BTreeSet::new();
    let missing = missing_packages(&["a", "b"], &installed);
    assert_eq!(missing, vec!["a", "b"]);
  }

  #[tokio::test]
  #[tracing_test::traced_test]
  async fn install_emits_update_hint_before_invoking_apt() {
    let temp = tempfile::TempDir::new().unwrap();

    // The hint precedes the privileged invocation, so it is emitted even
    // when the install itself cannot succeed here.
    let _ = install_packages(&["rootup-test-nonexistent-pkg"], temp.path()).await;

    assert!(logs_contain("update/full-upgrade"));
  }

  #[test]
  fn dependency_list_is_deduplicated() {
    let unique: BTreeSet<&str> = DEPENDENCIES.iter().copied().collect();
    assert_eq!(unique.len(), DEPENDENCIES.len());
  }
}
