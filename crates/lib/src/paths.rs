//! Install-directory layout bookkeeping.
//!
//! Every run operates on one installation directory containing three
//! subdirectories owned by the external tools:
//!
//! - `root/` - the git checkout of the ROOT sources
//! - `build/` - out-of-tree cmake build artifacts
//! - `install/` - the final installed tree, including the activation script

use std::path::{Path, PathBuf};

/// Name of the checkout subdirectory (matches the upstream repository name).
pub const CHECKOUT_DIR: &str = "root";

/// Name of the out-of-tree build subdirectory.
pub const BUILD_DIR: &str = "build";

/// Name of the install-prefix subdirectory.
pub const INSTALL_DIR: &str = "install";

/// Paths within one installation directory.
#[derive(Debug, Clone)]
pub struct InstallLayout {
  base: PathBuf,
}

impl InstallLayout {
  pub fn new(base: impl Into<PathBuf>) -> Self {
    Self { base: base.into() }
  }

  /// The installation directory itself.
  pub fn base(&self) -> &Path {
    &self.base
  }

  /// The git checkout of the ROOT sources (`<base>/root`).
  pub fn checkout(&self) -> PathBuf {
    self.base.join(CHECKOUT_DIR)
  }

  /// The out-of-tree build directory (`<base>/build`).
  pub fn build(&self) -> PathBuf {
    self.base.join(BUILD_DIR)
  }

  /// The install prefix (`<base>/install`).
  pub fn install(&self) -> PathBuf {
    self.base.join(INSTALL_DIR)
  }

  /// The environment-activation script the user is told to source.
  pub fn activation_script(&self) -> PathBuf {
    self.install().join("bin").join("thisroot.sh")
  }
}

/// Returns the user's home directory.
pub fn home_dir() -> PathBuf {
  let home = std::env::var("HOME").expect("HOME not set");
  PathBuf::from(home)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn layout_subdirectories() {
    let layout = InstallLayout::new("/opt/cern");
    assert_eq!(layout.checkout(), PathBuf::from("/opt/cern/root"));
    assert_eq!(layout.build(), PathBuf::from("/opt/cern/build"));
    assert_eq!(layout.install(), PathBuf::from("/opt/cern/install"));
  }

  #[test]
  fn activation_script_lives_under_install_bin() {
    let layout = InstallLayout::new("/opt/cern");
    assert_eq!(
      layout.activation_script(),
      PathBuf::from("/opt/cern/install/bin/thisroot.sh")
    );
  }

  #[test]
  #[serial]
  fn home_dir_reads_env() {
    temp_env::with_var("HOME", Some("/home/user"), || {
      assert_eq!(home_dir(), PathBuf::from("/home/user"));
    });
  }
}
