//! rootup-lib: pipeline logic for building ROOT from source.
//!
//! The crate is organized as one module per pipeline concern:
//! - `config`: immutable run configuration resolved from CLI input
//! - `paths`: install-directory layout bookkeeping
//! - `exec`: external-process invocation
//! - `repo`: cloning/updating the ROOT checkout
//! - `deps`: apt dependency querying and installation
//! - `cmake`: build-directory preparation, flag selection, configure + build
//! - `setup`: the end-to-end pipeline tying the above together

pub mod cmake;
pub mod config;
pub mod deps;
pub mod exec;
pub mod paths;
pub mod repo;
pub mod setup;

pub use config::BuildConfig;
pub use paths::InstallLayout;
pub use repo::SyncOutcome;
pub use setup::{SetupError, SetupReport, run_setup};
