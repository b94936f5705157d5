//! rootup - clone, configure and build ROOT from source on Ubuntu-like
//! systems.
//!
//! One linear pipeline, no subcommands: resolve the install directory, sync
//! the checkout, install missing apt dependencies, then drive cmake. See
//! `rootup-lib` for the pipeline itself; this binary only parses flags,
//! initializes logging and renders the outcome.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rootup_lib::config::{self, BuildConfig, default_jobs};
use rootup_lib::{SetupReport, SyncOutcome, run_setup};

use crate::output::{format_duration, print_error, print_info, print_stat, print_success, print_warning};

/// Build the ROOT scientific framework from source.
#[derive(Parser)]
#[command(name = "rootup", version, about, long_about = None)]
struct Cli {
  /// Installation directory (default: $HOME/root, or this executable's
  /// directory when an installation is already present there)
  #[arg(short = 'd', long, value_name = "DIR")]
  install_dir: Option<PathBuf>,

  /// Branch of the ROOT git repository to build
  #[arg(short, long, default_value = "latest-stable")]
  branch: String,

  /// Number of concurrent build jobs (default: available cores, capped at 8)
  #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
  jobs: Option<u32>,

  /// Remove old build and install directories before building
  #[arg(long)]
  clean: bool,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // Phase narration comes from the library's info-level logs; RUST_LOG
  // still overrides everything.
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .init();

  let config = BuildConfig {
    install_dir: config::resolve_install_dir(cli.install_dir),
    branch: cli.branch,
    jobs: cli.jobs.unwrap_or_else(default_jobs),
    clean: cli.clean,
  };

  print_info(&format!(
    "Setting up ROOT ({}) in {}",
    config.branch,
    config.install_dir.display()
  ));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  match rt.block_on(run_setup(&config)) {
    Ok(report) => {
      print_report(&report);
      Ok(())
    }
    Err(e) => {
      print_error(&format!("{e}"));
      std::process::exit(e.exit_code());
    }
  }
}

fn print_report(report: &SetupReport) {
  println!();
  print_success("Setup complete!");

  let sync = match &report.sync {
    SyncOutcome::Cloned => "fresh clone".to_string(),
    SyncOutcome::Updated => "existing checkout updated".to_string(),
    SyncOutcome::StaleCheckout { .. } => "existing checkout (pull failed)".to_string(),
  };
  print_stat("Checkout", &sync);

  if report.installed_packages.is_empty() {
    print_stat("Packages installed", "none (all dependencies present)");
  } else {
    print_stat("Packages installed", &report.installed_packages.join(" "));
  }
  print_stat("Cmake flags", &report.cmake_flags.join(" "));
  print_stat("Elapsed", &format_duration(report.elapsed));

  if let SyncOutcome::StaleCheckout { reason } = &report.sync {
    println!();
    print_warning(&format!("Could not git-pull: {reason}"));
    print_warning("This may happen if the remote is unreachable or if -b names a tag.");
    print_warning("The build used the checkout as it was.");
  }

  println!();
  println!("Done, remember to add a line like this to your .bashrc/.zshrc:");
  println!(
    "  alias sroot='source {}'",
    report.layout.activation_script().display()
  );
}
