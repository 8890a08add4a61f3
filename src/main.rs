//! The rust-dist-sync command line application
//!
//! Fetches the nightly, stable and beta channel manifests from a Rust
//! distribution server and writes them out as JSON, along with the list of
//! cross-compilation targets in the README.

use clap::Parser;
use tracing_subscriber::util::SubscriberInitExt;

use rust_dist_sync::cli::common;
use rust_dist_sync::cli::log;
use rust_dist_sync::cli::sync_mode::{self, Cli};
use rust_dist_sync::process::Process;

fn main() {
    let process = Process::os();
    let cli = Cli::parse();
    let _tracing_guard = log::tracing_subscriber(&process, cli.verbose).set_default();

    if let Err(ref e) = sync_mode::main(&process, &cli) {
        common::report_error(e);
        std::process::exit(1);
    }
}
