//! delta-geometry CLI
//!
//! Usage:
//!   delta-geometry <input>
//!
//! Prints the chunk map and conflicts listing of every record in `<input>`.
//! Set RUST_LOG=debug for per-record statistics on stderr.

use std::ffi::OsString;
use std::io::{self, BufWriter};

use delta_geometry::GeometryConfig;

fn main() {
    env_logger::init();

    let args: Vec<OsString> = std::env::args_os().collect();
    if args.len() != 2 {
        let prog = args
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_else(|| "delta-geometry".to_string());
        println!("Usage: {} <input>", prog);
        std::process::exit(0);
    }

    let config = GeometryConfig::default();
    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());

    match delta_geometry::run(&args[1], out, &config) {
        Ok(summary) => {
            log::info!(
                "{} records, {} skipped, {} conflicting chunks",
                summary.records,
                summary.skipped,
                summary.conflicts
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
