/*!
 * Memory Space - Main Entry Point
 *
 * Runs a command script against a simulated memory space:
 * - `memspace <script>` reads commands from a file
 * - `memspace` or `memspace -` reads commands from stdin
 *
 * The address space size and pressure thresholds come from the
 * `MEMSPACE_*` environment variables.
 */

use anyhow::Context;
use std::io;
use tracing::{info, warn};

use memory_space::{init_tracing, MemoryConfig, MemorySpace, Shell};

fn main() -> anyhow::Result<()> {
    // Initialize structured tracing
    init_tracing();

    let config = MemoryConfig::from_env();
    info!(
        max_size = config.max_size,
        warning_threshold = config.warning_threshold,
        critical_threshold = config.critical_threshold,
        "Memory space starting"
    );

    let mut shell = Shell::new(MemorySpace::with_config(config));
    let stdout = io::stdout();

    let summary = match std::env::args().nth(1) {
        Some(path) if path != "-" => shell
            .run_file(&path, stdout.lock())
            .with_context(|| format!("failed to run script '{}'", path))?,
        _ => shell
            .run_script(io::stdin().lock(), stdout.lock())
            .context("failed to run script from stdin")?,
    };

    if summary.failed > 0 {
        warn!(
            failed = summary.failed,
            executed = summary.executed,
            "Some commands failed"
        );
    }

    Ok(())
}
