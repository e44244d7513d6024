//! # msextract CLI
//!
//! Command-line front end for the batch IM-MS extraction pipeline.
//!
//! ```bash
//! # Extract and combine every parameter set, sweeping intermediates after
//! msextract -v extract \
//!     --converter /opt/cdcreader/CDCReader.exe \
//!     --param-set-list param_sets.csv \
//!     --raw-file-list raw_files.txt \
//!     --clean-up
//!
//! # Sweep leftover intermediates from an earlier run
//! msextract clean --workdir .
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
