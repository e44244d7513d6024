use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod clean;
mod config;
mod extract;

/// msextract - Batch IM-MS Signal Extraction
#[derive(Parser)]
#[command(name = "msextract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert and combine every parameter set over every raw acquisition
    Extract {
        /// Path to the external converter executable (CDCReader)
        #[arg(long, value_name = "EXE")]
        converter: PathBuf,

        /// Comma-delimited parameter-set list
        /// (pep_mz, charge, mz_min, mz_max, rt_min, rt_max, dt_min, dt_max)
        #[arg(short = 'p', long, value_name = "FILE")]
        param_set_list: PathBuf,

        /// Plain-text list of raw acquisition identifiers, one per line
        #[arg(short = 'r', long, value_name = "FILE")]
        raw_file_list: PathBuf,

        /// Working directory for intermediate artifacts and combined output
        #[arg(short = 'w', long, value_name = "DIR", default_value = ".")]
        workdir: PathBuf,

        /// Load calibration/converter settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Remove intermediate artifacts after a fully successful run
        #[arg(short = 'c', long)]
        clean_up: bool,
    },

    /// Remove leftover intermediate artifacts from a working directory
    Clean {
        /// Working directory to sweep
        #[arg(short = 'w', long, value_name = "DIR", default_value = ".")]
        workdir: PathBuf,

        /// Load converter settings (auxiliary output name) from a TOML file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            converter,
            param_set_list,
            raw_file_list,
            workdir,
            config,
            clean_up,
        } => extract::run(
            converter,
            param_set_list,
            raw_file_list,
            workdir,
            config,
            clean_up,
        ),
        Commands::Clean { workdir, config } => clean::run(workdir, config),
    }
}
