use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use msextract::cleanup::clean_workspace;

use super::config::Config;

/// Remove leftover intermediate artifacts from a working directory
pub fn run(workdir: PathBuf, config: Option<PathBuf>) -> Result<()> {
    if !workdir.is_dir() {
        anyhow::bail!("Working directory does not exist: {}", workdir.display());
    }

    let config = Config::load(config.as_deref())?;

    let removed = clean_workspace(&workdir, &config.converter.aux_im_file)
        .context("Workspace cleanup failed")?;

    info!("Removed {} file(s) from {}", removed.len(), workdir.display());
    for path in &removed {
        info!("  {}", path.display());
    }

    Ok(())
}
