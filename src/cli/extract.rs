use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use msextract::convert::CdcReader;
use msextract::pipeline::{self, RunOptions};

use super::config::Config;

/// Convert and combine every parameter set over every raw acquisition
pub fn run(
    converter: PathBuf,
    param_set_list: PathBuf,
    raw_file_list: PathBuf,
    workdir: PathBuf,
    config: Option<PathBuf>,
    clean_up: bool,
) -> Result<()> {
    if !converter.exists() {
        anyhow::bail!("Converter executable does not exist: {}", converter.display());
    }
    if !workdir.is_dir() {
        anyhow::bail!("Working directory does not exist: {}", workdir.display());
    }

    let config = Config::load(config.as_deref())?;

    info!("msextract - batch IM-MS signal extraction");
    info!("==========================================");
    info!("Converter:      {}", converter.display());
    info!("Parameter sets: {}", param_set_list.display());
    info!("Acquisitions:   {}", raw_file_list.display());
    info!("Workdir:        {}", workdir.display());
    info!(
        "Calibration:    {} line {} ({:?})",
        config.calibration.file, config.calibration.line, config.calibration.marker
    );
    if clean_up {
        info!("Cleanup:        after successful run");
    }

    let mut options = RunOptions::new(param_set_list, raw_file_list, workdir);
    options.calibration = config.calibration;
    options.aux_im_file = config.converter.aux_im_file.clone();
    options.clean_up = clean_up;

    let cdc_reader = CdcReader::new(converter).with_settings(config.converter);

    let summary = pipeline::run(&options, &cdc_reader).context("Extraction run failed")?;

    info!("Run complete!");
    info!("  Parameter sets processed: {}", summary.param_sets);
    info!("  Converter invocations:    {}", summary.conversions);
    info!("  Combined datasets:        {}", summary.datasets_written.len());
    for path in &summary.datasets_written {
        info!("    {}", path.display());
    }
    if clean_up {
        info!("  Intermediate files removed: {}", summary.files_cleaned);
    }

    Ok(())
}
