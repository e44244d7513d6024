//! Post-run removal of intermediate artifacts.
//!
//! Intermediate MS artifacts and the shared drift-time output are only
//! removed after every combined dataset of the run has been written, so an
//! aborted run leaves them behind for inspection. Matching is by the full
//! artifact-name pattern anchored at the end of the file name; files that
//! merely contain similar digit groups are never touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::naming;

/// Remove intermediate artifacts from the working directory.
///
/// Deletes every directory entry whose name matches the deterministic
/// `*_{int}-{int}_{int}-{int}_{int}-{int}_MS.txt` artifact shape, plus the
/// shared auxiliary drift-time output `aux_im_file` if present. Destructive
/// and irreversible; callers invoke this only after a fully successful run.
///
/// Returns the paths that were removed.
pub fn clean_workspace(workdir: &Path, aux_im_file: &str) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for entry in fs::read_dir(workdir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if naming::is_artifact_name(name) || name == aux_im_file {
            let path = entry.path();
            debug!("Removing {}", path.display());
            fs::remove_file(&path)?;
            removed.push(path);
        }
    }

    info!("Removed {} intermediate files", removed.len());
    Ok(removed)
}
