//! Deterministic artifact and output naming.
//!
//! Intermediate artifacts and combined datasets are named purely from the
//! parameter set (and, for intermediates, the source acquisition), so that
//! repeated runs regenerate identical names and the workspace cleaner can
//! re-identify its own files. The exact byte layout of the window string is
//! load-bearing for backward-compatible file discovery: six truncated
//! integers, paired `min-max` and joined with underscores.

use std::sync::LazyLock;

use regex::Regex;

use crate::params::ParameterSet;

/// Matches the six-integer window string plus `MS.txt` suffix at the end of
/// an intermediate artifact name.
static ARTIFACT_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_(\d+)-(\d+)_(\d+)-(\d+)_(\d+)-(\d+)_MS\.txt$").expect("artifact pattern")
});

/// Collapse a parameter set's six window bounds into the canonical window
/// string: `"{mzmin}-{mzmax}_{rtmin}-{rtmax}_{dtmin}-{dtmax}_"`.
///
/// Bounds are truncated to integers (fractional part discarded, not
/// rounded). Within the six-value sequence, values at even positions are
/// followed by `-` and values at odd positions by `_`, producing the
/// `min-max_` pairing.
pub fn param_str(params: &ParameterSet) -> String {
    let mut out = String::new();
    for (i, bound) in params.window_bounds().iter().enumerate() {
        out.push_str(&(bound.trunc() as i64).to_string());
        out.push(if i % 2 == 0 { '-' } else { '_' });
    }
    out
}

/// Systematic name for the converter's MS output for one
/// (parameter set, acquisition) pair:
/// `"{acquisition-stem}_{window string}MS.txt"`.
///
/// Only the final path component of the acquisition identifier is used
/// (artifacts always land in the working directory), with exactly one
/// trailing file extension stripped. A lone leading dot does not count as
/// an extension (`.hidden.raw` becomes `.hidden`, `.hidden` stays as is).
pub fn ms_name(params: &ParameterSet, raw_id: &str) -> String {
    format!("{}_{}MS.txt", strip_raw_extension(raw_id), param_str(params))
}

/// Systematic name for the combined output of one parameter set:
/// `"{pep_mz}_{charge}.csv"` with any decimal point in `pep_mz` replaced
/// by `p` (e.g. `123.456` names `123p456_2.csv`).
pub fn csv_name(params: &ParameterSet) -> String {
    let pep = params.pep_mz.to_string().replace('.', "p");
    format!("{}_{}.csv", pep, params.charge)
}

/// Recover the six truncated window bounds from a generated artifact name,
/// in the order `[mz_min, mz_max, rt_min, rt_max, dt_min, dt_max]`.
///
/// Returns `None` if the name does not carry the full window suffix.
pub fn parse_param_str(artifact_name: &str) -> Option<[i64; 6]> {
    let caps = ARTIFACT_SUFFIX_RE.captures(artifact_name)?;
    let mut bounds = [0i64; 6];
    for (slot, cap) in bounds.iter_mut().zip(caps.iter().skip(1)) {
        *slot = cap?.as_str().parse().ok()?;
    }
    Some(bounds)
}

/// Whether a file name is an intermediate MS artifact produced by this
/// pipeline. Anchored at the end of the name; names merely containing
/// similar digit groups do not match.
pub fn is_artifact_name(name: &str) -> bool {
    ARTIFACT_SUFFIX_RE.is_match(name)
}

// Splits the extension off the final path component: split at the last
// dot, but a dot-only prefix (hidden files) is not an extension boundary.
fn strip_raw_extension(raw_id: &str) -> &str {
    let base_start = raw_id.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = &raw_id[base_start..];
    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => &base[..dot],
        _ => base,
    }
}
