//! Read-back check of the written FIF file.
//!
//! The file is opened with the native [`crate::fiff`] reader and compared
//! with what the run asked MNE to produce.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::MaxwellParams;
use crate::error::{ConvertError, Result};
use crate::fiff::{open_raw, RawFif, TsssRecord};

const PARAM_TOL: f64 = 1e-6;
/// The file stores `sfreq` as f32 while MNE sizes buffers from its f64 value.
const SFREQ_REL_TOL: f64 = 1e-6;

/// What the saved file must look like.
#[derive(Debug, Clone)]
pub struct Expectations {
    /// Bad channels of the recording that was saved.
    pub bads:            Vec<String>,
    pub maxwell:         MaxwellParams,
    pub buffer_size_sec: f64,
}

/// Facts about a verified output file, summed over its split parts.
#[derive(Debug, Clone)]
pub struct OutputSummary {
    pub path:          PathBuf,
    /// `path` followed by any `-1.fif`, `-2.fif`, … continuation files.
    pub parts:         Vec<PathBuf>,
    pub n_chan:        usize,
    pub n_meg:         usize,
    pub sfreq:         f64,
    pub n_times:       usize,
    pub n_buffers:     usize,
    pub bads:          Vec<String>,
    pub tsss:          Option<TsssRecord>,
}

impl OutputSummary {
    pub fn duration_secs(&self) -> f64 {
        self.n_times as f64 / self.sfreq
    }
}

/// Name of the `k`-th continuation file MNE writes when a save exceeds 2 GB:
/// `x_raw_tsss.fif` → `x_raw_tsss-1.fif`.
pub fn split_part_path(first: &Path, k: usize) -> PathBuf {
    let stem = first.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    first.with_file_name(format!("{stem}-{k}.fif"))
}

/// Open `path` (and its split continuations) and check it against `expect`.
pub fn verify_output(path: &Path, expect: &Expectations) -> Result<OutputSummary> {
    let first = open_part(path)?;
    match &first.tsss {
        Some(rec) => check_tsss(rec, &expect.maxwell)
            .map_err(|reason| ConvertError::Verify { path: path.to_path_buf(), reason })?,
        None => log::warn!("{} has no tSSS processing record", path.display()),
    }

    let mut summary = OutputSummary {
        path:      path.to_path_buf(),
        parts:     vec![],
        n_chan:    first.info.n_chan(),
        n_meg:     first.info.n_meg(),
        sfreq:     first.info.sfreq,
        n_times:   0,
        n_buffers: 0,
        bads:      first.info.bads.clone(),
        tsss:      first.tsss,
    };

    let mut part = first;
    loop {
        summary.n_buffers += check_part(&part, expect)?;
        summary.n_times += part.n_times();
        summary.parts.push(part.path.clone());

        let next = split_part_path(path, summary.parts.len());
        if !next.is_file() {
            break;
        }
        let end = part.first_samp + part.n_times() as u64;
        let cont = open_part(&next)?;
        if cont.first_samp != end {
            log::warn!(
                "ignoring {}: starts at sample {}, previous part ends at {end}",
                next.display(), cont.first_samp
            );
            break;
        }
        log::debug!("following split file {}", next.display());
        part = cont;
    }
    Ok(summary)
}

fn open_part(path: &Path) -> Result<RawFif> {
    open_raw(path).map_err(|source| ConvertError::Inspect { path: path.to_path_buf(), source })
}

/// Check bads, buffer sizes and sample values of one file.  Returns the
/// number of data buffers it holds.
fn check_part(raw: &RawFif, expect: &Expectations) -> Result<usize> {
    let fail = |reason: String| ConvertError::Verify { path: raw.path.clone(), reason };

    let written: BTreeSet<&str> = raw.info.bads.iter().map(String::as_str).collect();
    let wanted: BTreeSet<&str> = expect.bads.iter().map(String::as_str).collect();
    if written != wanted {
        return Err(fail(format!(
            "bad channels in file {:?} differ from requested {:?}",
            raw.info.bads, expect.bads
        )));
    }

    let max_samp = (expect.buffer_size_sec * raw.info.sfreq * (1.0 + SFREQ_REL_TOL)).ceil() as usize;
    let real: Vec<_> = raw.buffers.iter().filter(|b| b.tag.is_some()).collect();
    if let Some((i, b)) = real
        .iter()
        .enumerate()
        .take(real.len().saturating_sub(1))
        .find(|(_, b)| b.n_samp > max_samp)
    {
        return Err(fail(format!(
            "buffer {i} holds {} samples, more than {max_samp} ({} s at {} Hz)",
            b.n_samp, expect.buffer_size_sec, raw.info.sfreq
        )));
    }

    raw.for_each_buffer(|rec, data| {
        if let Some(((c, _), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            anyhow::bail!(
                "non-finite sample in channel {} of the buffer starting at sample {}",
                raw.info.chs[c].name, rec.first_samp
            );
        }
        Ok(())
    })
    .map_err(|e| fail(format!("{e:#}")))?;

    Ok(real.len())
}

fn check_tsss(rec: &TsssRecord, want: &MaxwellParams) -> std::result::Result<(), String> {
    if let Some(len) = rec.buffer_len {
        if (len - want.st_duration).abs() > PARAM_TOL * want.st_duration.max(1.0) {
            return Err(format!("tSSS buffer length is {len} s, expected {} s", want.st_duration));
        }
    }
    if let Some(corr) = rec.correlation {
        if (corr - want.st_correlation).abs() > PARAM_TOL {
            return Err(format!("tSSS correlation limit is {corr}, expected {}", want.st_correlation));
        }
    }
    Ok(())
}
