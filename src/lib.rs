//! # con2fif — KIT `.con` to tSSS-filtered FIF
//!
//! Converts a KIT/Yokogawa MEG acquisition (`.con` data with its `.elp`,
//! `.mrk` and `.hsp` registration files) into FIF and applies temporal
//! Signal Space Separation.  Parsing, head registration, the Maxwell filter
//! and the FIF writer are [MNE-Python](https://mne.tools)'s; this crate
//! sequences them, names the output, and reads the result back with a
//! native FIF reader to check it.
//!
//! ## Pipeline
//!
//! ```text
//! run.con + run.elp + run.mrk + run.hsp
//!   │
//!   ├─ preflight             all four inputs exist
//!   ├─ read_raw_kit          MNE: KIT → Raw
//!   ├─ info['bads'] = …      only when bad channels were given
//!   ├─ maxwell_filter        st_duration = 60 s, st_correlation = 0.9
//!   ├─ Raw.save              <name>_raw_tsss.fif, 1 s buffers
//!   └─ verify                fiff::open_raw on every split part: bads, buffers,
//!                            tSSS record, finite data
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use con2fif::{convert, ConvertConfig, KitInputs, MneSession};
//!
//! let inputs = KitInputs {
//!     con: "s01.con".into(),
//!     elp: "s01.elp".into(),
//!     mrk: "s01.mrk".into(),
//!     hsp: "s01.hsp".into(),
//! };
//! let cfg = ConvertConfig::default();
//! let mut mne = MneSession::start(&cfg.python).unwrap();
//! let bads = vec!["MEG 144".to_string()];
//! let outcome = convert(&mut mne, &inputs, Some(bads.as_slice()), &cfg).unwrap();
//! println!("wrote {}", outcome.output.display());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fiff;
pub mod mne;
pub mod naming;
pub mod toolkit;
pub mod verify;

use std::path::PathBuf;

pub use config::{ConvertConfig, MaxwellParams};
pub use error::{ConvertError, Fault, Result};
pub use mne::MneSession;
pub use naming::output_filename;
pub use toolkit::{KitInputs, Recording, RecordingInfo, Toolkit};
pub use verify::{split_part_path, verify_output, Expectations, OutputSummary};

/// Result of a completed conversion.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// Path of the written file.
    pub output:   PathBuf,
    /// Metadata of the filtered recording as reported by the library.
    pub filtered: RecordingInfo,
    /// Read-back summary, `None` when verification was disabled.
    pub summary:  Option<OutputSummary>,
}

/// Fail with [`ConvertError::InputNotFound`] unless all four inputs are files.
pub fn check_inputs(inputs: &KitInputs) -> Result<()> {
    for (flag, path) in inputs.iter() {
        if !path.is_file() {
            log::debug!("-{flag} {} is not a file", path.display());
            return Err(ConvertError::InputNotFound(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Run the **conversion pipeline** for one acquisition.
///
/// # Steps
///
/// 1. Check that every input file exists.  Nothing is loaded otherwise.
/// 2. Load the KIT files.
/// 3. If `bads` is `Some`, replace the recording's bad-channel list with it
///    verbatim.  With `None` the loader's list is left as is.
/// 4. Run tSSS with [`ConvertConfig::maxwell`], then release the input.
/// 5. Save to `cfg.out_dir / output_filename(con)` with
///    [`ConvertConfig::buffer_size_sec`] buffers.  An existing file is
///    overwritten.
/// 6. If [`ConvertConfig::verify`] is set, read the file back.
///
/// # Errors
///
/// The first failing step aborts the run; see [`ConvertError`] for the
/// per-step variants.  Nothing is retried.
pub fn convert<T: Toolkit + ?Sized>(
    toolkit: &mut T,
    inputs:  &KitInputs,
    bads:    Option<&[String]>,
    cfg:     &ConvertConfig,
) -> Result<ConvertOutcome> {
    // 1. Preflight.
    check_inputs(inputs)?;
    let output = cfg.out_dir.join(output_filename(&inputs.con.to_string_lossy()));
    if output.exists() {
        log::warn!("{} exists and will be overwritten", output.display());
    }

    // 2. Load.
    log::info!("Loading data...");
    let mut raw = toolkit.read_raw_kit(inputs)?;
    log::info!(
        "Loaded {} channels, {:.1} s @ {} Hz",
        raw.info.ch_names.len(), raw.info.duration_secs(), raw.info.sfreq
    );

    // 3. Bad channels.
    if let Some(bads) = bads {
        log::info!("Marking bad channels: {bads:?}");
        toolkit.set_bads(&mut raw, bads)?;
    }

    // 4. tSSS.
    log::info!(
        "Performing maxwell_filter (tSSS, st_duration={} s, st_correlation={})",
        cfg.maxwell.st_duration, cfg.maxwell.st_correlation
    );
    let filtered = toolkit.maxwell_filter(&raw, &cfg.maxwell)?;
    toolkit.release(raw)?;

    // 5. Save.
    log::info!("Saving data to {}", output.display());
    toolkit.save(&filtered, &output, cfg.buffer_size_sec)?;
    let filtered_info = filtered.info.clone();
    toolkit.release(filtered)?;

    // 6. Verify.
    let summary = if cfg.verify {
        let expect = Expectations {
            bads: filtered_info.bads.clone(),
            maxwell: cfg.maxwell,
            buffer_size_sec: cfg.buffer_size_sec,
        };
        let summary = verify_output(&output, &expect)?;
        log::info!(
            "Verified {}: {} channels ({} MEG), {:.1} s in {} buffers across {} file(s), bads {:?}",
            output.display(), summary.n_chan, summary.n_meg,
            summary.duration_secs(), summary.n_buffers, summary.parts.len(), summary.bads
        );
        Some(summary)
    } else {
        None
    };

    Ok(ConvertOutcome { output, filtered: filtered_info, summary })
}
