//! Run configuration.
//!
//! [`ConvertConfig`] holds every parameter of a conversion run.  The tSSS
//! settings and the output buffer length are fixed by the lab's protocol;
//! the binary never exposes them on the command line.

use std::path::PathBuf;

/// Parameters handed to `mne.preprocessing.maxwell_filter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxwellParams {
    /// Length of the tSSS sub-window in seconds (`st_duration`).
    ///
    /// Default: `60.0` s.
    pub st_duration: f64,

    /// Subspace correlation limit above which inner/outer components are
    /// treated as interference (`st_correlation`).
    ///
    /// Default: `0.9`.
    pub st_correlation: f64,
}

impl Default for MaxwellParams {
    fn default() -> Self {
        Self { st_duration: 60.0, st_correlation: 0.9 }
    }
}

/// Configuration of one `.con` → `_raw_tsss.fif` run.
///
/// All fields are `pub`, so overrides use struct-update syntax:
///
/// ```
/// use con2fif::ConvertConfig;
///
/// let cfg = ConvertConfig {
///     out_dir: "/scratch/tsss".into(),
///     verify:  false,
///     ..ConvertConfig::default()
/// };
/// assert_eq!(cfg.buffer_size_sec, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// tSSS settings.
    pub maxwell: MaxwellParams,

    /// Length of each data buffer in the written FIF file, in seconds
    /// (`buffer_size_sec` of `Raw.save`).
    ///
    /// Default: `1.0` s.
    pub buffer_size_sec: f64,

    /// Directory the derived output file is written to.
    ///
    /// Default: `.` (the current working directory).
    pub out_dir: PathBuf,

    /// Python interpreter that has MNE installed.
    ///
    /// Default: `python3`.
    pub python: PathBuf,

    /// Read the written file back and check it against the run.
    ///
    /// Default: `true`.
    pub verify: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            maxwell: MaxwellParams::default(),
            buffer_size_sec: 1.0,
            out_dir: PathBuf::from("."),
            python: PathBuf::from("python3"),
            verify: true,
        }
    }
}
