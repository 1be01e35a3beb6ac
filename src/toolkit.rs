//! The neuroimaging library seen from Rust.
//!
//! Loading KIT files, the Maxwell filter and the FIF writer live in the
//! library; [`Toolkit`] is the narrow surface the conversion needs.
//! [`crate::mne::MneSession`] drives MNE-Python; tests substitute their own.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::MaxwellParams;
use crate::error::Result;

/// The four files of one KIT acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitInputs {
    /// Sensor data (`.con`).
    pub con: PathBuf,
    /// Coil/electrode layout (`.elp`).
    pub elp: PathBuf,
    /// Marker-coil positions (`.mrk`).
    pub mrk: PathBuf,
    /// Head-shape digitisation (`.hsp`).
    pub hsp: PathBuf,
}

impl KitInputs {
    /// `(flag, path)` pairs in command-line order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Path)> {
        [
            ("con", self.con.as_path()),
            ("elp", self.elp.as_path()),
            ("mrk", self.mrk.as_path()),
            ("hsp", self.hsp.as_path()),
        ]
        .into_iter()
    }
}

/// Metadata snapshot of a library-side recording.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub ch_names: Vec<String>,
    pub bads:     Vec<String>,
    pub sfreq:    f64,
    pub n_times:  u64,
}

impl RecordingInfo {
    pub fn duration_secs(&self) -> f64 {
        if self.sfreq > 0.0 { self.n_times as f64 / self.sfreq } else { 0.0 }
    }
}

/// Handle to a recording that lives inside the library.
///
/// Not `Clone`: [`Toolkit::release`] consumes it.
#[derive(Debug, PartialEq)]
pub struct Recording {
    pub handle: u32,
    pub info:   RecordingInfo,
}

pub trait Toolkit {
    /// Parse the KIT files into a recording.
    fn read_raw_kit(&mut self, inputs: &KitInputs) -> Result<Recording>;

    /// Replace the recording's bad-channel list with `bads`, verbatim.
    fn set_bads(&mut self, rec: &mut Recording, bads: &[String]) -> Result<()>;

    /// Run tSSS on `rec`, producing a new recording.
    fn maxwell_filter(&mut self, rec: &Recording, params: &MaxwellParams) -> Result<Recording>;

    /// Write `rec` as FIF, overwriting `dest`.
    fn save(&mut self, rec: &Recording, dest: &Path, buffer_size_sec: f64) -> Result<()>;

    /// Free the library-side object.
    fn release(&mut self, rec: Recording) -> Result<()>;
}
