#![allow(dead_code)]
//! Shared helpers: a minimal FIF writer laid out like MNE's raw writer, and
//! a scripted `Toolkit` that records every call.
use std::path::{Path, PathBuf};

use con2fif::fiff::constants::*;
use con2fif::{ConvertError, Fault, KitInputs, MaxwellParams, Recording, RecordingInfo, Toolkit};

const FIFF_NOP: i32 = 108;

// ── Synthetic FIF files ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SynthFif {
    pub ch_names:   Vec<String>,
    pub sfreq:      f32,
    pub first_samp: i32,
    /// Samples per data buffer, in file order.
    pub buffers:    Vec<usize>,
    pub bads:       Vec<String>,
    /// `(st_duration, st_correlation)`.
    pub tsss:       Option<(f32, f32)>,
    /// `(buffer, channel)` whose first sample is NaN.
    pub nan_at:     Option<(usize, usize)>,
}

#[allow(unused)]
impl SynthFif {
    /// `n_chan` MEG channels named like KIT's (`MEG 001`, …), 1 s buffers.
    pub fn kit(n_chan: usize, sfreq: f32, seconds: usize) -> Self {
        SynthFif {
            ch_names:   (1..=n_chan).map(|i| format!("MEG {i:03}")).collect(),
            sfreq,
            first_samp: 0,
            buffers:    vec![sfreq as usize; seconds],
            bads:       vec![],
            tsss:       Some((60.0, 0.9)),
            nan_at:     None,
        }
    }

    /// Sample value before calibration.
    pub fn sample(c: usize, t: usize) -> f32 {
        c as f32 + t as f32 * 1e-3
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).expect("write synthetic fif");
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = TagWriter::default();
        w.tag(FIFF_FILE_ID, FIFFT_ID_STRUCT, &[0u8; 20]);
        w.int(FIFF_DIR_POINTER, -1);

        w.start(FIFFB_MEAS);
        w.start(FIFFB_MEAS_INFO);
        w.int(FIFF_NCHAN, self.ch_names.len() as i32);
        w.float(FIFF_SFREQ, self.sfreq);
        for (i, name) in self.ch_names.iter().enumerate() {
            w.tag(FIFF_CH_INFO, FIFFT_CH_INFO_STRUCT, &ch_info(i, name));
        }
        if !self.bads.is_empty() {
            w.start(FIFFB_MNE_BAD_CHANNELS);
            w.tag(FIFF_MNE_CH_NAME_LIST, FIFFT_STRING, self.bads.join(":").as_bytes());
            w.end(FIFFB_MNE_BAD_CHANNELS);
        }
        if let Some((len, corr)) = self.tsss {
            w.start(FIFFB_PROCESSING_HISTORY);
            w.start(FIFFB_PROCESSING_RECORD);
            w.start(FIFFB_SSS_INFO);
            w.end(FIFFB_SSS_INFO);
            w.start(FIFFB_SSS_ST_INFO);
            w.int(FIFF_SSS_JOB, 2);
            w.float(FIFF_SSS_ST_CORR, corr);
            w.float(FIFF_SSS_ST_LENGTH, len);
            w.end(FIFFB_SSS_ST_INFO);
            w.end(FIFFB_PROCESSING_RECORD);
            w.end(FIFFB_PROCESSING_HISTORY);
        }
        w.end(FIFFB_MEAS_INFO);

        w.start(FIFFB_RAW_DATA);
        w.int(FIFF_FIRST_SAMPLE, self.first_samp);
        let n_chan = self.ch_names.len();
        let mut t0 = 0usize;
        for (b, &n_samp) in self.buffers.iter().enumerate() {
            let mut payload = Vec::with_capacity(n_samp * n_chan * 4);
            for t in 0..n_samp {
                for c in 0..n_chan {
                    let v = if self.nan_at == Some((b, c)) && t == 0 {
                        f32::NAN
                    } else {
                        Self::sample(c, t0 + t)
                    };
                    payload.extend_from_slice(&v.to_be_bytes());
                }
            }
            w.tag(FIFF_DATA_BUFFER, FIFFT_FLOAT, &payload);
            t0 += n_samp;
        }
        w.end(FIFFB_RAW_DATA);
        w.end(FIFFB_MEAS);
        w.finish()
    }
}

fn ch_info(i: usize, name: &str) -> [u8; 96] {
    let mut raw = [0u8; 96];
    raw[0..4].copy_from_slice(&(i as i32 + 1).to_be_bytes());
    raw[4..8].copy_from_slice(&(i as i32 + 1).to_be_bytes());
    raw[8..12].copy_from_slice(&FIFFV_MEG_CH.to_be_bytes());
    raw[12..16].copy_from_slice(&1_f32.to_be_bytes());
    raw[16..20].copy_from_slice(&1_f32.to_be_bytes());
    raw[20..24].copy_from_slice(&6001_i32.to_be_bytes());
    let n = name.len().min(15);
    raw[80..80 + n].copy_from_slice(&name.as_bytes()[..n]);
    raw
}

#[derive(Default)]
struct TagWriter {
    buf: Vec<u8>,
}

impl TagWriter {
    fn tag(&mut self, kind: i32, ftype: u32, payload: &[u8]) {
        self.buf.extend_from_slice(&kind.to_be_bytes());
        self.buf.extend_from_slice(&ftype.to_be_bytes());
        self.buf.extend_from_slice(&(payload.len() as i32).to_be_bytes());
        self.buf.extend_from_slice(&FIFFV_NEXT_SEQ.to_be_bytes());
        self.buf.extend_from_slice(payload);
    }

    fn int(&mut self, kind: i32, v: i32) {
        self.tag(kind, FIFFT_INT, &v.to_be_bytes());
    }

    fn float(&mut self, kind: i32, v: f32) {
        self.tag(kind, FIFFT_FLOAT, &v.to_be_bytes());
    }

    fn start(&mut self, block: i32) {
        self.int(FIFF_BLOCK_START, block);
    }

    fn end(&mut self, block: i32) {
        self.int(FIFF_BLOCK_END, block);
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(&FIFF_NOP.to_be_bytes());
        self.buf.extend_from_slice(&0_u32.to_be_bytes());
        self.buf.extend_from_slice(&0_i32.to_be_bytes());
        self.buf.extend_from_slice(&FIFFV_NEXT_NONE.to_be_bytes());
        self.buf
    }
}

// ── Scripted toolkit ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ReadRawKit(KitInputs),
    SetBads(u32, Vec<String>),
    MaxwellFilter(u32, MaxwellParams),
    Save(u32, PathBuf, f64),
    Release(u32),
}

#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Load,
    Annotate,
    Filter,
    Save,
}

/// Behaves like MNE for the purposes of the pipeline: the filter drops MEG
/// channels from `bads` (they are reconstructed), and `save` writes a real
/// FIF file so read-back checks run.
pub struct ScriptedToolkit {
    pub calls:       Vec<Call>,
    pub loader_bads: Vec<String>,
    pub n_chan:      usize,
    pub sfreq:       f64,
    pub seconds:     usize,
    pub fail_at:     Option<Step>,
    /// Override the st_duration written into the saved file.
    pub written_st_duration: Option<f32>,
    next_handle:     u32,
}

#[allow(unused)]
impl ScriptedToolkit {
    pub fn new() -> Self {
        ScriptedToolkit {
            calls:       vec![],
            loader_bads: vec![],
            n_chan:      4,
            sfreq:       100.0,
            seconds:     3,
            fail_at:     None,
            written_st_duration: None,
            next_handle: 1,
        }
    }

    pub fn failing_at(step: Step) -> Self {
        ScriptedToolkit { fail_at: Some(step), ..Self::new() }
    }

    fn fault(&self, step: Step) -> Option<Fault> {
        (self.fail_at == Some(step)).then(|| Fault::new("RuntimeError", format!("scripted {step:?} failure")))
    }

    fn recording(&mut self, bads: Vec<String>) -> Recording {
        let handle = self.next_handle;
        self.next_handle += 1;
        Recording {
            handle,
            info: RecordingInfo {
                ch_names: (1..=self.n_chan).map(|i| format!("MEG {i:03}")).collect(),
                bads,
                sfreq: self.sfreq,
                n_times: (self.sfreq as u64) * self.seconds as u64,
            },
        }
    }

    pub fn saved_path(&self) -> Option<&Path> {
        self.calls.iter().find_map(|c| match c {
            Call::Save(_, p, _) => Some(p.as_path()),
            _ => None,
        })
    }
}

impl Toolkit for ScriptedToolkit {
    fn read_raw_kit(&mut self, inputs: &KitInputs) -> con2fif::Result<Recording> {
        self.calls.push(Call::ReadRawKit(inputs.clone()));
        if let Some(f) = self.fault(Step::Load) {
            return Err(ConvertError::Load(f));
        }
        let bads = self.loader_bads.clone();
        Ok(self.recording(bads))
    }

    fn set_bads(&mut self, rec: &mut Recording, bads: &[String]) -> con2fif::Result<()> {
        self.calls.push(Call::SetBads(rec.handle, bads.to_vec()));
        if let Some(f) = self.fault(Step::Annotate) {
            return Err(ConvertError::Annotate(f));
        }
        rec.info.bads = bads.to_vec();
        Ok(())
    }

    fn maxwell_filter(&mut self, rec: &Recording, params: &MaxwellParams) -> con2fif::Result<Recording> {
        self.calls.push(Call::MaxwellFilter(rec.handle, *params));
        if let Some(f) = self.fault(Step::Filter) {
            return Err(ConvertError::Filter(f));
        }
        let kept = rec.info.bads.iter().filter(|b| !b.starts_with("MEG")).cloned().collect();
        Ok(self.recording(kept))
    }

    fn save(&mut self, rec: &Recording, dest: &Path, buffer_size_sec: f64) -> con2fif::Result<()> {
        self.calls.push(Call::Save(rec.handle, dest.to_path_buf(), buffer_size_sec));
        if let Some(fault) = self.fault(Step::Save) {
            return Err(ConvertError::Write { path: dest.to_path_buf(), fault });
        }
        let per_buf = (self.sfreq * buffer_size_sec).round() as usize;
        let total = rec.info.n_times as usize;
        let mut buffers = vec![per_buf; total / per_buf];
        if total % per_buf != 0 {
            buffers.push(total % per_buf);
        }
        let fif = SynthFif {
            ch_names:   rec.info.ch_names.clone(),
            sfreq:      self.sfreq as f32,
            first_samp: 0,
            buffers,
            bads:       rec.info.bads.clone(),
            tsss:       Some((self.written_st_duration.unwrap_or(60.0), 0.9)),
            nan_at:     None,
        };
        fif.write(dest);
        Ok(())
    }

    fn release(&mut self, rec: Recording) -> con2fif::Result<()> {
        self.calls.push(Call::Release(rec.handle));
        Ok(())
    }
}

// ── Input files ───────────────────────────────────────────────────────────

/// Create empty `.con/.elp/.mrk/.hsp` files named `stem.*` in `dir`.
#[allow(unused)]
pub fn touch_inputs(dir: &Path, stem: &str) -> KitInputs {
    let make = |ext: &str| {
        let p = dir.join(format!("{stem}.{ext}"));
        std::fs::write(&p, b"").expect("create input");
        p
    };
    KitInputs { con: make("con"), elp: make("elp"), mrk: make("mrk"), hsp: make("hsp") }
}
