//! Raw FIF reader, the Rust counterpart of `mne.io.read_raw_fif(preload=False)`.
//!
//! # Algorithm
//! 1. Load the tag directory (embedded directory, else follow `next`).
//! 2. Build the block tree and decode [`MeasInfo`].
//! 3. Read the tSSS processing record, if any.
//! 4. Walk `FIFFB_RAW_DATA` (or `FIFFB_CONTINUOUS_DATA`) to build the
//!    buffer table.  Data stays on disk; [`RawFif::for_each_buffer`] streams it.
//!
//! Stored samples are `[n_samp, n_chan]` interleaved; a channel's value in
//! physical units is `stored × cal × range`.
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array2;

use super::constants::*;
use super::info::{read_meas_info, MeasInfo};
use super::sss::{read_tsss_record, TsssRecord};
use super::tag::{Tag, TagReader};
use super::tree::{load_directory, read_tree};

/// One entry of the buffer table.
#[derive(Debug, Clone)]
pub struct BufferRecord {
    /// `None` for a gap introduced by `FIFF_DATA_SKIP`; reads as zeros.
    pub tag:        Option<Tag>,
    pub first_samp: u64,
    pub n_samp:     usize,
}

/// A raw recording opened without preloading.
#[derive(Debug, Clone)]
pub struct RawFif {
    pub info:       MeasInfo,
    pub tsss:       Option<TsssRecord>,
    pub first_samp: u64,
    pub buffers:    Vec<BufferRecord>,
    pub path:       PathBuf,
}

impl RawFif {
    #[inline]
    pub fn n_times(&self) -> usize {
        self.buffers.iter().map(|b| b.n_samp).sum()
    }

    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.n_times() as f64 / self.info.sfreq
    }

    /// Read every buffer in file order, handing `[n_chan, n_samp]`
    /// calibrated samples to `f`.  Only one buffer is held in memory.
    pub fn for_each_buffer<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&BufferRecord, Array2<f64>) -> Result<()>,
    {
        let file = File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut rd = TagReader::new(BufReader::new(file));
        let cals = self.info.cals();
        for rec in &self.buffers {
            let data = match &rec.tag {
                Some(tag) => read_buffer(&mut rd, tag, rec.n_samp, &cals)?,
                None => Array2::zeros((cals.len(), rec.n_samp)),
            };
            f(rec, data)?;
        }
        Ok(())
    }
}

/// Open a FIF file and index its raw data buffers.
pub fn open_raw<P: AsRef<Path>>(path: P) -> Result<RawFif> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rd = TagReader::new(BufReader::new(file));

    let directory = load_directory(&mut rd)?;
    let tree = read_tree(&mut rd, &directory)?;
    let info = read_meas_info(&mut rd, &tree)?;
    let tsss = read_tsss_record(&mut rd, &tree)?;

    let raw_node = tree
        .find_block(FIFFB_MEAS)
        .and_then(|m| m.find_block(FIFFB_RAW_DATA).or_else(|| m.find_block(FIFFB_CONTINUOUS_DATA)))
        .ok_or_else(|| anyhow!("no raw-data block in {}", path.display()))?;

    let n_chan = info.n_chan();
    if n_chan == 0 {
        bail!("{} declares no channels", path.display());
    }

    let mut first_samp = match raw_node.find_tag(FIFF_FIRST_SAMPLE) {
        Some(tag) => rd.i32(tag)?.max(0) as u64,
        None => 0,
    };
    let start = first_samp;
    let mut pending_skip = 0usize;
    let mut buffers = Vec::new();

    for ent in &raw_node.entries {
        match ent.kind {
            FIFF_DATA_SKIP => pending_skip += rd.i32(ent)?.max(0) as usize,
            FIFF_DATA_BUFFER => {
                let bps = bytes_per_sample(ent.ftype)
                    .ok_or_else(|| anyhow!("unsupported buffer type {}", ent.ftype))?;
                if ent.len() % (bps * n_chan) != 0 {
                    bail!(
                        "buffer @ {:#x} holds {} bytes, not a multiple of {n_chan} channels × {bps} bytes",
                        ent.pos, ent.len()
                    );
                }
                let n_samp = ent.len() / (bps * n_chan);
                if pending_skip > 0 {
                    let gap = pending_skip * n_samp;
                    buffers.push(BufferRecord { tag: None, first_samp, n_samp: gap });
                    first_samp += gap as u64;
                    pending_skip = 0;
                }
                buffers.push(BufferRecord { tag: Some(*ent), first_samp, n_samp });
                first_samp += n_samp as u64;
            }
            _ => {}
        }
    }

    if buffers.is_empty() {
        bail!("no FIFF_DATA_BUFFER tags in {}", path.display());
    }

    Ok(RawFif { info, tsss, first_samp: start, buffers, path: path.to_path_buf() })
}

/// Decode one buffer to `[n_chan, n_samp]` with calibration applied.
fn read_buffer<R: Read + Seek>(
    rd:     &mut TagReader<R>,
    tag:    &Tag,
    n_samp: usize,
    cals:   &[f64],
) -> Result<Array2<f64>> {
    let n_chan = cals.len();
    let bytes = rd.bytes(tag)?;
    let bps = bytes_per_sample(tag.ftype)
        .ok_or_else(|| anyhow!("unsupported buffer type {}", tag.ftype))?;

    let decode: fn(&[u8]) -> f64 = match tag.ftype {
        FIFFT_FLOAT => |b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
        FIFFT_DOUBLE => |b| f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
        FIFFT_INT => |b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
        FIFFT_SHORT | FIFFT_DAU_PACK16 => |b| i16::from_be_bytes([b[0], b[1]]) as f64,
        other => bail!("unsupported buffer type {other}"),
    };

    let mut out = Array2::<f64>::zeros((n_chan, n_samp));
    for (i, sample) in bytes.chunks_exact(bps).take(n_chan * n_samp).enumerate() {
        let (t, c) = (i / n_chan, i % n_chan);
        out[[c, t]] = decode(sample) * cals[c];
    }
    Ok(out)
}
