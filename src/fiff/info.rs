//! Measurement info (MNE's `Info`) read from `FIFFB_MEAS_INFO`.
//!
//! Only the fields needed to check a converted recording are decoded:
//! channel structs, sampling rate and the bad-channel list.
use std::io::{Read, Seek};
use anyhow::{anyhow, bail, Result};

use super::constants::*;
use super::tag::{be_f32, be_i32, TagReader};
use super::tree::Node;

/// One `FIFFT_CH_INFO_STRUCT` payload.
///
/// ```text
///  0  scanno     i32      24  loc        12 × f32
///  4  logno      i32      72  unit       i32
///  8  kind       i32      76  unit_mul   i32
/// 12  range      f32      80  ch_name    16 × u8, NUL padded
/// 16  cal        f32      ──
/// 20  coil_type  i32      96 bytes
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub name:      String,
    pub kind:      i32,
    pub coil_type: i32,
    pub range:     f32,
    pub cal:       f32,
}

impl ChannelInfo {
    pub const STRUCT_LEN: usize = 96;

    /// Factor applied to stored samples: `cal × range`.
    #[inline]
    pub fn calibration(&self) -> f64 {
        self.cal as f64 * self.range as f64
    }

    pub fn is_meg(&self) -> bool {
        self.kind == FIFFV_MEG_CH
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() < Self::STRUCT_LEN {
            bail!("ch_info payload too short: {} bytes (need {})", raw.len(), Self::STRUCT_LEN);
        }
        let name_bytes = &raw[80..96];
        let end = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
        Ok(ChannelInfo {
            name:      name_bytes[..end].iter().map(|&b| char::from(b)).collect(),
            kind:      be_i32(&raw[8..12]),
            coil_type: be_i32(&raw[20..24]),
            range:     be_f32(&raw[12..16]),
            cal:       be_f32(&raw[16..20]),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MeasInfo {
    pub sfreq: f64,
    pub chs:   Vec<ChannelInfo>,
    /// Bad channel names in the order they were written.
    pub bads:  Vec<String>,
}

impl MeasInfo {
    pub fn n_chan(&self) -> usize {
        self.chs.len()
    }

    pub fn ch_names(&self) -> Vec<&str> {
        self.chs.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn cals(&self) -> Vec<f64> {
        self.chs.iter().map(ChannelInfo::calibration).collect()
    }

    pub fn n_meg(&self) -> usize {
        self.chs.iter().filter(|c| c.is_meg()).count()
    }
}

/// Split a colon-separated FIFF name list.
pub fn split_name_list(s: &str) -> Vec<String> {
    s.split(':')
        .map(|n| n.trim_end_matches('\0'))
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode `MeasInfo` from the tree of an open file.
///
/// Bad channels come from the MNE bad-channel block when present, falling
/// back to the older `FIFF_BAD_CHS` string tag.
pub fn read_meas_info<R: Read + Seek>(rd: &mut TagReader<R>, tree: &Node) -> Result<MeasInfo> {
    let info_node = tree
        .find_block(FIFFB_MEAS)
        .and_then(|m| m.find_block(FIFFB_MEAS_INFO))
        .ok_or_else(|| anyhow!("FIFFB_MEAS_INFO block not found"))?;

    let mut n_chan = None::<usize>;
    let mut sfreq = None::<f64>;
    let mut chs = Vec::new();
    let mut legacy_bads = None::<Vec<String>>;

    for ent in &info_node.entries {
        match ent.kind {
            FIFF_NCHAN => n_chan = Some(rd.i32(ent)?.max(0) as usize),
            FIFF_SFREQ => sfreq = Some(rd.f64(ent)?),
            FIFF_CH_INFO => chs.push(ChannelInfo::from_bytes(&rd.bytes(ent)?)?),
            FIFF_BAD_CHS => legacy_bads = Some(split_name_list(&rd.string(ent)?)),
            _ => {}
        }
    }

    let mne_bads = match info_node.find_block(FIFFB_MNE_BAD_CHANNELS) {
        Some(block) => match block.find_tag(FIFF_MNE_CH_NAME_LIST) {
            Some(tag) => Some(split_name_list(&rd.string(tag)?)),
            None => Some(Vec::new()),
        },
        None => None,
    };

    let n_chan = n_chan.ok_or_else(|| anyhow!("FIFF_NCHAN not found"))?;
    let sfreq = sfreq.ok_or_else(|| anyhow!("FIFF_SFREQ not found"))?;
    if chs.len() != n_chan {
        bail!("expected {n_chan} ch_info structs, got {}", chs.len());
    }
    if !(sfreq.is_finite() && sfreq > 0.0) {
        bail!("invalid sampling frequency {sfreq}");
    }

    Ok(MeasInfo {
        sfreq,
        chs,
        bads: mne_bads.or(legacy_bads).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kit_channel_struct() {
        let mut raw = vec![0u8; 96];
        raw[8..12].copy_from_slice(&FIFFV_MEG_CH.to_be_bytes());
        raw[12..16].copy_from_slice(&1_f32.to_be_bytes());
        raw[16..20].copy_from_slice(&2.5e-13_f32.to_be_bytes());
        raw[20..24].copy_from_slice(&6001_i32.to_be_bytes());
        raw[80..87].copy_from_slice(b"MEG 144");

        let ch = ChannelInfo::from_bytes(&raw).unwrap();
        assert_eq!(ch.name, "MEG 144");
        assert!(ch.is_meg());
        assert_eq!(ch.coil_type, 6001);
        approx::assert_relative_eq!(ch.calibration(), 2.5e-13, max_relative = 1e-6);
    }

    #[test]
    fn truncated_channel_struct() {
        assert!(ChannelInfo::from_bytes(&[0u8; 95]).is_err());
    }

    #[test]
    fn name_list_with_spaces() {
        assert_eq!(split_name_list("MEG 144:MEG 155"), vec!["MEG 144", "MEG 155"]);
        assert!(split_name_list("").is_empty());
    }
}
