//! tSSS parameters stored in the processing history.
//!
//! `maxwell_filter` appends a processing record whose `FIFFB_SSS_ST_INFO`
//! block carries the temporal-extension settings (MNE's `max_st` dict).
use std::io::{Read, Seek};
use anyhow::Result;

use super::constants::*;
use super::tag::TagReader;
use super::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TsssRecord {
    pub job:         Option<i32>,
    /// Subspace correlation limit (`st_correlation`).
    pub correlation: Option<f64>,
    /// Buffer length in seconds (`st_duration`).
    pub buffer_len:  Option<f64>,
}

/// Read the most recent tSSS record, or `None` if the file was never
/// temporally filtered.
pub fn read_tsss_record<R: Read + Seek>(rd: &mut TagReader<R>, tree: &Node) -> Result<Option<TsssRecord>> {
    let Some(history) = tree.find_block(FIFFB_PROCESSING_HISTORY) else {
        return Ok(None);
    };
    // MNE writes the newest record first.
    let st_block = history
        .children
        .iter()
        .filter(|n| n.block == FIFFB_PROCESSING_RECORD)
        .find_map(|rec| rec.find_block(FIFFB_SSS_ST_INFO));
    let Some(st) = st_block else { return Ok(None) };

    let mut out = TsssRecord { job: None, correlation: None, buffer_len: None };
    for ent in &st.entries {
        match ent.kind {
            FIFF_SSS_JOB => out.job = Some(rd.i32(ent)?),
            FIFF_SSS_ST_CORR => out.correlation = Some(rd.f64(ent)?),
            FIFF_SSS_ST_LENGTH => out.buffer_len = Some(rd.f64(ent)?),
            _ => {}
        }
    }
    Ok(Some(out))
}
