//! FIFF constants needed to read back a raw recording written by MNE.
//!
//! Names follow [`mne/_fiff/constants.py`][mne-src] so the reader can be
//! cross-referenced with MNE.  Only the subset touched by [`super::raw`],
//! [`super::info`] and [`super::sss`] is listed here.
//!
//! [mne-src]: https://github.com/mne-tools/mne-python/blob/main/mne/_fiff/constants.py

// ── Block kinds ───────────────────────────────────────────────────────────

/// Measurement block — top-level container for one recording.
pub const FIFFB_MEAS:               i32 = 100;
/// Measurement-info block — channels, sfreq, bad channels.
pub const FIFFB_MEAS_INFO:          i32 = 101;
/// Raw (continuous) data block.
pub const FIFFB_RAW_DATA:           i32 = 102;
/// Continuous data block (written by some acquisition systems instead of raw).
pub const FIFFB_CONTINUOUS_DATA:    i32 = 112;
/// MNE bad-channel block; holds a `FIFF_MNE_CH_NAME_LIST`.
pub const FIFFB_MNE_BAD_CHANNELS:   i32 = 359;
/// Maxwell-filter (SSS) info block inside a processing record.
pub const FIFFB_SSS_INFO:           i32 = 502;
/// Temporal-extension (tSSS) parameters of a processing record.
pub const FIFFB_SSS_ST_INFO:        i32 = 504;
/// Processing history.
pub const FIFFB_PROCESSING_HISTORY: i32 = 900;
/// One entry of the processing history.
pub const FIFFB_PROCESSING_RECORD:  i32 = 901;

// ── Tag kinds — structural ─────────────────────────────────────────────────

/// Unique file identifier (first tag in every FIF file).
pub const FIFF_FILE_ID:         i32 = 100;
/// Pointer to the embedded tag directory (payload = byte offset, or -1).
pub const FIFF_DIR_POINTER:     i32 = 101;
/// Opens a block; payload = block kind.
pub const FIFF_BLOCK_START:     i32 = 104;
/// Closes the innermost open block.
pub const FIFF_BLOCK_END:       i32 = 105;

// ── Tag kinds — measurement info ──────────────────────────────────────────

pub const FIFF_NCHAN:           i32 = 200;
pub const FIFF_SFREQ:           i32 = 201;
/// Channel info struct, one per channel.
pub const FIFF_CH_INFO:         i32 = 203;
pub const FIFF_FIRST_SAMPLE:    i32 = 208;
/// Colon-separated bad channel names (older writers).
pub const FIFF_BAD_CHS:         i32 = 220;
/// Colon-separated channel name list (MNE).
pub const FIFF_MNE_CH_NAME_LIST: i32 = 3507;

// ── Tag kinds — data ───────────────────────────────────────────────────────

/// One buffer of samples, interleaved `[n_samp, n_chan]`.
pub const FIFF_DATA_BUFFER:     i32 = 300;
/// Skip `n` buffers' worth of samples.
pub const FIFF_DATA_SKIP:       i32 = 301;

// ── Tag kinds — SSS / tSSS processing record ──────────────────────────────

pub const FIFF_SSS_JOB:         i32 = 264;
/// tSSS subspace correlation limit (f32).
pub const FIFF_SSS_ST_CORR:     i32 = 272;
/// tSSS buffer length in seconds (f32).
pub const FIFF_SSS_ST_LENGTH:   i32 = 279;

// ── Tag payload types ──────────────────────────────────────────────────────

pub const FIFFT_SHORT:             u32 = 2;
pub const FIFFT_INT:               u32 = 3;
pub const FIFFT_FLOAT:             u32 = 4;
pub const FIFFT_DOUBLE:            u32 = 5;
pub const FIFFT_STRING:            u32 = 10;
/// 16-bit DAU packed sample (same width as `FIFFT_SHORT`).
pub const FIFFT_DAU_PACK16:        u32 = 16;
pub const FIFFT_CH_INFO_STRUCT:    u32 = 30;
pub const FIFFT_ID_STRUCT:         u32 = 31;
pub const FIFFT_DIR_ENTRY_STRUCT:  u32 = 32;

// ── `next` sentinels ──────────────────────────────────────────────────────

/// Next tag follows immediately: `pos + 16 + size`.
pub const FIFFV_NEXT_SEQ:  i32 = 0;
/// No next tag.
pub const FIFFV_NEXT_NONE: i32 = -1;

// ── Channel kinds ─────────────────────────────────────────────────────────

pub const FIFFV_MEG_CH: i32 = 1;

/// Bytes per sample for the buffer types MNE writes.
///
/// ```
/// use con2fif::fiff::constants::{bytes_per_sample, FIFFT_FLOAT, FIFFT_STRING};
/// assert_eq!(bytes_per_sample(FIFFT_FLOAT), Some(4));
/// assert_eq!(bytes_per_sample(FIFFT_STRING), None);
/// ```
pub fn bytes_per_sample(ftype: u32) -> Option<usize> {
    match ftype {
        FIFFT_SHORT | FIFFT_DAU_PACK16 => Some(2),
        FIFFT_INT | FIFFT_FLOAT        => Some(4),
        FIFFT_DOUBLE                   => Some(8),
        _ => None,
    }
}
