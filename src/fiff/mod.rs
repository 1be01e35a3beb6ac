//! FIFF reader.
//!
//! Reads back `.fif` recordings written by [MNE-Python](https://mne.tools):
//! measurement info, the raw buffer table and the tSSS processing record.
//! Writing FIF is left to MNE.
//!
//! ```no_run
//! use con2fif::fiff::open_raw;
//!
//! let raw = open_raw("subj01_raw_tsss.fif").unwrap();
//! println!("{} channels @ {} Hz, bads {:?}", raw.info.n_chan(), raw.info.sfreq, raw.info.bads);
//! ```
pub mod constants;
pub mod info;
pub mod raw;
pub mod sss;
pub mod tag;
pub mod tree;

pub use info::{read_meas_info, split_name_list, ChannelInfo, MeasInfo};
pub use raw::{open_raw, BufferRecord, RawFif};
pub use sss::{read_tsss_record, TsssRecord};
pub use tag::{Tag, TagReader};
pub use tree::{build_tree, load_directory, read_tree, scan_directory, Node};
