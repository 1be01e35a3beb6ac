//! Command-line surface of the `con2fif` binary.
//!
//! The lab's scripts call the converter with single-dash multi-letter flags
//! (`-con run.con -bad "MEG 144"`).  clap only knows `-c` / `--con`, so
//! [`normalize_legacy_flags`] rewrites those tokens before parsing.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::ConvertConfig;
use crate::toolkit::KitInputs;

/// Legacy spelling → long flag.
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-bad", "--names-list"),
    ("-con", "--confile"),
    ("-elp", "--elpfile"),
    ("-mrk", "--mrkfile"),
    ("-hsp", "--hspfile"),
];

#[derive(Parser, Debug)]
#[command(
    name = "con2fif",
    version,
    about = ".con to .fif + Maxwell Filter",
    long_about = "Convert a KIT/Yokogawa .con recording to FIF and apply tSSS \
                  (st_duration = 60 s, st_correlation = 0.9) through MNE-Python.\n\
                  The result is written as <name>_raw_tsss.fif."
)]
pub struct Args {
    /// Bad channels, e.g. 'MEG 144' 'MEG 155'
    #[arg(short = 'b', long = "names-list", value_name = "CHANNEL", num_args = 0..)]
    pub bad_chan: Option<Vec<String>>,

    /// Path to .con file
    #[arg(long = "confile", visible_alias = "con", value_name = "CON", required = true)]
    pub confile: PathBuf,

    /// Path to .elp file
    #[arg(long = "elpfile", visible_alias = "elp", value_name = "ELP", required = true)]
    pub elpfile: PathBuf,

    /// Path to .mrk file
    #[arg(long = "mrkfile", visible_alias = "mrk", value_name = "MRK", required = true)]
    pub mrkfile: PathBuf,

    /// Path to .hsp file
    #[arg(long = "hspfile", visible_alias = "hsp", value_name = "HSP", required = true)]
    pub hspfile: PathBuf,

    /// Directory for the output file
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Python interpreter with MNE installed
    #[arg(long, value_name = "PATH", env = "MNE_PYTHON", default_value = "python3")]
    pub python: PathBuf,

    /// Do not read the written file back
    #[arg(long)]
    pub skip_verify: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse from an argument list that may use legacy flags.
    pub fn parse_legacy<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_legacy_flags(args))
    }

    pub fn try_parse_legacy<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_legacy_flags(args))
    }

    pub fn inputs(&self) -> KitInputs {
        KitInputs {
            con: self.confile.clone(),
            elp: self.elpfile.clone(),
            mrk: self.mrkfile.clone(),
            hsp: self.hspfile.clone(),
        }
    }

    /// Run configuration.  tSSS and buffer settings keep their defaults.
    pub fn config(&self) -> ConvertConfig {
        ConvertConfig {
            out_dir: self.out_dir.clone(),
            python: self.python.clone(),
            verify: !self.skip_verify,
            ..ConvertConfig::default()
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Warn;
        }
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Rewrite `-con x` / `-con=x` style tokens to their long form.  Anything
/// after a bare `--` is left alone.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    for arg in args.into_iter().map(Into::into) {
        if passthrough {
            out.push(arg);
            continue;
        }
        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                return None;
            }
            LEGACY_FLAGS.iter().find_map(|&(short, long)| {
                if s == short {
                    Some(OsString::from(long))
                } else {
                    s.strip_prefix(short)
                        .and_then(|rest| rest.strip_prefix('='))
                        .map(|value| OsString::from(format!("{long}={value}")))
                }
            })
        });
        if arg == "--" {
            passthrough = true;
        }
        out.push(rewritten.unwrap_or(arg));
    }
    out
}
