//! MNE-Python session.
//!
//! One interpreter is spawned per run with an embedded driver script
//! (`mne_driver.py`).  Each request is a single JSON line on the child's
//! stdin and is answered by a single JSON line on its stdout:
//!
//! ```text
//! → {"op":"read_raw_kit","input_fname":"a.con","mrk":"a.mrk","elp":"a.elp","hsp":"a.hsp"}
//! ← {"ok":true,"handle":1,"info":{"ch_names":[…],"bads":[],"sfreq":1000.0,"n_times":600000}}
//! → {"op":"maxwell_filter","handle":1,"st_duration":60.0,"st_correlation":0.9}
//! ← {"ok":false,"error":{"kind":"ValueError","message":"…"}}
//! ```
//!
//! The child's stderr is inherited, so MNE's progress log and Python
//! tracebacks are shown to the user unmodified.
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::config::MaxwellParams;
use crate::error::{ConvertError, Fault, Result};
use crate::toolkit::{KitInputs, Recording, RecordingInfo, Toolkit};

/// Source of the Python side of the protocol.
pub const DRIVER: &str = include_str!("mne_driver.py");

/// `Fault::kind` used when the interpreter exits instead of replying.
pub const INTERPRETER_EXITED: &str = "InterpreterExited";

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum Request<'a> {
    ReadRawKit {
        input_fname: &'a Path,
        mrk: &'a Path,
        elp: &'a Path,
        hsp: &'a Path,
    },
    SetBads { handle: u32, bads: &'a [String] },
    MaxwellFilter { handle: u32, st_duration: f64, st_correlation: f64 },
    Save { handle: u32, fname: &'a Path, buffer_size_sec: f64 },
    Release { handle: u32 },
    Shutdown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Reply {
    ok: bool,
    handle: Option<u32>,
    info: Option<RecordingInfo>,
    mne_version: Option<String>,
    error: Option<Fault>,
}

impl Reply {
    fn into_result(self) -> std::result::Result<Reply, Fault> {
        if self.ok {
            return Ok(self);
        }
        Err(self
            .error
            .unwrap_or_else(|| Fault::new("UnknownError", "driver reported failure without details")))
    }

    fn into_recording(self) -> Result<Recording> {
        match (self.handle, self.info) {
            (Some(handle), Some(info)) => Ok(Recording { handle, info }),
            _ => Err(ConvertError::Protocol("reply is missing `handle` or `info`".into())),
        }
    }
}

pub struct MneSession {
    child:   Child,
    stdin:   ChildStdin,
    stdout:  BufReader<ChildStdout>,
    version: String,
}

impl MneSession {
    /// Spawn `python` with the driver and wait until `mne` is imported.
    pub fn start<P: AsRef<Path>>(python: P) -> Result<Self> {
        let python = python.as_ref();
        log::debug!("spawning {} with the MNE driver", python.display());
        let mut child = Command::new(python)
            .arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ConvertError::Spawn { python: python.to_path_buf(), source })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(ConvertError::Protocol("child pipes were not captured".into()));
        };

        let mut session = MneSession {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            version: String::new(),
        };
        let hello = session.read_reply()?.map_err(|fault| {
            if fault.kind == INTERPRETER_EXITED {
                ConvertError::Protocol(fault.message)
            } else {
                ConvertError::ToolkitUnavailable(fault)
            }
        })?;
        session.version = hello.mne_version.unwrap_or_else(|| "unknown".into());
        log::debug!("MNE {} ready", session.version);
        Ok(session)
    }

    pub fn mne_version(&self) -> &str {
        &self.version
    }

    fn call(&mut self, req: &Request<'_>) -> Result<std::result::Result<Reply, Fault>> {
        let line = serde_json::to_string(req)?;
        log::trace!("→ {line}");
        writeln!(self.stdin, "{line}")
            .and_then(|_| self.stdin.flush())
            .map_err(|e| ConvertError::Protocol(format!("driver stopped accepting requests: {e}")))?;
        self.read_reply()
    }

    /// A child that dies mid-request yields an [`INTERPRETER_EXITED`] fault,
    /// so the caller reports it against the step that was running.
    fn read_reply(&mut self) -> Result<std::result::Result<Reply, Fault>> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .map_err(|e| ConvertError::Protocol(format!("reading driver reply: {e}")))?;
        if n == 0 {
            let status = self
                .child
                .try_wait()
                .ok()
                .flatten()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "still running".into());
            return Ok(Err(Fault::new(INTERPRETER_EXITED, format!("driver closed its output ({status})"))));
        }
        log::trace!("← {}", line.trim_end());
        let reply: Reply = serde_json::from_str(&line)
            .map_err(|e| ConvertError::Protocol(format!("malformed reply {:?}: {e}", line.trim_end())))?;
        Ok(reply.into_result())
    }
}

impl Toolkit for MneSession {
    fn read_raw_kit(&mut self, inputs: &KitInputs) -> Result<Recording> {
        let req = Request::ReadRawKit {
            input_fname: &inputs.con,
            mrk: &inputs.mrk,
            elp: &inputs.elp,
            hsp: &inputs.hsp,
        };
        self.call(&req)?.map_err(ConvertError::Load)?.into_recording()
    }

    fn set_bads(&mut self, rec: &mut Recording, bads: &[String]) -> Result<()> {
        let reply = self
            .call(&Request::SetBads { handle: rec.handle, bads })?
            .map_err(ConvertError::Annotate)?;
        match reply.info {
            Some(info) => rec.info = info,
            None => rec.info.bads = bads.to_vec(),
        }
        Ok(())
    }

    fn maxwell_filter(&mut self, rec: &Recording, params: &MaxwellParams) -> Result<Recording> {
        let req = Request::MaxwellFilter {
            handle: rec.handle,
            st_duration: params.st_duration,
            st_correlation: params.st_correlation,
        };
        self.call(&req)?.map_err(ConvertError::Filter)?.into_recording()
    }

    fn save(&mut self, rec: &Recording, dest: &Path, buffer_size_sec: f64) -> Result<()> {
        let req = Request::Save { handle: rec.handle, fname: dest, buffer_size_sec };
        self.call(&req)?
            .map_err(|fault| ConvertError::Write { path: dest.to_path_buf(), fault })?;
        Ok(())
    }

    fn release(&mut self, rec: Recording) -> Result<()> {
        self.call(&Request::Release { handle: rec.handle })?
            .map_err(|f| ConvertError::Protocol(format!("release of handle {} failed: {f}", rec.handle)))?;
        Ok(())
    }
}

impl Drop for MneSession {
    fn drop(&mut self) {
        if let Ok(line) = serde_json::to_string(&Request::Shutdown) {
            let _ = writeln!(self.stdin, "{line}").and_then(|_| self.stdin.flush());
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_request_uses_mne_keyword_names() {
        let req = Request::ReadRawKit {
            input_fname: Path::new("/d/s01.con"),
            mrk: Path::new("/d/s01.mrk"),
            elp: Path::new("/d/s01.elp"),
            hsp: Path::new("/d/s01.hsp"),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({
            "op": "read_raw_kit",
            "input_fname": "/d/s01.con",
            "mrk": "/d/s01.mrk",
            "elp": "/d/s01.elp",
            "hsp": "/d/s01.hsp",
        }));
    }

    #[test]
    fn filter_request_carries_both_parameters() {
        let p = MaxwellParams::default();
        let req = Request::MaxwellFilter { handle: 3, st_duration: p.st_duration, st_correlation: p.st_correlation };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["op"], "maxwell_filter");
        assert_eq!(v["st_duration"], 60.0);
        assert_eq!(v["st_correlation"], 0.9);
    }

    #[test]
    fn shutdown_is_a_bare_tag() {
        assert_eq!(serde_json::to_string(&Request::Shutdown).unwrap(), r#"{"op":"shutdown"}"#);
    }

    #[test]
    fn failure_reply_yields_fault() {
        let r: Reply = serde_json::from_str(
            r#"{"ok":false,"error":{"kind":"ValueError","message":"bad channel MEG 999 not found"}}"#,
        ).unwrap();
        assert_eq!(r.into_result().unwrap_err(), Fault::new("ValueError", "bad channel MEG 999 not found"));
    }

    #[test]
    fn success_reply_without_handle_is_a_protocol_error() {
        let r: Reply = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        let err = r.into_result().unwrap().into_recording().unwrap_err();
        assert!(matches!(err, ConvertError::Protocol(_)));
    }
}
