//! Block tree of a FIF file.
//!
//! Tags are grouped by `FIFF_BLOCK_START` / `FIFF_BLOCK_END` pairs.  The
//! tree is built from the flat tag directory, resolving every block's kind
//! from the payload of its start tag, the same way `mne._fiff.tree` does.
use std::io::{Read, Seek};
use anyhow::{bail, Result};

use super::constants::*;
use super::tag::{Tag, TagReader};

/// One block of the tree.  The root has `block == 0`.
#[derive(Debug, Default, Clone)]
pub struct Node {
    pub block:    i32,
    /// Non-structural tags directly inside this block.
    pub entries:  Vec<Tag>,
    pub children: Vec<Node>,
}

impl Node {
    /// Depth-first search for the first block of `kind` (including `self`).
    pub fn find_block(&self, kind: i32) -> Option<&Node> {
        if self.block == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_block(kind))
    }

    /// First entry of `kind` in this block only.
    pub fn find_tag(&self, kind: i32) -> Option<&Tag> {
        self.entries.iter().find(|e| e.kind == kind)
    }
}

/// Group a flat directory into blocks.  `block_kind` resolves the kind of a
/// `FIFF_BLOCK_START` tag.
pub fn build_tree<F>(directory: &[Tag], mut block_kind: F) -> Result<Node>
where
    F: FnMut(&Tag) -> Result<i32>,
{
    let mut stack = vec![Node::default()];
    for tag in directory {
        match tag.kind {
            FIFF_BLOCK_START => {
                let block = block_kind(tag)?;
                stack.push(Node { block, ..Node::default() });
            }
            FIFF_BLOCK_END => {
                if stack.len() == 1 {
                    bail!("unbalanced FIFF_BLOCK_END @ {:#x}", tag.pos);
                }
                let done = stack.pop().unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(done);
                }
            }
            _ => {
                if let Some(node) = stack.last_mut() {
                    node.entries.push(*tag);
                }
            }
        }
    }
    // A truncated file leaves blocks open; attach them to their parents.
    while stack.len() > 1 {
        let open = stack.pop().unwrap_or_default();
        if let Some(parent) = stack.last_mut() {
            parent.children.push(open);
        }
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Build the tree for an open file.
pub fn read_tree<R: Read + Seek>(rd: &mut TagReader<R>, directory: &[Tag]) -> Result<Node> {
    build_tree(directory, |tag| rd.i32(tag))
}

/// Collect every header by following the `next` chain from offset 0.
pub fn scan_directory<R: Read + Seek>(rd: &mut TagReader<R>) -> Result<Vec<Tag>> {
    let mut directory = Vec::new();
    let mut pos = Some(0u64);
    while let Some(p) = pos {
        let tag = rd.header_at(p)?;
        pos = tag.next_pos();
        directory.push(tag);
    }
    Ok(directory)
}

/// Load the directory embedded by the writer, if the file has one.
///
/// The first tag must be `FIFF_FILE_ID` and the second `FIFF_DIR_POINTER`;
/// a non-positive pointer means no directory was written (MNE's raw writer
/// leaves it at -1).
pub fn embedded_directory<R: Read + Seek>(rd: &mut TagReader<R>) -> Result<Option<Vec<Tag>>> {
    let id = rd.header_at(0)?;
    if id.kind != FIFF_FILE_ID {
        bail!("not a FIF file: first tag is {} (expected FIFF_FILE_ID)", id.kind);
    }
    let Some(next) = id.next_pos() else { return Ok(None) };
    let ptr = rd.header_at(next)?;
    if ptr.kind != FIFF_DIR_POINTER {
        return Ok(None);
    }
    let dirpos = rd.i32(&ptr)?;
    if dirpos <= 0 {
        return Ok(None);
    }
    let dir = rd.header_at(dirpos as u64)?;
    if dir.ftype != FIFFT_DIR_ENTRY_STRUCT {
        return Ok(None);
    }
    rd.directory(&dir).map(Some)
}

/// Embedded directory if present, otherwise a full scan.
pub fn load_directory<R: Read + Seek>(rd: &mut TagReader<R>) -> Result<Vec<Tag>> {
    match embedded_directory(rd)? {
        Some(dir) => Ok(dir),
        None => scan_directory(rd),
    }
}
