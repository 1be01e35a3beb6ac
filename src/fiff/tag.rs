//! FIFF tag I/O.
//!
//! Every tag is a 16-byte big-endian header followed by its payload:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │  kind : i32  │  type : u32  │  size : i32  │  next : i32  │
//! ├──────────────┴──────────────┴──────────────┴──────────────┤
//! │  <size bytes of payload>                                  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! `next == 0` means the following tag starts right after the payload,
//! `next > 0` is an absolute offset, and a negative value ends the chain.
use std::io::{Read, Seek, SeekFrom};
use anyhow::{bail, Context, Result};

use super::constants::*;

const HEADER_LEN: u64 = 16;

/// Tag header; the payload stays on disk until one of the
/// [`TagReader`] payload methods is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub kind:  i32,
    pub ftype: u32,
    pub size:  i32,
    pub next:  i32,
    /// Byte offset of the header.
    pub pos:   u64,
}

impl Tag {
    #[inline]
    pub fn data_pos(&self) -> u64 {
        self.pos + HEADER_LEN
    }

    /// Payload length in bytes; negative sizes read as empty.
    #[inline]
    pub fn len(&self) -> usize {
        self.size.max(0) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the following tag in the chain, if any.
    pub fn next_pos(&self) -> Option<u64> {
        match self.next {
            FIFFV_NEXT_SEQ => Some(self.data_pos() + self.len() as u64),
            n if n > 0 => Some(n as u64),
            _ => None,
        }
    }

    fn from_be(buf: &[u8; 16], pos: u64) -> Self {
        Tag {
            kind:  be_i32(&buf[0..4]),
            ftype: be_i32(&buf[4..8]) as u32,
            size:  be_i32(&buf[8..12]),
            next:  be_i32(&buf[12..16]),
            pos,
        }
    }
}

/// Random-access reader over a FIF byte stream.
pub struct TagReader<R> {
    inner: R,
}

impl<R: Read + Seek> TagReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the header at `pos`.
    pub fn header_at(&mut self, pos: u64) -> Result<Tag> {
        self.inner
            .seek(SeekFrom::Start(pos))
            .with_context(|| format!("seek to tag header @ {pos:#x}"))?;
        let mut buf = [0u8; 16];
        self.inner
            .read_exact(&mut buf)
            .with_context(|| format!("read tag header @ {pos:#x}"))?;
        Ok(Tag::from_be(&buf, pos))
    }

    /// Raw payload bytes.
    pub fn bytes(&mut self, tag: &Tag) -> Result<Vec<u8>> {
        self.seek_data(tag)?;
        let mut buf = vec![0u8; tag.len()];
        self.inner
            .read_exact(&mut buf)
            .with_context(|| format!("read {} payload bytes of tag {}", tag.len(), tag.kind))?;
        Ok(buf)
    }

    pub fn i32(&mut self, tag: &Tag) -> Result<i32> {
        let raw = self.scalar::<4>(tag)?;
        Ok(i32::from_be_bytes(raw))
    }

    /// A float payload, accepting both `FIFFT_FLOAT` and `FIFFT_DOUBLE`.
    pub fn f64(&mut self, tag: &Tag) -> Result<f64> {
        match tag.ftype {
            FIFFT_DOUBLE => Ok(f64::from_be_bytes(self.scalar::<8>(tag)?)),
            _ => Ok(f32::from_be_bytes(self.scalar::<4>(tag)?) as f64),
        }
    }

    /// Latin-1 string payload.
    pub fn string(&mut self, tag: &Tag) -> Result<String> {
        Ok(self.bytes(tag)?.into_iter().map(char::from).collect())
    }

    /// Entries of a `FIFFT_DIR_ENTRY_STRUCT` tag.  Each entry has the header
    /// layout, with the last field holding the file position of the tag.
    pub fn directory(&mut self, tag: &Tag) -> Result<Vec<Tag>> {
        if tag.ftype != FIFFT_DIR_ENTRY_STRUCT {
            bail!("expected FIFFT_DIR_ENTRY_STRUCT, got type {}", tag.ftype);
        }
        let raw = self.bytes(tag)?;
        Ok(raw
            .chunks_exact(16)
            .map(|e| Tag {
                kind:  be_i32(&e[0..4]),
                ftype: be_i32(&e[4..8]) as u32,
                size:  be_i32(&e[8..12]),
                next:  FIFFV_NEXT_NONE,
                pos:   be_i32(&e[12..16]) as u32 as u64,
            })
            .collect())
    }

    /// Position the underlying reader at the payload of `tag`.
    pub fn seek_data(&mut self, tag: &Tag) -> Result<&mut R> {
        self.inner
            .seek(SeekFrom::Start(tag.data_pos()))
            .with_context(|| format!("seek to tag data @ {:#x}", tag.data_pos()))?;
        Ok(&mut self.inner)
    }

    fn scalar<const N: usize>(&mut self, tag: &Tag) -> Result<[u8; N]> {
        if tag.len() < N {
            bail!("tag {} payload is {} bytes, need {N}", tag.kind, tag.len());
        }
        let mut buf = [0u8; N];
        self.seek_data(tag)?.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[inline]
pub(crate) fn be_i32(b: &[u8]) -> i32 {
    i32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
pub(crate) fn be_f32(b: &[u8]) -> f32 {
    f32::from_be_bytes([b[0], b[1], b[2], b[3]])
}
