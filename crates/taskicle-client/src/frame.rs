//! Binary framing used by the page content endpoints
//!
//! A frame is a fixed 36-byte little-endian header followed by the content.
//! Content of 512 bytes or more travels gzip-compressed, and the checksum
//! covers the bytes as sent.
//!
//! ```text
//! magic u32 | page_id i32 | is_draft u32 | compressed u32 | page_type u32
//! crc32 u32 | content_len u32 | r i32 | r2 u32 | content...
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use taskicle_core::ApiResultCode;

/// Marker opening every request frame
pub const FRAME_MAGIC: u32 = 0xDEAD_BEEF;

/// Size of the fixed header
pub const HEADER_LEN: usize = 36;

/// Content at or above this size is compressed
const COMPRESS_THRESHOLD: usize = 512;

/// Format of the page body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageType {
    #[default]
    Markdown,
}

impl PageType {
    const fn value(self) -> u32 {
        match self {
            Self::Markdown => 1,
        }
    }

    const fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Malformed page frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame of {0} bytes is shorter than its header")]
    Truncated(usize),

    #[error("bad frame magic {0:#010x}")]
    BadMagic(u32),

    #[error("negative page id {0}")]
    NegativePageId(i32),

    #[error("invalid draft flag {0}")]
    InvalidDraftFlag(u32),

    #[error("unknown page type {0}")]
    UnknownPageType(u32),

    #[error("content length {declared} exceeds the {available} bytes after the header")]
    LengthMismatch { declared: usize, available: usize },

    #[error("content checksum mismatch")]
    ChecksumMismatch,

    #[error("content too large for a frame")]
    TooLarge,

    #[error("gzip failed: {0}")]
    Gzip(String),
}

/// Save request as carried to `/api/page_save`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFrame {
    pub page_id: i32,
    /// Store as draft instead of creating a version
    pub is_draft: bool,
    pub page_type: PageType,
    /// Uncompressed content
    pub content: Bytes,
}

/// Content answer from `/api/page_load` and `/api/page_version_content`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFrame {
    pub r: ApiResultCode,
    pub r2: u32,
    /// Uncompressed content, empty on failure
    pub content: Bytes,
}

#[derive(Debug, Clone, Copy, Default)]
struct Header {
    magic: u32,
    page_id: i32,
    is_draft: u32,
    compressed: u32,
    page_type: u32,
    crc32: u32,
    content_len: u32,
    r: i32,
    r2: u32,
}

impl Header {
    fn read(mut buf: &[u8]) -> Result<Self, FrameError> {
        if buf.len() < HEADER_LEN {
            return Err(FrameError::Truncated(buf.len()));
        }

        Ok(Self {
            magic: buf.get_u32_le(),
            page_id: buf.get_i32_le(),
            is_draft: buf.get_u32_le(),
            compressed: buf.get_u32_le(),
            page_type: buf.get_u32_le(),
            crc32: buf.get_u32_le(),
            content_len: buf.get_u32_le(),
            r: buf.get_i32_le(),
            r2: buf.get_u32_le(),
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.magic);
        buf.put_i32_le(self.page_id);
        buf.put_u32_le(self.is_draft);
        buf.put_u32_le(self.compressed);
        buf.put_u32_le(self.page_type);
        buf.put_u32_le(self.crc32);
        buf.put_u32_le(self.content_len);
        buf.put_i32_le(self.r);
        buf.put_u32_le(self.r2);
    }
}

impl SaveFrame {
    pub fn new(page_id: i32, is_draft: bool, content: impl Into<Bytes>) -> Self {
        Self {
            page_id,
            is_draft,
            page_type: PageType::Markdown,
            content: content.into(),
        }
    }

    /// Serialize into a request body
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        let header = Header {
            magic: FRAME_MAGIC,
            page_id: self.page_id,
            is_draft: u32::from(self.is_draft),
            page_type: self.page_type.value(),
            ..Header::default()
        };
        write_frame(header, &self.content)
    }

    /// Parse and validate a request body
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        let header = Header::read(frame)?;

        if header.magic != FRAME_MAGIC {
            return Err(FrameError::BadMagic(header.magic));
        }
        if header.page_id < 0 {
            return Err(FrameError::NegativePageId(header.page_id));
        }
        let is_draft = match header.is_draft {
            0 => false,
            1 => true,
            other => return Err(FrameError::InvalidDraftFlag(other)),
        };
        let page_type = PageType::from_value(header.page_type).ok_or(FrameError::UnknownPageType(header.page_type))?;

        Ok(Self {
            page_id: header.page_id,
            is_draft,
            page_type,
            content: read_content(&header, frame)?,
        })
    }
}

impl ContentFrame {
    pub fn ok(content: impl Into<Bytes>) -> Self {
        Self {
            r: ApiResultCode::Ok,
            r2: 0,
            content: content.into(),
        }
    }

    pub fn failure(r: ApiResultCode, r2: u32) -> Self {
        Self {
            r,
            r2,
            content: Bytes::new(),
        }
    }

    /// Serialize into a response body
    ///
    /// Response headers leave the magic, page id and type zeroed.
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        let r = i32::try_from(self.r.code()).map_err(|_| FrameError::TooLarge)?;
        let header = Header {
            r,
            r2: self.r2,
            ..Header::default()
        };
        write_frame(header, &self.content)
    }

    /// Parse a response body
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        let header = Header::read(frame)?;

        Ok(Self {
            r: ApiResultCode::from(i64::from(header.r)),
            r2: header.r2,
            content: read_content(&header, frame)?,
        })
    }
}

fn write_frame(mut header: Header, content: &[u8]) -> Result<Bytes, FrameError> {
    let payload = if content.len() >= COMPRESS_THRESHOLD {
        header.compressed = 1;
        Bytes::from(gzip(content)?)
    } else {
        Bytes::copy_from_slice(content)
    };

    header.content_len = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge)?;
    header.crc32 = if payload.is_empty() { 0 } else { crc32fast::hash(&payload) };

    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    header.write(&mut buf);
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

fn read_content(header: &Header, frame: &[u8]) -> Result<Bytes, FrameError> {
    let body = &frame[HEADER_LEN..];
    let declared = usize::try_from(header.content_len).map_err(|_| FrameError::TooLarge)?;

    if body.len() < declared {
        return Err(FrameError::LengthMismatch {
            declared,
            available: body.len(),
        });
    }
    if declared == 0 {
        return Ok(Bytes::new());
    }

    let payload = &body[..declared];
    if crc32fast::hash(payload) != header.crc32 {
        return Err(FrameError::ChecksumMismatch);
    }

    if header.compressed == 0 {
        Ok(Bytes::copy_from_slice(payload))
    } else {
        gunzip(payload).map(Bytes::from)
    }
}

fn gzip(content: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).map_err(|e| FrameError::Gzip(e.to_string()))?;
    encoder.finish().map_err(|e| FrameError::Gzip(e.to_string()))
}

fn gunzip(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut content = Vec::new();
    GzDecoder::new(payload)
        .read_to_end(&mut content)
        .map_err(|e| FrameError::Gzip(e.to_string()))?;
    Ok(content)
}
