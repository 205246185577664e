//! `.ir` container format: header constants, flags and errors.

use thiserror::Error;

use crate::ir::ConstructionError;

/// Magic number for `.ir` files: the bytes "FLIR" read little-endian.
pub const MAGIC: u32 = u32::from_le_bytes(*b"FLIR");

/// Current format version. Bumped on any incompatible change to tag
/// assignments or field order.
pub const FORMAT_VERSION: u16 = 1;

/// magic (u32) + version (u16) + flags (u16)
pub const HEADER_SIZE: usize = 8;

/// SHA-256 trailer length
pub const CHECKSUM_SIZE: usize = 32;

/// Deepest expression / statement / type / literal nesting either side of
/// the codec accepts. Decoding this deep fits in a 2 MiB thread stack.
pub const MAX_DEPTH: usize = 256;

/// Header flag bits
pub mod flags {
    /// SHA-256 trailer present
    pub const CHECKSUM: u16 = 1 << 0;
    /// Payload compressed (reserved, never written)
    pub const COMPRESSED: u16 = 1 << 1;
    /// Source locations and node metadata present
    pub const DEBUG_INFO: u16 = 1 << 2;

    /// Every flag this version understands
    pub const KNOWN: u16 = CHECKSUM | COMPRESSED | DEBUG_INFO;
}

/// Errors raised while reading or writing `.ir` data.
///
/// Every variant records the byte offset at which the problem was found.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    #[error(
        "invalid magic number {found:#010x} at offset {offset} (expected {expected:#010x})",
        expected = MAGIC
    )]
    InvalidMagic { found: u32, offset: usize },

    #[error("unsupported format version {found} at offset {offset} (supported: {supported})")]
    UnsupportedVersion {
        found: u16,
        supported: u16,
        offset: usize,
    },

    #[error("unsupported feature '{feature}' (flags {flags:#06x}) at offset {offset}")]
    UnsupportedFeature {
        feature: &'static str,
        flags: u16,
        offset: usize,
    },

    #[error("checksum mismatch at offset {offset}: stored {expected}, computed {actual}")]
    ChecksumMismatch {
        expected: String,
        actual: String,
        offset: usize,
    },

    #[error("unexpected end of data at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEnd { needed: usize, offset: usize },

    #[error("string index {index} out of range (table has {len} entries) at offset {offset}")]
    IndexOutOfRange {
        index: u32,
        len: usize,
        offset: usize,
    },

    #[error("corrupt string table entry {index} at offset {offset}")]
    CorruptStringEntry { index: u32, offset: usize },

    #[error("invalid UTF-8 in string table at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("string {index} is {len} bytes, exceeding the 65535 byte limit (offset {offset})")]
    StringTooLong {
        index: u32,
        len: usize,
        offset: usize,
    },

    #[error("string table holds {count} strings, exceeding the limit (offset {offset})")]
    StringCountOverflow { count: usize, offset: usize },

    #[error("unknown {context} tag {tag:#04x} at offset {offset}")]
    UnknownTag {
        tag: u8,
        context: &'static str,
        offset: usize,
    },

    #[error("invalid {what} value {value} at offset {offset}")]
    InvalidValue {
        what: &'static str,
        value: u64,
        offset: usize,
    },

    #[error("invalid node at offset {offset}: {source}")]
    InvalidNode {
        #[source]
        source: ConstructionError,
        offset: usize,
    },

    #[error("{count} trailing bytes after payload at offset {offset}")]
    TrailingBytes { count: usize, offset: usize },
}

impl SerializationError {
    /// Byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            SerializationError::InvalidMagic { offset, .. }
            | SerializationError::UnsupportedVersion { offset, .. }
            | SerializationError::UnsupportedFeature { offset, .. }
            | SerializationError::ChecksumMismatch { offset, .. }
            | SerializationError::UnexpectedEnd { offset, .. }
            | SerializationError::IndexOutOfRange { offset, .. }
            | SerializationError::CorruptStringEntry { offset, .. }
            | SerializationError::InvalidUtf8 { offset }
            | SerializationError::StringTooLong { offset, .. }
            | SerializationError::StringCountOverflow { offset, .. }
            | SerializationError::UnknownTag { offset, .. }
            | SerializationError::InvalidValue { offset, .. }
            | SerializationError::InvalidNode { offset, .. }
            | SerializationError::TrailingBytes { offset, .. } => *offset,
        }
    }

    /// Same error, reported at `offset`.
    pub(crate) fn at(mut self, at: usize) -> Self {
        match &mut self {
            SerializationError::InvalidMagic { offset, .. }
            | SerializationError::UnsupportedVersion { offset, .. }
            | SerializationError::UnsupportedFeature { offset, .. }
            | SerializationError::ChecksumMismatch { offset, .. }
            | SerializationError::UnexpectedEnd { offset, .. }
            | SerializationError::IndexOutOfRange { offset, .. }
            | SerializationError::CorruptStringEntry { offset, .. }
            | SerializationError::InvalidUtf8 { offset }
            | SerializationError::StringTooLong { offset, .. }
            | SerializationError::StringCountOverflow { offset, .. }
            | SerializationError::UnknownTag { offset, .. }
            | SerializationError::InvalidValue { offset, .. }
            | SerializationError::InvalidNode { offset, .. }
            | SerializationError::TrailingBytes { offset, .. } => *offset = at,
        }
        self
    }
}

/// Writer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Append a SHA-256 trailer.
    pub checksum: bool,
    /// Write source locations and node metadata.
    pub debug_info: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            checksum: true,
            debug_info: true,
        }
    }
}

impl WriteOptions {
    pub fn flags(&self) -> u16 {
        let mut bits = 0;
        if self.checksum {
            bits |= flags::CHECKSUM;
        }
        if self.debug_info {
            bits |= flags::DEBUG_INFO;
        }
        bits
    }
}

/// Decoded file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub flags: u16,
}

impl Header {
    pub fn has_checksum(&self) -> bool {
        self.flags & flags::CHECKSUM != 0
    }

    pub fn has_debug_info(&self) -> bool {
        self.flags & flags::DEBUG_INFO != 0
    }

    /// Parse and validate the header: magic, then version, then flags.
    pub fn parse(data: &[u8]) -> Result<Header, SerializationError> {
        let magic = read_u32_at(data, 0)?;
        if magic != MAGIC {
            return Err(SerializationError::InvalidMagic {
                found: magic,
                offset: 0,
            });
        }

        let version = read_u16_at(data, 4)?;
        if version != FORMAT_VERSION {
            return Err(SerializationError::UnsupportedVersion {
                found: version,
                supported: FORMAT_VERSION,
                offset: 4,
            });
        }

        let bits = read_u16_at(data, 6)?;
        if bits & flags::COMPRESSED != 0 {
            return Err(SerializationError::UnsupportedFeature {
                feature: "compressed payload",
                flags: bits,
                offset: 6,
            });
        }
        if bits & !flags::KNOWN != 0 {
            return Err(SerializationError::UnsupportedFeature {
                feature: "unknown flag bits",
                flags: bits,
                offset: 6,
            });
        }

        Ok(Header {
            version,
            flags: bits,
        })
    }
}

fn read_u32_at(data: &[u8], offset: usize) -> Result<u32, SerializationError> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(SerializationError::UnexpectedEnd {
            needed: offset + 4 - data.len().min(offset + 4),
            offset: data.len().min(offset),
        }),
    }
}

fn read_u16_at(data: &[u8], offset: usize) -> Result<u16, SerializationError> {
    match data.get(offset..offset + 2) {
        Some(b) => Ok(u16::from_le_bytes([b[0], b[1]])),
        None => Err(SerializationError::UnexpectedEnd {
            needed: offset + 2 - data.len().min(offset + 2),
            offset: data.len().min(offset),
        }),
    }
}
