//! Deduplicating string table
//!
//! Every string in an `.ir` payload is a `u32` index into this table. Index
//! 0 is the empty string and is never stored.

use rustc_hash::FxHashMap;

use super::bytes::{IrReader, IrWriter};
use super::format::SerializationError;

/// Largest number of stored strings a table may serialize.
pub const MAX_STRING_COUNT: usize = 16_777_215;

/// Largest encodable string, in bytes.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Bidirectional string <-> index map, insertion ordered.
#[derive(Debug, Clone)]
pub struct StringTable {
    /// Index -> string; slot 0 holds the reserved empty string.
    strings: Vec<String>,
    /// String -> index
    indices: FxHashMap<String, u32>,
    /// Calls to `add_string`, including repeats and empty strings.
    seen: u64,
    /// Bytes the seen strings would take inline (u16 length + UTF-8).
    inline_bytes: u64,
}

/// Table statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringTableStats {
    pub strings_seen: u64,
    /// Distinct non-empty strings stored.
    pub strings_stored: usize,
    pub duplicates: u64,
    /// `duplicates / strings_seen`
    pub dedup_ratio: f64,
    pub serialized_bytes: usize,
    pub inline_bytes: u64,
    /// `serialized_bytes / inline_bytes`; below 1.0 means the table saves space.
    pub compression_ratio: f64,
    pub longest_string: usize,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        Self {
            strings: vec![String::new()],
            indices: FxHashMap::default(),
            seen: 0,
            inline_bytes: 0,
        }
    }

    /// Intern `s`, returning its index. The same string always gets the
    /// same index; the empty string is always 0.
    pub fn add_string(&mut self, s: &str) -> u32 {
        self.seen += 1;
        self.inline_bytes += 2 + s.len() as u64;
        if s.is_empty() {
            return 0;
        }
        if let Some(&index) = self.indices.get(s) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.indices.insert(s.to_string(), index);
        index
    }

    /// Look up a string by index.
    ///
    /// Errors carry offset 0; readers relocate them to the referencing byte.
    pub fn get_string(&self, index: u32) -> Result<&str, SerializationError> {
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or(SerializationError::IndexOutOfRange {
                index,
                len: self.strings.len(),
                offset: 0,
            })
    }

    /// Index of an already interned string.
    pub fn index_of(&self, s: &str) -> Option<u32> {
        if s.is_empty() {
            return Some(0);
        }
        self.indices.get(s).copied()
    }

    /// Number of entries, including the reserved empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() == 1
    }

    /// Stored strings in index order, excluding the reserved empty string.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().skip(1).map(String::as_str)
    }

    /// Size of the serialized table in bytes.
    pub fn encoded_size(&self) -> usize {
        4 + self.iter().map(|s| 2 + s.len()).sum::<usize>()
    }

    pub fn stats(&self) -> StringTableStats {
        let stored = self.strings.len() - 1;
        // Empty strings are seen but never stored, so they count as repeats
        let duplicates = self.seen.saturating_sub(stored as u64);
        let serialized_bytes = self.encoded_size();
        StringTableStats {
            strings_seen: self.seen,
            strings_stored: stored,
            duplicates,
            dedup_ratio: ratio(duplicates as f64, self.seen as f64),
            serialized_bytes,
            inline_bytes: self.inline_bytes,
            compression_ratio: ratio(serialized_bytes as f64, self.inline_bytes as f64),
            longest_string: self.iter().map(str::len).max().unwrap_or(0),
        }
    }

    /// Write the table: `u32 count` then `count` entries of
    /// `u16 byte_len` + UTF-8 bytes.
    pub fn encode(&self, writer: &mut IrWriter) -> Result<(), SerializationError> {
        let count = self.strings.len() - 1;
        if count > MAX_STRING_COUNT {
            return Err(SerializationError::StringCountOverflow {
                count,
                offset: writer.offset(),
            });
        }
        writer.emit_u32(count as u32);
        for (index, s) in self.strings.iter().enumerate().skip(1) {
            if s.len() > MAX_STRING_LEN {
                return Err(SerializationError::StringTooLong {
                    index: index as u32,
                    len: s.len(),
                    offset: writer.offset(),
                });
            }
            writer.emit_u16(s.len() as u16);
            writer.emit_bytes(s.as_bytes());
        }
        Ok(())
    }

    /// Read a table written by [`StringTable::encode`].
    ///
    /// A decoded table has no insertion history: every stored string counts
    /// as seen once.
    pub fn decode(reader: &mut IrReader<'_>) -> Result<Self, SerializationError> {
        let count_offset = reader.position();
        let count = reader.read_u32()? as usize;
        if count > MAX_STRING_COUNT {
            return Err(SerializationError::StringCountOverflow {
                count,
                offset: count_offset,
            });
        }

        let mut table = StringTable::new();
        // Each entry needs at least its two length bytes
        let capacity = count.min(reader.remaining() / 2);
        table.strings.reserve(capacity);
        table.indices.reserve(capacity);

        for i in 0..count {
            let index = (i + 1) as u32;
            let entry_offset = reader.position();
            let len = reader
                .read_u16()
                .map_err(|_| SerializationError::CorruptStringEntry {
                    index,
                    offset: entry_offset,
                })? as usize;
            let bytes = reader
                .read_bytes(len)
                .map_err(|_| SerializationError::CorruptStringEntry {
                    index,
                    offset: entry_offset,
                })?;
            let s = std::str::from_utf8(bytes).map_err(|_| SerializationError::InvalidUtf8 {
                offset: entry_offset + 2,
            })?;
            if s.is_empty() {
                return Err(SerializationError::CorruptStringEntry {
                    index,
                    offset: entry_offset,
                });
            }
            table.seen += 1;
            table.inline_bytes += 2 + len as u64;
            table.indices.entry(s.to_string()).or_insert(index);
            table.strings.push(s.to_string());
        }
        Ok(table)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
