//! Little-endian byte writer and bounds-checked reader.

use super::format::SerializationError;

/// Growable output buffer.
#[derive(Debug, Default)]
pub struct IrWriter {
    buffer: Vec<u8>,
}

impl IrWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Current offset (bytes written so far)
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn emit_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn emit_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn emit_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn emit_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }
}

/// Cursor over an input buffer. Every read is bounds checked.
#[derive(Debug, Clone)]
pub struct IrReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> IrReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Reader starting at `position`.
    pub fn at(buffer: &'a [u8], position: usize) -> Self {
        Self { buffer, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn has_more(&self) -> bool {
        self.position < self.buffer.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SerializationError> {
        if self.remaining() < len {
            return Err(SerializationError::UnexpectedEnd {
                needed: len - self.remaining(),
                offset: self.position,
            });
        }
        let bytes = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], SerializationError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, SerializationError> {
        Ok(self.take(1)?[0])
    }

    /// Read a `0`/`1` byte.
    pub fn read_bool(&mut self) -> Result<bool, SerializationError> {
        let offset = self.position;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerializationError::InvalidValue {
                what: "bool",
                value: other as u64,
                offset,
            }),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, SerializationError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerializationError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, SerializationError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, SerializationError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, SerializationError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SerializationError> {
        self.take(len)
    }
}
