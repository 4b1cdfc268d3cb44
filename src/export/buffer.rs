//! In-memory output buffer
//!
//! Holds the serialized backup until it is flushed to disk. The contents are
//! either the plaintext CSV or, after encryption, ciphertext (raw or base64
//! text). Memory is zeroed on drop and whenever the contents are replaced.

use std::fmt;
use std::io::{self, Write};

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Accumulated backup bytes
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the length
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Replace the contents wholesale, zeroing the previous bytes
    pub fn replace(&mut self, bytes: Vec<u8>) {
        self.bytes.zeroize();
        self.bytes = bytes;
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AsRef<[u8]> for OutputBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// Don't print the contents in Debug output
impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}
