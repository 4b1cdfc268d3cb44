//! Export module for pass-enc-bkp
//!
//! Serializes merged records into the output buffer.

pub mod buffer;
pub mod csv;

pub use self::csv::{serialize_records, RecordWriter};
pub use buffer::OutputBuffer;
