//! Record models for pass-enc-bkp
//!
//! The two source shapes the backup merges: entries from the encrypted
//! password store and rows from the password-safe export.

pub mod pass_record;
pub mod safe_record;

pub use pass_record::PassRecord;
pub use safe_record::SafeRecord;
