//! Binary capture log format
//!
//! A `.mocap` file is a little-endian container: fixed header (magic,
//! version, flags, record count), a JSON metadata section, the record
//! block (optionally LZ4-compressed), and a trailing xxh3 checksum of the
//! uncompressed record bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// File magic for capture logs
pub const LOG_MAGIC: [u8; 4] = *b"MCAP";
/// Current format version
pub const LOG_VERSION: u32 = 1;

/// Upper bound for any length-prefixed blob (item payloads, chat lines,
/// metadata). Larger declared lengths are treated as corruption.
pub const MAX_PAYLOAD_SIZE: usize = 1 << 20;
/// Upper bound for the (possibly compressed) record block.
pub const MAX_BLOCK_SIZE: usize = 1 << 28;

bitflags::bitflags! {
    /// Capture log feature flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LogFlags: u8 {
        /// Record block is LZ4 compressed
        const COMPRESSED_RECORDS = 0b0000_0001;
    }
}

/// Metadata embedded in every capture log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMetadata {
    /// Log name (lowercased, matches the file stem)
    pub name: String,
    /// When the capture session started
    pub recorded_at: DateTime<Utc>,
    /// Sampling cadence of the capture worker
    pub sample_interval_ms: u64,
}

/// Wire tags for record kinds.
pub(crate) mod kind {
    pub const CHAT: u8 = 0;
    pub const SWIPE: u8 = 1;
    pub const EQUIP: u8 = 2;
    pub const DROP: u8 = 3;
    pub const SHOOT_ARROW: u8 = 4;
    pub const PLACE_BLOCK: u8 = 5;
    pub const POSE: u8 = 6;
}
