//! Capture log reader
//!
//! Reads `.mocap` files with automatic decompression and integrity
//! checking.

use byteorder::{LittleEndian, ReadBytesExt};
use lz4_flex::decompress_size_prepended;
use std::io::{self, Read};

use crate::action::{Action, ActionRecord, BlockPos, ItemPayload};
use crate::binary::{LOG_MAGIC, LOG_VERSION, LogFlags, LogMetadata, MAX_BLOCK_SIZE, MAX_PAYLOAD_SIZE, kind};
use crate::log::ActionLog;

/// Reader for the binary capture log format
pub struct BinaryReader<R: Read> {
    reader: R,
}

impl<R: Read> BinaryReader<R> {
    /// Create a new binary reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a complete log from the input
    pub fn read_log(&mut self) -> io::Result<(ActionLog, LogMetadata)> {
        let (flags, record_count) = self.read_header()?;
        let meta = self.read_metadata()?;

        let block_len = self.reader.read_u32::<LittleEndian>()? as usize;
        if block_len > MAX_BLOCK_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "record block exceeds MAX_BLOCK_SIZE",
            ));
        }
        let mut block = vec![0u8; block_len];
        self.reader.read_exact(&mut block)?;

        let raw = if flags.contains(LogFlags::COMPRESSED_RECORDS) {
            decompress_size_prepended(&block)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        } else {
            block
        };

        let expected = self.reader.read_u64::<LittleEndian>()?;
        if xxhash_rust::xxh3::xxh3_64(&raw) != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "record block checksum mismatch",
            ));
        }

        let records = decode_records(&raw, record_count)?;
        Ok((ActionLog::from_records(&meta.name, records), meta))
    }

    /// Read the 20-byte header
    fn read_header(&mut self) -> io::Result<(LogFlags, u64)> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if magic != LOG_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "not a capture log file",
            ));
        }

        let version = self.reader.read_u32::<LittleEndian>()?;
        if version != LOG_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported capture log version {}", version),
            ));
        }

        let flags = LogFlags::from_bits_truncate(self.reader.read_u8()?);
        let mut reserved = [0u8; 3];
        self.reader.read_exact(&mut reserved)?;
        let record_count = self.reader.read_u64::<LittleEndian>()?;

        Ok((flags, record_count))
    }

    /// Read the JSON metadata section
    fn read_metadata(&mut self) -> io::Result<LogMetadata> {
        let len = self.reader.read_u32::<LittleEndian>()? as usize;
        if len > MAX_PAYLOAD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "metadata section exceeds MAX_PAYLOAD_SIZE",
            ));
        }
        let mut json = vec![0u8; len];
        self.reader.read_exact(&mut json)?;
        serde_json::from_slice(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn decode_records(raw: &[u8], record_count: u64) -> io::Result<Vec<ActionRecord>> {
    let mut cursor = io::Cursor::new(raw);
    let mut records = Vec::new();
    let mut last_tick = 0u64;

    for _ in 0..record_count {
        let record = decode_record(&mut cursor)?;
        if record.tick < last_tick {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "record ticks out of order",
            ));
        }
        last_tick = record.tick;
        records.push(record);
    }

    if cursor.position() != raw.len() as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "trailing bytes after final record",
        ));
    }

    Ok(records)
}

fn decode_blob(cursor: &mut io::Cursor<&[u8]>) -> io::Result<Vec<u8>> {
    let len = cursor.read_u32::<LittleEndian>()? as usize;
    if len > MAX_PAYLOAD_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "payload exceeds MAX_PAYLOAD_SIZE",
        ));
    }
    let mut bytes = vec![0u8; len];
    cursor.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn decode_record(cursor: &mut io::Cursor<&[u8]>) -> io::Result<ActionRecord> {
    let tick = cursor.read_u64::<LittleEndian>()?;
    let tag = cursor.read_u8()?;

    let action = match tag {
        kind::CHAT => {
            let bytes = decode_blob(cursor)?;
            let message = String::from_utf8(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            Action::Chat { message }
        }
        kind::SWIPE => Action::Swipe,
        kind::EQUIP => {
            let slot = cursor.read_u8()?;
            let item = match cursor.read_u8()? {
                0 => None,
                1 => Some(ItemPayload::from_bytes(decode_blob(cursor)?)),
                other => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid equip payload marker {}", other),
                    ));
                }
            };
            Action::Equip { slot, item }
        }
        kind::DROP => Action::Drop {
            item: ItemPayload::from_bytes(decode_blob(cursor)?),
        },
        kind::SHOOT_ARROW => Action::ShootArrow {
            charge: cursor.read_u8()?,
        },
        kind::PLACE_BLOCK => {
            let item = ItemPayload::from_bytes(decode_blob(cursor)?);
            let x = cursor.read_i32::<LittleEndian>()?;
            let y = cursor.read_i32::<LittleEndian>()?;
            let z = cursor.read_i32::<LittleEndian>()?;
            Action::PlaceBlock {
                item,
                position: BlockPos::new(x, y, z),
            }
        }
        kind::POSE => {
            let x = cursor.read_f64::<LittleEndian>()?;
            let y = cursor.read_f64::<LittleEndian>()?;
            let z = cursor.read_f64::<LittleEndian>()?;
            let yaw = cursor.read_f32::<LittleEndian>()?;
            let pitch = cursor.read_f32::<LittleEndian>()?;
            Action::Pose {
                position: glam::DVec3::new(x, y, z),
                yaw,
                pitch,
            }
        }
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown record kind {}", other),
            ));
        }
    };

    Ok(ActionRecord { tick, action })
}
