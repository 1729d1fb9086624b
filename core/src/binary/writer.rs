//! Capture log writer
//!
//! Writes `.mocap` files with optional record-block compression.

use byteorder::{LittleEndian, WriteBytesExt};
use lz4_flex::compress_prepend_size;
use std::io::{self, Write};

use crate::action::{Action, ActionRecord};
use crate::binary::{LOG_MAGIC, LOG_VERSION, LogFlags, LogMetadata, kind};
use crate::log::ActionLog;

/// Writer for the binary capture log format
pub struct BinaryWriter<W: Write> {
    writer: W,
}

impl<W: Write> BinaryWriter<W> {
    /// Create a new binary writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a complete log to the output
    pub fn write_log(
        &mut self,
        log: &ActionLog,
        meta: &LogMetadata,
        compress: bool,
    ) -> io::Result<()> {
        let mut flags = LogFlags::empty();
        if compress {
            flags |= LogFlags::COMPRESSED_RECORDS;
        }

        self.write_header(flags, log.len() as u64)?;
        self.write_metadata(meta)?;

        let mut raw = Vec::new();
        for record in log.iter() {
            encode_record(&mut raw, record);
        }
        let checksum = xxhash_rust::xxh3::xxh3_64(&raw);

        if compress {
            let compressed = compress_prepend_size(&raw);
            self.writer
                .write_u32::<LittleEndian>(compressed.len() as u32)?;
            self.writer.write_all(&compressed)?;
        } else {
            self.writer.write_u32::<LittleEndian>(raw.len() as u32)?;
            self.writer.write_all(&raw)?;
        }

        self.writer.write_u64::<LittleEndian>(checksum)?;
        Ok(())
    }

    /// Write the 20-byte header
    fn write_header(&mut self, flags: LogFlags, record_count: u64) -> io::Result<()> {
        self.writer.write_all(&LOG_MAGIC)?;
        self.writer.write_u32::<LittleEndian>(LOG_VERSION)?;
        self.writer.write_u8(flags.bits())?;
        self.writer.write_all(&[0u8; 3])?; // reserved
        self.writer.write_u64::<LittleEndian>(record_count)?;
        Ok(())
    }

    /// Write the JSON metadata section
    fn write_metadata(&mut self, meta: &LogMetadata) -> io::Result<()> {
        let json =
            serde_json::to_vec(meta).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.writer.write_u32::<LittleEndian>(json.len() as u32)?;
        self.writer.write_all(&json)?;
        Ok(())
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn encode_blob(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn encode_record(buf: &mut Vec<u8>, record: &ActionRecord) {
    buf.extend_from_slice(&record.tick.to_le_bytes());

    match &record.action {
        Action::Chat { message } => {
            buf.push(kind::CHAT);
            encode_blob(buf, message.as_bytes());
        }
        Action::Swipe => {
            buf.push(kind::SWIPE);
        }
        Action::Equip { slot, item } => {
            buf.push(kind::EQUIP);
            buf.push(*slot);
            match item {
                Some(payload) => {
                    buf.push(1);
                    encode_blob(buf, payload.as_bytes());
                }
                None => buf.push(0),
            }
        }
        Action::Drop { item } => {
            buf.push(kind::DROP);
            encode_blob(buf, item.as_bytes());
        }
        Action::ShootArrow { charge } => {
            buf.push(kind::SHOOT_ARROW);
            buf.push(*charge);
        }
        Action::PlaceBlock { item, position } => {
            buf.push(kind::PLACE_BLOCK);
            encode_blob(buf, item.as_bytes());
            buf.extend_from_slice(&position.x.to_le_bytes());
            buf.extend_from_slice(&position.y.to_le_bytes());
            buf.extend_from_slice(&position.z.to_le_bytes());
        }
        Action::Pose {
            position,
            yaw,
            pitch,
        } => {
            buf.push(kind::POSE);
            buf.extend_from_slice(&position.x.to_le_bytes());
            buf.extend_from_slice(&position.y.to_le_bytes());
            buf.extend_from_slice(&position.z.to_le_bytes());
            buf.extend_from_slice(&yaw.to_le_bytes());
            buf.extend_from_slice(&pitch.to_le_bytes());
        }
    }
}
