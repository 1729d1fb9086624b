//! Capture log storage
//!
//! Durable save/load of finalized action logs. Writes go to a temp file
//! first and are renamed into place after `sync_all`, so a failed write
//! never corrupts a log that was already persisted under the same name.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::binary::{BinaryReader, BinaryWriter, LogMetadata};
use crate::log::ActionLog;

/// File extension for persisted capture logs
pub const LOG_EXTENSION: &str = "mocap";

/// Directory-backed store for `.mocap` files.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
    compress: bool,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>, compress: bool) -> Self {
        Self {
            dir: dir.into(),
            compress,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Path a log with `name` is (or would be) saved under.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name.to_lowercase(), LOG_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    /// Persist a finalized log, returning the path it was written to.
    pub fn save(&self, log: &ActionLog, meta: &LogMetadata) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(log.name());
        let tmp_path = match path.file_name() {
            Some(name) => {
                let mut tmp_name = OsString::from(name);
                tmp_name.push(".tmp");
                path.with_file_name(tmp_name)
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "log path has no file name",
                ));
            }
        };

        let mut out = Vec::new();
        BinaryWriter::new(&mut out).write_log(log, meta, self.compress)?;

        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(&out)?;
            f.sync_all()?;
        }

        #[cfg(windows)]
        {
            if path.exists() {
                // Windows rename fails if destination exists.
                fs::remove_file(&path)?;
            }
        }

        fs::rename(&tmp_path, &path)?;

        tracing::debug!(path = %path.display(), records = log.len(), "capture log saved");
        Ok(path)
    }

    /// Load a previously saved log by name.
    pub fn load(&self, name: &str) -> io::Result<(ActionLog, LogMetadata)> {
        let file = fs::File::open(self.path_for(name))?;
        BinaryReader::new(io::BufReader::new(file)).read_log()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ItemPayload};
    use chrono::TimeZone;

    fn meta_for(log: &ActionLog) -> LogMetadata {
        LogMetadata {
            name: log.name().to_string(),
            recorded_at: chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            sample_interval_ms: 50,
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path(), true);

        let mut log = ActionLog::new("ForestRun");
        log.append(
            5,
            Action::Chat {
                message: "hello".to_string(),
            },
        );
        log.append(
            10,
            Action::Drop {
                item: ItemPayload::from_bytes(vec![0xA, 0xE]),
            },
        );

        let path = store.save(&log, &meta_for(&log)).unwrap();
        assert_eq!(path, dir.path().join("forestrun.mocap"));
        assert!(store.exists("FORESTRUN"));

        let (loaded, meta) = store.load("forestrun").unwrap();
        assert_eq!(loaded, log);
        assert_eq!(meta.name, "forestrun");
    }

    #[test]
    fn test_failed_save_leaves_previous_file_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path(), false);

        let mut log = ActionLog::new("keep");
        log.append(1, Action::Swipe);
        store.save(&log, &meta_for(&log)).unwrap();

        // A store rooted at a path that is a regular file cannot write.
        let blocked = LogStore::new(dir.path().join("keep.mocap"), false);
        let mut log2 = ActionLog::new("keep");
        log2.append(2, Action::Swipe);
        assert!(blocked.save(&log2, &meta_for(&log2)).is_err());

        let (loaded, _) = store.load("keep").unwrap();
        assert_eq!(loaded, log);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path(), false);
        let err = store.load("nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
