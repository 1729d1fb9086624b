//! Integration tests for the record/replay engine
//!
//! Exercises the full capture -> persisted log -> playback pipeline and
//! the registry's cross-session guarantees.

#[cfg(test)]
mod playback_tests;
