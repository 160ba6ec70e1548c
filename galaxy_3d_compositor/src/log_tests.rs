//! Unit tests for log.rs
//!
//! Tests LogSeverity, DefaultLogger formatting, MemoryLogger capture and
//! the error-building macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger};
use crate::error::Error;
use std::time::SystemTime;

fn create_entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_u8_roundtrip() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(LogSeverity::from_u8(severity.as_u8()), severity);
    }
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_format_plain() {
    let entry = create_entry(LogSeverity::Warn, "vertex layout mismatch");
    let line = DefaultLogger::format_plain(&entry);
    assert!(line.contains("[WARN ]"));
    assert!(line.contains("[galaxy3d::test]"));
    assert!(line.ends_with("vertex layout mismatch"));
}

#[test]
fn test_default_logger_format_with_location() {
    let mut entry = create_entry(LogSeverity::Error, "boom");
    entry.file = Some("render_context.rs");
    entry.line = Some(42);
    let line = DefaultLogger::format_plain(&entry);
    assert!(line.ends_with("boom (render_context.rs:42)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    DefaultLogger.log(&create_entry(LogSeverity::Info, "hello"));
}

// ============================================================================
// MEMORY LOGGER TESTS
// ============================================================================

#[test]
fn test_memory_logger_captures_entries() {
    let logger = MemoryLogger::new();
    logger.log(&create_entry(LogSeverity::Info, "first"));
    logger.log(&create_entry(LogSeverity::Error, "second"));

    let entries = logger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first");
    assert_eq!(entries[1].severity, LogSeverity::Error);
}

#[test]
fn test_memory_logger_clones_share_buffer() {
    let logger = MemoryLogger::new();
    let reader = logger.clone();
    logger.log(&create_entry(LogSeverity::Debug, "shared"));
    assert_eq!(reader.entries().len(), 1);
}

#[test]
fn test_memory_logger_capacity_drops_oldest() {
    let logger = MemoryLogger::with_capacity(2);
    logger.log(&create_entry(LogSeverity::Info, "a"));
    logger.log(&create_entry(LogSeverity::Info, "b"));
    logger.log(&create_entry(LogSeverity::Info, "c"));

    let messages: Vec<String> = logger.entries().into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn test_memory_logger_find_filters_by_severity() {
    let logger = MemoryLogger::new();
    logger.log(&create_entry(LogSeverity::Trace, "skipped object 1"));
    logger.log(&create_entry(LogSeverity::Warn, "skipped object 2"));

    assert_eq!(logger.find(LogSeverity::Warn, "skipped").len(), 1);
    assert_eq!(logger.find(LogSeverity::Trace, "skipped").len(), 2);
}

#[test]
fn test_memory_logger_clear() {
    let logger = MemoryLogger::new();
    logger.log(&create_entry(LogSeverity::Info, "x"));
    logger.clear();
    assert!(logger.entries().is_empty());
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
fn test_engine_err_defaults_to_backend_error() {
    let err = crate::engine_err!("galaxy3d::test", "device {} lost", 3);
    assert_eq!(err, Error::BackendError("device 3 lost".to_string()));
}

#[test]
fn test_engine_err_with_variant() {
    let err = crate::engine_err!("galaxy3d::test", Configuration => "pass '{}' invalid", "opaque");
    assert_eq!(err, Error::Configuration("pass 'opaque' invalid".to_string()));
}

#[test]
fn test_engine_bail_returns_error() {
    fn fails(flag: bool) -> crate::error::Result<u32> {
        if flag {
            crate::engine_bail!("galaxy3d::test", InvalidResource => "bad input {}", 7);
        }
        Ok(1)
    }
    assert_eq!(fails(false), Ok(1));
    assert_eq!(fails(true), Err(Error::InvalidResource("bad input 7".to_string())));
}
