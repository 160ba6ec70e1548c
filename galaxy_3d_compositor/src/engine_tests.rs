//! Unit tests for engine.rs
//!
//! The logger is process-wide, so every test touching it runs serially.

use crate::engine::Engine;
use crate::log::{LogSeverity, MemoryLogger};
use serial_test::serial;

#[test]
#[serial]
fn test_set_logger_routes_entries() {
    let capture = MemoryLogger::new();
    Engine::set_logger(capture.clone());
    Engine::set_min_severity(LogSeverity::Trace);

    Engine::log(LogSeverity::Info, "galaxy3d::test", "routed".to_string());

    assert_eq!(capture.find(LogSeverity::Info, "routed").len(), 1);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_records_location() {
    let capture = MemoryLogger::new();
    Engine::set_logger(capture.clone());
    Engine::set_min_severity(LogSeverity::Trace);

    crate::engine_error!("galaxy3d::test", "located {}", 1);

    let entries = capture.find(LogSeverity::Error, "located 1");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].file.is_some());
    assert!(entries[0].line.is_some());
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let capture = MemoryLogger::new();
    Engine::set_logger(capture.clone());
    Engine::set_min_severity(LogSeverity::Warn);

    crate::engine_debug!("galaxy3d::test", "filtered");
    crate::engine_warn!("galaxy3d::test", "kept");

    assert!(capture.find(LogSeverity::Trace, "filtered").is_empty());
    assert_eq!(capture.find(LogSeverity::Warn, "kept").len(), 1);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let capture = MemoryLogger::new();
    Engine::set_logger(capture.clone());
    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
    capture.clear();

    crate::engine_info!("galaxy3d::test", "not captured");
    assert!(capture.find(LogSeverity::Trace, "not captured").is_empty());
}
