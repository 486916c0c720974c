use chrono::{Duration, NaiveDate, NaiveDateTime};
use querysh::history::DEFAULT_DATE_FORMAT;
use querysh::{load_history, save_history, ConsoleConfig, HistoryStore};
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_save_then_load_keeps_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.txt");
    let now = at(2024, 3, 10, 12, 0);

    save_history(&path, DEFAULT_DATE_FORMAT, &["SELECT 1;", "USE app;"], now).unwrap();
    save_history(&path, DEFAULT_DATE_FORMAT, &["SELECT a | b FROM t;"], now).unwrap();

    let entries = load_history(&path, DEFAULT_DATE_FORMAT, now, 30).unwrap();
    assert_eq!(entries, vec!["SELECT 1;", "USE app;", "SELECT a | b FROM t;"]);
}

#[test]
fn test_retention_window_filters_old_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.txt");
    let now = at(2024, 3, 31, 12, 0);

    let old = now - Duration::days(30);
    let almost_old = now - Duration::days(30) + Duration::hours(1);
    save_history(&path, DEFAULT_DATE_FORMAT, &["too old"], old).unwrap();
    save_history(&path, DEFAULT_DATE_FORMAT, &["just in time"], almost_old).unwrap();
    save_history(&path, DEFAULT_DATE_FORMAT, &["today"], now).unwrap();

    let entries = load_history(&path, DEFAULT_DATE_FORMAT, now, 30).unwrap();
    assert_eq!(entries, vec!["just in time", "today"]);
}

#[test]
fn test_malformed_lines_are_logged_and_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.txt");
    fs::write(
        &path,
        "no separator here\nyesterday|SELECT 2;\n10/03/2024 11:00:00|SELECT 3;\n",
    )
    .unwrap();

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let entries = tracing::subscriber::with_default(subscriber, || {
        load_history(&path, DEFAULT_DATE_FORMAT, at(2024, 3, 10, 12, 0), 30).unwrap()
    });

    assert_eq!(entries, vec!["SELECT 3;"]);
    let output = logs.contents();
    assert!(output.contains("History line has no timestamp separator"), "{output}");
    assert!(output.contains("Cannot parse history date"), "{output}");
}

#[test]
fn test_store_from_config_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        "history:\n  dir: {}\n  retention_days: 7\n",
        dir.path().join("nested").join("state").display()
    );
    let config = ConsoleConfig::from_yaml_str(&yaml).unwrap();
    let store = HistoryStore::from_config(&config.history).unwrap();
    assert_eq!(store.retention_days(), 7);

    let entries = store.load(at(2024, 1, 1, 0, 0)).unwrap();
    assert!(entries.is_empty());
    assert!(store.path().exists());

    store.save(&["SELECT 1;"], at(2024, 1, 1, 0, 0)).unwrap();
    let entries = store.load(at(2024, 1, 7, 23, 59)).unwrap();
    assert_eq!(entries, vec!["SELECT 1;"]);
    let entries = store.load(at(2024, 1, 8, 0, 0)).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_disabled_history_has_no_store() {
    let config = ConsoleConfig::from_yaml_str("history:\n  enabled: false\n").unwrap();
    assert!(HistoryStore::from_config(&config.history).is_none());
}
