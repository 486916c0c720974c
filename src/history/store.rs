use crate::config::HistoryConfig;
use crate::error::{ConsoleError, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
pub const DEFAULT_HISTORY_DIR: &str = ".querysh";
pub const DEFAULT_HISTORY_FILE: &str = "history.txt";

const FIELD_SEPARATOR: char = '|';

/// Reads a timestamp written with `format`. Date-only formats resolve to midnight.
pub fn parse_timestamp(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Loads the statements of `path` that are younger than `retention_days` whole days at `now`.
///
/// The file and its parent directory are created when missing; failing to create
/// them is only logged; the subsequent open reports the real error. Lines that
/// cannot be parsed are skipped.
pub fn load_history(
    path: &Path,
    date_format: &str,
    now: NaiveDateTime,
    retention_days: i64,
) -> Result<Vec<String>> {
    ensure_history_file(path);

    debug!(path = %path.display(), "Retrieving history");
    let mut reader = BufReader::new(File::open(path)?);

    let mut statements = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\n', '\r']),
            Err(e) => {
                warn!(path = %path.display(), line = line_no, error = %e, "History line is not valid UTF-8");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some((timestamp, statement)) = line.split_once(FIELD_SEPARATOR) else {
            warn!(path = %path.display(), line = line_no, "History line has no timestamp separator");
            continue;
        };

        let Some(saved_at) = parse_timestamp(timestamp, date_format) else {
            warn!(
                path = %path.display(),
                line = line_no,
                timestamp = %timestamp,
                "Cannot parse history date"
            );
            continue;
        };

        if (now - saved_at).num_days() < retention_days {
            statements.push(statement.to_string());
        }
    }

    info!(path = %path.display(), entries = statements.len(), "History retrieved");
    Ok(statements)
}

/// Appends every entry to `path`, stamped with `now`. Line breaks inside a
/// statement are folded into spaces so each entry stays on one line.
pub fn save_history<S: AsRef<str>>(
    path: &Path,
    date_format: &str,
    entries: &[S],
    now: NaiveDateTime,
) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);

    let mut stamp = String::new();
    fmt::Write::write_fmt(&mut stamp, format_args!("{}", now.format(date_format))).map_err(|_| {
        ConsoleError::Config(format!("invalid history date format '{}'", date_format))
    })?;
    for entry in entries {
        writer.write_all(stamp.as_bytes())?;
        write!(writer, "{}", FIELD_SEPARATOR)?;
        writer.write_all(single_line(entry.as_ref()).as_bytes())?;
        writer.write_all(crate::LINE_SEPARATOR.as_bytes())?;
    }
    writer.flush()?;

    debug!(path = %path.display(), entries = entries.len(), "History saved");
    Ok(())
}

fn single_line(statement: &str) -> String {
    if !statement.contains(['\n', '\r']) {
        return statement.to_string();
    }
    statement
        .split(['\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ensure_history_file(path: &Path) {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(dir) {
                error!(dir = %dir.display(), error = %e, "Cannot create history directory");
            }
        }
    }
    if !path.exists() {
        if let Err(e) = OpenOptions::new().create(true).append(true).open(path) {
            error!(path = %path.display(), error = %e, "Cannot create history file");
        }
    }
}

/// A history file together with the format and retention used to read and write it.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    date_format: String,
    retention_days: i64,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    /// `None` when history is disabled or no home directory is known.
    pub fn from_config(config: &HistoryConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let path = config.history_path()?;
        Some(
            Self::new(path)
                .with_date_format(config.date_format.clone())
                .with_retention_days(config.retention_days),
        )
    }

    /// `~/.querysh/history.txt`, when a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_HISTORY_DIR).join(DEFAULT_HISTORY_FILE))
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn with_retention_days(mut self, retention_days: i64) -> Self {
        self.retention_days = retention_days;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    pub fn load(&self, now: NaiveDateTime) -> Result<Vec<String>> {
        load_history(&self.path, &self.date_format, now, self.retention_days)
    }

    pub fn load_now(&self) -> Result<Vec<String>> {
        self.load(Local::now().naive_local())
    }

    pub fn save<S: AsRef<str>>(&self, entries: &[S], now: NaiveDateTime) -> Result<()> {
        save_history(&self.path, &self.date_format, entries, now)
    }

    pub fn save_now<S: AsRef<str>>(&self, entries: &[S]) -> Result<()> {
        self.save(entries, Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_timestamp_with_time_and_date_only() {
        assert_eq!(
            parse_timestamp("15/01/2024 10:00:00", DEFAULT_DATE_FORMAT),
            Some(at(2024, 1, 15, 10))
        );
        assert_eq!(
            parse_timestamp("2024-01-15", "%Y-%m-%d"),
            Some(at(2024, 1, 15, 0))
        );
        assert_eq!(parse_timestamp("yesterday", DEFAULT_DATE_FORMAT), None);
    }

    #[test]
    fn test_load_creates_missing_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.txt");

        let entries = load_history(&path, DEFAULT_DATE_FORMAT, at(2024, 1, 15, 0), 30).unwrap();

        assert!(entries.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_load_applies_retention_window() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        let now = at(2024, 3, 1, 12);
        let fmt = DEFAULT_DATE_FORMAT;

        let just_inside = now - Duration::days(30) + Duration::hours(1);
        let on_boundary = now - Duration::days(30);
        let old = now - Duration::days(45);
        write_lines(
            &path,
            &[
                format!("{}|SELECT 1", old.format(fmt)),
                format!("{}|SELECT 2", on_boundary.format(fmt)),
                format!("{}|SELECT 3", just_inside.format(fmt)),
                format!("{}|SELECT 4", now.format(fmt)),
            ],
        );

        let entries = load_history(&path, fmt, now, 30).unwrap();
        assert_eq!(entries, vec!["SELECT 3", "SELECT 4"]);
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        write_lines(
            &path,
            &[
                "01/03/2024 10:00:00|USE app;",
                "not a date|SELECT broken;",
                "no separator at all",
                "",
                "01/03/2024 11:00:00|SELECT * FROM users;",
            ],
        );

        let entries = load_history(&path, DEFAULT_DATE_FORMAT, at(2024, 3, 2, 0), 30).unwrap();
        assert_eq!(entries, vec!["USE app;", "SELECT * FROM users;"]);
    }

    #[test]
    fn test_load_skips_line_with_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        let mut content = b"10/03/2024 10:00:00|SELECT 1;\n".to_vec();
        content.extend_from_slice(b"10/03/2024 10:30:00|SELECT \xff\xfe;\r\n");
        content.extend_from_slice(b"10/03/2024 11:00:00|SELECT 3;\r\n");
        content.extend_from_slice(b"10/03/2024 11:30:00|SELECT 4;");
        fs::write(&path, content).unwrap();

        let entries = load_history(&path, DEFAULT_DATE_FORMAT, at(2024, 3, 10, 12), 30).unwrap();
        assert_eq!(entries, vec!["SELECT 1;", "SELECT 3;", "SELECT 4;"]);
    }

    #[test]
    fn test_load_keeps_pipes_in_statement() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        write_lines(&path, &["01/03/2024 10:00:00|SELECT a || b FROM t;"]);

        let entries = load_history(&path, DEFAULT_DATE_FORMAT, at(2024, 3, 1, 11), 30).unwrap();
        assert_eq!(entries, vec!["SELECT a || b FROM t;"]);
    }

    #[test]
    fn test_save_appends_stamped_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        write_lines(&path, &["01/01/2024 00:00:00|OLD;"]);

        save_history(
            &path,
            DEFAULT_DATE_FORMAT,
            &["SELECT 1;", "SELECT\n  2;"],
            at(2024, 3, 1, 9),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "01/01/2024 00:00:00|OLD;",
                "01/03/2024 09:00:00|SELECT 1;",
                "01/03/2024 09:00:00|SELECT   2;",
            ]
        );
    }

    #[test]
    fn test_save_fails_when_directory_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("history.txt");
        let result = save_history(&path, DEFAULT_DATE_FORMAT, &["SELECT 1;"], at(2024, 3, 1, 9));
        assert!(matches!(result, Err(crate::error::ConsoleError::Io(_))));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.txt"))
            .with_date_format("%Y-%m-%dT%H:%M:%S")
            .with_retention_days(7);

        let saved_at = at(2024, 5, 10, 8);
        store
            .save(&["CREATE CATALOG app;", "USE app;"], saved_at)
            .unwrap();

        let loaded = store.load(saved_at + Duration::days(2)).unwrap();
        assert_eq!(loaded, vec!["CREATE CATALOG app;", "USE app;"]);

        let expired = store.load(saved_at + Duration::days(7)).unwrap();
        assert!(expired.is_empty());
    }
}
