pub mod config;
pub mod error;
pub mod history;
pub mod manifest;
pub mod result;
pub mod shell;

/// Line separator used by every piece of console output and the history file.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

pub use config::{ConsoleConfig, HistoryConfig};
pub use error::{ConsoleError, Result};
pub use history::{load_history, save_history, HistoryStore};
pub use manifest::{
    parse_manifest, parse_manifest_file, ConnectorManifest, DataStoreManifest, Manifest,
    ManifestError, ManifestKind, ManifestParser, Operation,
};
pub use result::{
    render, ColumnMetadata, ErrorType, ExecutionResult, QueryResult, ResultSet, Row,
};
pub use shell::{
    InteractiveShell, ShellCommand, ShellOutcome, ShellSession, StatementExecutor,
    UnsupportedExecutor,
};
