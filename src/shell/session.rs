use super::commands::{ShellCommand, HELP_TEXT};
use crate::manifest::{ManifestError, ManifestKind, ManifestParser};
use crate::result::{ErrorType, ExecutionResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Runs statements the console does not handle itself.
pub trait StatementExecutor {
    fn execute(&mut self, statement: &str) -> ExecutionResult;
}

/// Executor for a console with no query engine attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedExecutor;

impl StatementExecutor for UnsupportedExecutor {
    fn execute(&mut self, statement: &str) -> ExecutionResult {
        ExecutionResult::error(
            ErrorType::NotSupported,
            format!("No query engine connected, cannot execute: {}", statement),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellOutcome {
    Result(ExecutionResult),
    Silent,
    Exit,
}

pub struct ShellSession<E> {
    executor: E,
    parsers: HashMap<ManifestKind, ManifestParser>,
    restored: Vec<String>,
    entries: Vec<String>,
}

impl<E: StatementExecutor> ShellSession<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            parsers: HashMap::new(),
            restored: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn with_restored_history(mut self, restored: Vec<String>) -> Self {
        self.restored = restored;
        self
    }

    /// Lines entered during this session, oldest first.
    pub fn session_entries(&self) -> &[String] {
        &self.entries
    }

    pub fn handle_line(&mut self, line: &str) -> ShellOutcome {
        let command = ShellCommand::parse(line);
        if command != ShellCommand::Empty {
            self.entries.push(line.trim().to_string());
        }

        match command {
            ShellCommand::Empty => ShellOutcome::Silent,
            ShellCommand::Exit => ShellOutcome::Exit,
            ShellCommand::Help => ShellOutcome::Result(ExecutionResult::command(HELP_TEXT)),
            ShellCommand::History => {
                ShellOutcome::Result(ExecutionResult::command(self.history_listing()))
            }
            ShellCommand::AddManifest { kind, path } => {
                ShellOutcome::Result(self.add_manifest(kind, &path))
            }
            ShellCommand::Statement(statement) => {
                debug!(statement = %statement, "Executing statement");
                ShellOutcome::Result(self.executor.execute(&statement))
            }
        }
    }

    fn history_listing(&self) -> String {
        self.restored
            .iter()
            .chain(self.entries.iter())
            .enumerate()
            .map(|(i, entry)| format!("{:>4}  {}", i + 1, entry))
            .collect::<Vec<_>>()
            .join(crate::LINE_SEPARATOR)
    }

    fn add_manifest(&mut self, kind: ManifestKind, path: &Path) -> ExecutionResult {
        if !self.parsers.contains_key(&kind) {
            match ManifestParser::new(kind) {
                Ok(parser) => {
                    self.parsers.insert(kind, parser);
                }
                Err(e) => return manifest_failure(e),
            }
        }
        let parser = &self.parsers[&kind];

        match parser.parse_file(path) {
            Ok(manifest) => ExecutionResult::command(format!(
                "{} manifest '{}' version {} is valid",
                kind,
                manifest.name(),
                manifest.version()
            )),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Manifest rejected");
                manifest_failure(e)
            }
        }
    }
}

fn manifest_failure(error: ManifestError) -> ExecutionResult {
    let error_type = match error {
        ManifestError::Validation { .. } => ErrorType::Validation,
        _ => ErrorType::Execution,
    };
    ExecutionResult::error(error_type, error.to_string())
}
