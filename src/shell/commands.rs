use crate::manifest::ManifestKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static ADD_MANIFEST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^ADD\s+(DATASTORE|CONNECTOR)\s+"([^"]+)"\s*;?$"#)
        .expect("add manifest regex is valid")
});

static KEYWORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(HISTORY|HELP|EXIT|QUIT)\s*;?$").expect("keyword regex is valid"));

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    AddManifest { kind: ManifestKind, path: PathBuf },
    History,
    Help,
    Exit,
    /// Anything else goes to the statement executor untouched.
    Statement(String),
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }

        if let Some(caps) = ADD_MANIFEST_PATTERN.captures(line) {
            let kind = if caps[1].eq_ignore_ascii_case("DATASTORE") {
                ManifestKind::DataStore
            } else {
                ManifestKind::Connector
            };
            return ShellCommand::AddManifest {
                kind,
                path: PathBuf::from(&caps[2]),
            };
        }

        if let Some(caps) = KEYWORD_PATTERN.captures(line) {
            return match caps[1].to_ascii_uppercase().as_str() {
                "HISTORY" => ShellCommand::History,
                "HELP" => ShellCommand::Help,
                _ => ShellCommand::Exit,
            };
        }

        ShellCommand::Statement(line.to_string())
    }
}

pub const HELP_TEXT: &str = "\
Console commands:
  ADD DATASTORE \"<path>\";   validate a datastore manifest
  ADD CONNECTOR \"<path>\";   validate a connector manifest
  HISTORY;                  show the command history
  HELP;                     show this help
  EXIT; | QUIT;             leave the console
Any other input is sent to the query engine.";
