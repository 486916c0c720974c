mod commands;
mod interactive;
mod session;

pub use commands::{ShellCommand, HELP_TEXT};
pub use interactive::InteractiveShell;
pub use session::{ShellOutcome, ShellSession, StatementExecutor, UnsupportedExecutor};
