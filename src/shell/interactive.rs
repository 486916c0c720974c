use super::session::{ShellOutcome, ShellSession, StatementExecutor};
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::result::{render, ExecutionResult};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info, warn};

pub struct InteractiveShell<E> {
    session: ShellSession<E>,
    editor: DefaultEditor,
    prompt: String,
    history: Option<HistoryStore>,
}

impl<E: StatementExecutor> InteractiveShell<E> {
    pub fn new(config: &ConsoleConfig, executor: E) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history = HistoryStore::from_config(&config.history);

        let restored = match &history {
            Some(store) => match store.load_now() {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %store.path().display(), error = %e, "Could not restore history");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        for entry in &restored {
            if let Err(e) = editor.add_history_entry(entry.as_str()) {
                debug!(error = %e, "Could not add restored entry to line editor");
            }
        }
        info!(entries = restored.len(), "History restored");

        Ok(Self {
            session: ShellSession::new(executor).with_restored_history(restored),
            editor,
            prompt: config.prompt.clone(),
            history,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("Type HELP for the list of commands, EXIT to quit.");

        loop {
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = self.editor.add_history_entry(line.trim()) {
                            debug!(error = %e, "Could not add line to line editor history");
                        }
                    }
                    match self.session.handle_line(&line) {
                        ShellOutcome::Exit => break,
                        ShellOutcome::Silent => {}
                        ShellOutcome::Result(result) => print_result(&result),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    self.save_history();
                    return Err(e.into());
                }
            }
        }

        self.save_history();
        Ok(())
    }

    fn save_history(&self) {
        if let Some(store) = &self.history {
            if let Err(e) = store.save_now(self.session.session_entries()) {
                warn!(path = %store.path().display(), error = %e, "Could not save history");
            }
        }
    }
}

fn print_result(result: &ExecutionResult) {
    let text = render(result);
    if result.is_error() {
        eprintln!("{}", text.red());
    } else {
        println!("{}", text);
    }
}
