//! Terminal line input: the pre-filled edit line used by the review menu and
//! the prompt reader of the interactive loop.

use crate::error::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{Context, DefaultEditor, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Words recognised by the interactive loop, offered for completion.
pub const META_COMMANDS: &[&str] = &[
    "help", "exit", "quit", "save", "load", "list", "history", "clear",
];

/// Edits a command line starting from existing text.
pub trait LineEditor {
    fn edit(&mut self, initial: &str) -> Result<String>;
}

/// Line editor with cursor movement and history, backed by rustyline.
pub struct RustylineEditor;

impl LineEditor for RustylineEditor {
    fn edit(&mut self, initial: &str) -> Result<String> {
        let mut editor = DefaultEditor::new()?;
        let edited = editor.readline_with_initial("> ", (initial, ""))?;
        debug!("Command after editing: {}", edited);
        Ok(edited)
    }
}

/// What a single read of the interactive prompt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D or closed input.
    Eof,
}

/// Source of operator lines for the interactive loop.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Clears the terminal the lines are read from.
    fn clear_screen(&mut self) -> Result<()>;
}

/// Completion, hints and highlighting for meta-commands.
#[derive(Clone)]
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            commands: META_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Mirrors the loop's parsing: `save`/`load` take an argument, every
    /// other keyword must stand alone.
    fn is_meta_command(&self, line: &str) -> bool {
        let lowered = line.trim().to_lowercase();
        let first = lowered.split_whitespace().next().unwrap_or("");
        matches!(first, "save" | "load") || self.commands.iter().any(|c| *c == lowered)
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&line.to_lowercase()))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.is_meta_command(line) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ShellHelper {}

/// Interactive prompt with persistent input history.
pub struct PromptReader {
    editor: Editor<ShellHelper, FileHistory>,
    history_file: PathBuf,
}

impl PromptReader {
    pub fn new(history_file: PathBuf) -> Result<Self> {
        let mut editor = Editor::<ShellHelper, FileHistory>::new()?;
        editor.set_helper(Some(ShellHelper::new()));
        if history_file.exists() {
            if let Err(e) = editor.load_history(&history_file) {
                warn!("Could not load prompt history {}: {}", history_file.display(), e);
            }
        }
        Ok(Self { editor, history_file })
    }
}

impl LineSource for PromptReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                    if let Err(e) = self.editor.save_history(&self.history_file) {
                        warn!("Could not save prompt history: {}", e);
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.editor.clear_screen()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_recognises_meta_commands_case_insensitively() {
        let helper = ShellHelper::new();
        assert!(helper.is_meta_command("SAVE work"));
        assert!(helper.is_meta_command("history"));
        assert!(helper.is_meta_command("load monday"));
        assert!(!helper.is_meta_command("list all files by size"));
        assert!(!helper.is_meta_command("find large files"));
    }

    #[test]
    fn test_meta_commands_cover_loop_keywords() {
        for keyword in ["help", "exit", "quit", "save", "load", "list", "history", "clear"] {
            assert!(META_COMMANDS.contains(&keyword), "missing {}", keyword);
        }
    }
}
