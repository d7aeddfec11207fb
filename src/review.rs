//! Operator review of a generated command.
//!
//! A candidate enters [`ReviewState::Proposed`]. Each menu choice is parsed
//! into a [`ReviewAction`] and applied through [`transition`]; anything the
//! table does not allow is invalid input and simply re-displays the menu.
//!
//! ```text
//! Proposed --edit--> Edited
//! Proposed | Edited --run-->    Accepted
//!                   --copy-->   Copied
//!                   --buffer--> Buffered
//!                   --cancel--> Cancelled
//! ```

use crate::buffer::BufferBridge;
use crate::editor::LineEditor;
use crate::error::{Result, ShellError};
use crate::executor::Executor;
use crate::providers::Clipboard;
use crate::session::CommandRecord;
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Proposed,
    Edited,
    /// The command was run.
    Accepted,
    Copied,
    Buffered,
    Cancelled,
}

impl ReviewState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Proposed | Self::Edited)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Run,
    Edit,
    Copy,
    Buffer,
    Cancel,
}

/// Transition table of the review.
pub fn transition(state: ReviewState, action: ReviewAction) -> Option<ReviewState> {
    use ReviewAction::*;
    use ReviewState::*;

    match (state, action) {
        (Proposed, Edit) => Some(Edited),
        (Proposed | Edited, Run) => Some(Accepted),
        (Proposed | Edited, Copy) => Some(Copied),
        (Proposed | Edited, Buffer) => Some(Buffered),
        (Proposed | Edited, Cancel) => Some(Cancelled),
        _ => None,
    }
}

/// Key layout of the option menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStyle {
    /// Single-shot invocation: y/n/e/c/b.
    Prompt,
    /// Interactive loop: e/c/b/r/s.
    Session,
}

impl MenuStyle {
    fn entries(self) -> &'static [(ReviewAction, char, &'static str)] {
        use ReviewAction::*;
        match self {
            MenuStyle::Prompt => &[
                (Run, 'y', "Run command"),
                (Cancel, 'n', "Cancel"),
                (Edit, 'e', "Edit command"),
                (Copy, 'c', "Copy to clipboard"),
                (Buffer, 'b', "Insert to shell buffer (for Alt+i)"),
            ],
            MenuStyle::Session => &[
                (Edit, 'e', "Edit command"),
                (Copy, 'c', "Copy to clipboard"),
                (Buffer, 'b', "Insert to shell buffer (for Alt+i)"),
                (Run, 'r', "Run command"),
                (Cancel, 's', "Skip"),
            ],
        }
    }

    /// Menu entries valid in `state`, in display order.
    pub fn options(self, state: ReviewState) -> Vec<(ReviewAction, char, &'static str)> {
        self.entries()
            .iter()
            .copied()
            .filter(|(action, _, _)| transition(state, *action).is_some())
            .collect()
    }

    /// Parses an operator choice for the menu shown in `state`.
    ///
    /// # Arguments
    ///
    /// * `input` - The line typed at the menu, surrounding whitespace ignored
    /// * `state` - Review state whose menu was displayed
    ///
    /// # Returns
    ///
    /// The selected action, or `InvalidInput` for a key this layout does not
    /// offer. Whether the action is allowed in `state` is up to [`transition`].
    pub fn parse(self, input: &str, state: ReviewState) -> Result<ReviewAction> {
        let choice = input.trim().to_lowercase();
        self.options(state)
            .into_iter()
            .find(|(_, key, _)| choice.len() == 1 && choice.starts_with(*key))
            .map(|(action, _, _)| action)
            .ok_or(ShellError::InvalidInput(choice))
    }

    fn keys(self, state: ReviewState) -> String {
        let keys: Vec<String> = self
            .options(state)
            .iter()
            .map(|(_, key, _)| format!("'{}'", key))
            .collect();
        match keys.split_last() {
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{}, or {}", rest.join(", "), last),
            None => String::new(),
        }
    }
}

/// How a review ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub state: ReviewState,
    /// Whether the chosen action itself succeeded (execution exit status,
    /// buffer write).
    pub succeeded: bool,
}

/// Drives the review of one command.
pub struct Reviewer {
    executor: Executor,
    bridge: BufferBridge,
    clipboard: Box<dyn Clipboard>,
    editor: Box<dyn LineEditor>,
}

impl Reviewer {
    pub fn new(
        executor: Executor,
        bridge: BufferBridge,
        clipboard: Box<dyn Clipboard>,
        editor: Box<dyn LineEditor>,
    ) -> Self {
        Self {
            executor,
            bridge,
            clipboard,
            editor,
        }
    }

    pub fn bridge(&self) -> &BufferBridge {
        &self.bridge
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Runs the review loop for `record`, editing its `command` in place and
    /// recording the execution result.
    ///
    /// Reaching the end of `input` counts as cancelling.
    ///
    /// # Arguments
    ///
    /// * `record` - The proposed command; updated by edits and runs
    /// * `style` - Which key layout the menu uses
    /// * `input` - Reader for menu choices (e.g., stdin or a `Cursor`)
    /// * `output` - Writer for the menu and results
    ///
    /// # Returns
    ///
    /// The terminal review state and whether the chosen action succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the terminal fails.
    pub fn review_with_io<R: BufRead, W: Write>(
        &mut self,
        record: &mut CommandRecord,
        style: MenuStyle,
        input: &mut R,
        output: &mut W,
    ) -> Result<ReviewOutcome> {
        let mut state = ReviewState::Proposed;
        self.display_menu(style, state, output)?;

        loop {
            let Some(choice) = prompt(input, output, "Choose an option: ")? else {
                info!("Input closed during review, cancelling");
                return self.finish(ReviewState::Cancelled, true);
            };

            let step = style.parse(&choice, state).and_then(|action| {
                transition(state, action)
                    .map(|next| (action, next))
                    .ok_or_else(|| ShellError::InvalidInput(choice.clone()))
            });
            let (action, next) = match step {
                Ok(step) => step,
                Err(e) => {
                    warn!("{}", e);
                    writeln!(
                        output,
                        "{}",
                        format!("Invalid input. Please enter {}.", style.keys(state)).red()
                    )?;
                    self.display_menu(style, state, output)?;
                    continue;
                }
            };
            debug!("Operator selected {:?} in {:?}", action, state);

            match action {
                ReviewAction::Edit => {
                    self.edit(record, output)?;
                    state = next;
                    self.display_menu(style, state, output)?;
                }
                ReviewAction::Run => {
                    let succeeded = self.run(record, output);
                    return self.finish(next, succeeded);
                }
                ReviewAction::Copy => {
                    self.copy(&record.command, output)?;
                    if style == MenuStyle::Prompt && state == ReviewState::Proposed {
                        let again = prompt(input, output, "Also run the command? (y/n): ")?;
                        if again.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")) {
                            let succeeded = self.run(record, output);
                            return self.finish(ReviewState::Accepted, succeeded);
                        }
                    }
                    return self.finish(next, true);
                }
                ReviewAction::Buffer => {
                    let succeeded = self.bridge.publish(&record.command, output);
                    return self.finish(next, succeeded);
                }
                ReviewAction::Cancel => {
                    info!("User cancelled command execution");
                    writeln!(output, "{}", "Command execution cancelled.".yellow())?;
                    return self.finish(next, true);
                }
            }
        }
    }

    fn finish(&self, state: ReviewState, succeeded: bool) -> Result<ReviewOutcome> {
        debug!("Review finished in {:?} (succeeded: {})", state, succeeded);
        Ok(ReviewOutcome { state, succeeded })
    }

    fn edit<W: Write>(&mut self, record: &mut CommandRecord, output: &mut W) -> Result<()> {
        writeln!(output, "\n{}", "Edit command (use arrow keys, history, etc.):".bold())?;
        output.flush()?;

        let edited = match self.editor.edit(&record.command) {
            Ok(edited) => edited,
            Err(e) => {
                warn!("Error during command editing, keeping original: {}", e);
                record.command.clone()
            }
        };

        record.command = edited;
        writeln!(output, "\n{}", "Edited command:".blue().bold())?;
        writeln!(output, "{}", record.command.bright_white())?;
        Ok(())
    }

    /// Runs the command; only a successful run marks the record executed.
    fn run<W: Write>(&self, record: &mut CommandRecord, output: &mut W) -> bool {
        match self.executor.run(&record.command, output) {
            Ok(result) => {
                record.executed = true;
                record.output = Some(result.stdout).filter(|s| !s.is_empty());
                true
            }
            Err(ShellError::Execution { stderr, .. }) => {
                record.output = Some(stderr).filter(|s| !s.is_empty());
                false
            }
            Err(e) => {
                let message = format!("Could not run command: {}", e);
                let _ = writeln!(output, "{}", message.red().bold());
                false
            }
        }
    }

    fn copy<W: Write>(&self, command: &str, output: &mut W) -> Result<()> {
        match self.clipboard.copy(command) {
            Ok(()) => {
                info!("Command copied to clipboard");
                writeln!(output, "{}", "Command copied to clipboard!".blue())?;
            }
            Err(e) => {
                warn!("{}", e);
                writeln!(output, "{}", format!("{}", e).red())?;
            }
        }
        Ok(())
    }

    fn display_menu<W: Write>(
        &self,
        style: MenuStyle,
        state: ReviewState,
        output: &mut W,
    ) -> Result<()> {
        writeln!(output, "\nOptions:")?;
        for (_, key, label) in style.options(state) {
            writeln!(output, "{}: {}", key.to_string().bold(), label)?;
        }
        Ok(())
    }
}

/// Writes `message` and reads one line; `None` once input is exhausted.
pub fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
