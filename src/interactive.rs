//! The interactive read-eval loop with session management.

use crate::editor::{LineSource, ReadOutcome};
use crate::error::Result;
use crate::generator::CommandGenerator;
use crate::review::{MenuStyle, Reviewer, prompt};
use crate::session::{CommandRecord, Session, SessionStore};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

const PROMPT: &str = "ai> ";

const HELP_ROWS: &[(&str, &str)] = &[
    ("help", "Show this help message"),
    ("exit, quit", "Exit the interactive mode"),
    ("save [name]", "Save the current session"),
    ("load <name>", "Load a saved session"),
    ("list", "List all saved sessions"),
    ("history", "Show command history in current session"),
    ("clear", "Clear the screen"),
    ("<any other text>", "Generate and manage a bash command"),
];

/// A line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopInput {
    Help,
    Exit,
    Save(Option<String>),
    Load(Option<String>),
    List,
    History,
    Clear,
    Empty,
    Prompt(String),
}

impl LoopInput {
    /// Keywords match case-insensitively. `save` and `load` are recognised by
    /// their first word and keep the argument as typed; every other keyword
    /// must be the whole line, so "list all files" is a prompt.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("").to_lowercase();
        let argument = parts
            .next()
            .map(str::trim)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string);

        match (first.as_str(), argument) {
            ("save", argument) => Self::Save(argument),
            ("load", argument) => Self::Load(argument),
            ("help", None) => Self::Help,
            ("exit" | "quit", None) => Self::Exit,
            ("list", None) => Self::List,
            ("history", None) => Self::History,
            ("clear", None) => Self::Clear,
            _ => Self::Prompt(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    ClearScreen,
    Exit,
}

/// Ctrl-C received while the loop was not reading the prompt.
///
/// A signal watcher raises it from another thread; the loop takes it before
/// reading the next prompt line and treats it like an interrupted read.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether an interrupt was pending, clearing it.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

pub struct InteractiveShell {
    generator: Box<dyn CommandGenerator>,
    reviewer: Reviewer,
    store: SessionStore,
    session: Session,
    interrupts: InterruptFlag,
}

impl InteractiveShell {
    pub fn new(
        generator: Box<dyn CommandGenerator>,
        reviewer: Reviewer,
        store: SessionStore,
    ) -> Self {
        let session = Session::new(store.now());
        Self {
            generator,
            reviewer,
            store,
            session,
            interrupts: InterruptFlag::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle for raising interrupts that arrive outside the prompt.
    pub fn interrupts(&self) -> InterruptFlag {
        self.interrupts.clone()
    }

    /// Runs until the operator exits or `lines` is exhausted.
    ///
    /// Prompts come from `lines`; menu choices and confirmations are read
    /// from `input`. A failing iteration is reported and the loop goes on.
    pub async fn run_with_io<S, R, W>(
        &mut self,
        lines: &mut S,
        input: &mut R,
        output: &mut W,
    ) -> Result<()>
    where
        S: LineSource,
        R: BufRead,
        W: Write,
    {
        writeln!(output, "\n{}", "AI Shell - Interactive Mode".blue().bold())?;
        writeln!(
            output,
            "Type {} for available commands or {} to quit.",
            "help".green().bold(),
            "exit".red().bold()
        )?;
        info!("Interactive session started");

        loop {
            let outcome = if self.interrupts.take() {
                debug!("Handling Ctrl-C received outside the prompt");
                ReadOutcome::Interrupted
            } else {
                lines.read_line(PROMPT)?
            };

            match outcome {
                ReadOutcome::Line(line) => match self.handle_line(&line, input, output).await {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::ClearScreen) => lines.clear_screen()?,
                    Ok(LoopControl::Exit) => break,
                    Err(e) => {
                        error!("Interactive iteration failed: {}", e);
                        writeln!(output, "{}", format!("Error: {}", e).red().bold())?;
                    }
                },
                ReadOutcome::Interrupted => {
                    let question = "Ctrl+C pressed. Exit? (y/n): ".yellow();
                    let answer = prompt(input, output, &format!("\n{}", question))?;
                    if is_yes(answer.as_deref()) {
                        self.exit(input, output)?;
                        break;
                    }
                }
                ReadOutcome::Eof => {
                    writeln!(output)?;
                    self.exit(input, output)?;
                    break;
                }
            }
        }

        info!("Interactive session ended");
        Ok(())
    }

    /// Handles one prompt line.
    ///
    /// Clearing the screen is left to the caller, which owns the terminal.
    pub async fn handle_line<R: BufRead, W: Write>(
        &mut self,
        line: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<LoopControl> {
        match LoopInput::parse(line) {
            LoopInput::Empty => {}
            LoopInput::Help => self.show_help(output)?,
            LoopInput::Exit => {
                self.exit(input, output)?;
                return Ok(LoopControl::Exit);
            }
            LoopInput::Save(name) => {
                self.session.touch(self.store.now());
                let path = self.store.save(&self.session, name.as_deref())?;
                writeln!(output, "{}", format!("Session saved to: {}", path.display()).green())?;
            }
            LoopInput::Load(None) => {
                writeln!(output, "{}", "Please specify a session name to load".yellow())?;
            }
            LoopInput::Load(Some(name)) => self.load(&name, output)?,
            LoopInput::List => self.list(output)?,
            LoopInput::History => {
                if self.session.is_empty() {
                    writeln!(output, "{}", "No commands in current session".yellow())?;
                } else {
                    writeln!(output, "\n{}", "Command history:".bold())?;
                    show_commands(self.session.commands(), output)?;
                }
            }
            LoopInput::Clear => return Ok(LoopControl::ClearScreen),
            LoopInput::Prompt(text) => self.generate_and_review(&text, input, output).await?,
        }
        Ok(LoopControl::Continue)
    }

    async fn generate_and_review<R: BufRead, W: Write>(
        &mut self,
        text: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        writeln!(output, "{}", "Generating command...".green().bold())?;
        output.flush()?;
        let command = self.generator.generate(text).await?;

        writeln!(output, "\n{}", "Suggested command:".blue().bold())?;
        writeln!(output, "{}", command.bright_white())?;

        let mut record = CommandRecord::new(text, &command, self.store.now());
        let reviewed = self
            .reviewer
            .review_with_io(&mut record, MenuStyle::Session, input, output);
        self.session.push(record, self.store.now());
        writeln!(output)?;

        reviewed.map(|_| ())
    }

    fn load<W: Write>(&mut self, name: &str, output: &mut W) -> Result<()> {
        let loaded = match self.store.load(name) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to load session {}: {}", name, e);
                writeln!(output, "{}", format!("Failed to load session: {}", e).red())?;
                return Ok(());
            }
        };

        self.session = loaded;
        info!("Loaded session {}", name);
        writeln!(
            output,
            "{}",
            format!("Loaded session: {}", SessionStore::normalize_name(name)).green()
        )?;
        writeln!(output, "\n{}", "Session commands:".bold())?;
        show_commands(self.session.commands(), output)
    }

    fn list<W: Write>(&self, output: &mut W) -> Result<()> {
        let sessions = self.store.list()?;
        if sessions.is_empty() {
            writeln!(output, "{}", "No saved sessions found".yellow())?;
            return Ok(());
        }

        writeln!(output, "\n{}", "Saved sessions:".bold())?;
        for (idx, name) in sessions.iter().enumerate() {
            let (count, created) = match self.store.summarize(name) {
                Ok(summary) => (summary.command_count.to_string(), summary.created_at),
                Err(e) => {
                    warn!("Could not summarize session {}: {}", name, e);
                    ("?".to_string(), "Unknown".to_string())
                }
            };
            writeln!(
                output,
                "{} {} - {} commands, created: {}",
                format!("{}.", idx + 1).blue(),
                name.green(),
                count,
                created
            )?;
        }
        Ok(())
    }

    fn show_help<W: Write>(&self, output: &mut W) -> Result<()> {
        let width = HELP_ROWS.iter().map(|(cmd, _)| cmd.len()).max().unwrap_or(0);
        writeln!(output, "\n{}", "AI Shell Commands".bold())?;
        writeln!(output, "{:width$}  {}", "Command", "Description", width = width)?;
        for (cmd, description) in HELP_ROWS {
            writeln!(
                output,
                "{}  {}",
                format!("{:width$}", cmd, width = width).cyan(),
                description.green()
            )?;
        }
        Ok(())
    }

    /// Offers to save a non-empty session, then says goodbye.
    fn exit<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<()> {
        if !self.session.is_empty() {
            let question = "Save session before exiting? (y/n): ".yellow().to_string();
            let answer = prompt(input, output, &question)?;
            if is_yes(answer.as_deref()) {
                let name = prompt(
                    input,
                    output,
                    &"Enter session name (or press Enter for auto-name): ".green().to_string(),
                )?
                .filter(|name| !name.is_empty());

                self.session.touch(self.store.now());
                match self.store.save(&self.session, name.as_deref()) {
                    Ok(path) => {
                        let saved = format!("Session saved to: {}", path.display());
                        writeln!(output, "{}", saved.green())?;
                    }
                    Err(e) => {
                        error!("Failed to save session on exit: {}", e);
                        writeln!(output, "{}", format!("Error: {}", e).red().bold())?;
                    }
                }
            }
        }
        writeln!(output, "{}", "Goodbye!".blue())?;
        Ok(())
    }
}

fn is_yes(answer: Option<&str>) -> bool {
    answer.is_some_and(|a| a.eq_ignore_ascii_case("y"))
}

fn show_commands<W: Write>(commands: &[CommandRecord], output: &mut W) -> Result<()> {
    for (idx, record) in commands.iter().enumerate() {
        writeln!(
            output,
            "{} {} {}",
            format!("{}.", idx + 1).blue(),
            "Prompt:".yellow(),
            record.prompt
        )?;
        writeln!(output, "   {} {}", "Command:".green(), record.command)?;
        writeln!(output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferBridge;
    use crate::buffer::tests::RecordingClipboard;
    use crate::editor::LineEditor;
    use crate::error::ShellError;
    use crate::executor::Executor;
    use crate::executor::tests::MockProcessRunner;
    use crate::generator::MockGenerator;
    use crate::session::tests::FixedTime;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::fs;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Line source replaying a fixed script, then reporting end of input.
    struct ScriptedLines {
        script: VecDeque<ReadOutcome>,
        clears: usize,
        interrupt: Option<InterruptFlag>,
    }

    impl ScriptedLines {
        fn new(lines: &[&str]) -> Self {
            Self {
                script: lines.iter().map(|l| ReadOutcome::Line(l.to_string())).collect(),
                clears: 0,
                interrupt: None,
            }
        }

        fn then(mut self, outcome: ReadOutcome) -> Self {
            self.script.push_back(outcome);
            self
        }

        /// Raises `flag` once the first line has been handed out, as a
        /// Ctrl-C arriving while that line is being handled would.
        fn interrupting(mut self, flag: InterruptFlag) -> Self {
            self.interrupt = Some(flag);
            self
        }
    }

    impl LineSource for ScriptedLines {
        fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
            let next = self.script.pop_front().unwrap_or(ReadOutcome::Eof);
            if let Some(flag) = self.interrupt.take() {
                flag.raise();
            }
            Ok(next)
        }

        fn clear_screen(&mut self) -> Result<()> {
            self.clears += 1;
            Ok(())
        }
    }

    struct UnusedEditor;

    impl LineEditor for UnusedEditor {
        fn edit(&mut self, initial: &str) -> Result<String> {
            Ok(initial.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl CommandGenerator for FailingGenerator {
        async fn generate(&self, _prompt_text: &str) -> Result<String> {
            Err(ShellError::Generation("API returned status 500: overloaded".to_string()))
        }
    }

    struct Harness {
        dir: TempDir,
        ran: Arc<Mutex<Vec<String>>>,
        shell: InteractiveShell,
    }

    fn harness_with(generator: Box<dyn CommandGenerator>) -> Harness {
        let dir = TempDir::new().unwrap();
        let runner = MockProcessRunner::success("ok\n");
        let ran = runner.seen.clone();
        let clipboard = RecordingClipboard::default();
        let reviewer = Reviewer::new(
            Executor::with_runner(Box::new(runner)),
            BufferBridge::new(
                dir.path().join(".ai_shell_buffer"),
                dir.path().join(".zshrc"),
                Box::new(clipboard.clone()),
            ),
            Box::new(clipboard),
            Box::new(UnusedEditor),
        );
        let store = SessionStore::new(
            dir.path().join("history"),
            Arc::new(FixedTime::at(2024, 5, 17, 9, 30, 15)),
        );
        Harness {
            dir,
            ran,
            shell: InteractiveShell::new(generator, reviewer, store),
        }
    }

    fn harness() -> Harness {
        harness_with(Box::new(MockGenerator::new()))
    }

    async fn run(harness: &mut Harness, lines: ScriptedLines, answers: &str) -> String {
        let mut lines = lines;
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        harness
            .shell
            .run_with_io(&mut lines, &mut input, &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    // =========================================================================
    // Input parsing
    // =========================================================================

    #[test]
    fn test_parse_meta_commands() {
        assert_eq!(LoopInput::parse("help"), LoopInput::Help);
        assert_eq!(LoopInput::parse("EXIT"), LoopInput::Exit);
        assert_eq!(LoopInput::parse("quit"), LoopInput::Exit);
        assert_eq!(LoopInput::parse("list"), LoopInput::List);
        assert_eq!(LoopInput::parse("History"), LoopInput::History);
        assert_eq!(LoopInput::parse("clear"), LoopInput::Clear);
        assert_eq!(LoopInput::parse("   "), LoopInput::Empty);
    }

    #[test]
    fn test_parse_save_and_load_keep_argument_case() {
        assert_eq!(LoopInput::parse("save"), LoopInput::Save(None));
        assert_eq!(
            LoopInput::parse("SAVE Monday"),
            LoopInput::Save(Some("Monday".to_string()))
        );
        assert_eq!(LoopInput::parse("load"), LoopInput::Load(None));
        assert_eq!(
            LoopInput::parse("load  Work.yaml "),
            LoopInput::Load(Some("Work.yaml".to_string()))
        );
    }

    #[test]
    fn test_parse_keywords_inside_prompts() {
        assert_eq!(
            LoopInput::parse("list all files by size"),
            LoopInput::Prompt("list all files by size".to_string())
        );
        assert_eq!(
            LoopInput::parse("clear the dns cache"),
            LoopInput::Prompt("clear the dns cache".to_string())
        );
        assert_eq!(LoopInput::parse("saved games"), LoopInput::Prompt("saved games".to_string()));
    }

    // =========================================================================
    // Loop behaviour
    // =========================================================================

    #[tokio::test]
    async fn test_prompt_is_reviewed_and_recorded() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["list files", "exit"]), "r\nn\n").await;

        let commands = h.shell.session().commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].prompt, "list files");
        assert_eq!(commands[0].command, "ls -la");
        assert!(commands[0].executed);
        assert_eq!(*h.ran.lock().unwrap(), vec!["ls -la".to_string()]);
        assert!(shown.contains("Suggested command:"));
        assert!(shown.contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_skipped_command_is_still_recorded() {
        let mut h = harness();

        run(&mut h, ScriptedLines::new(&["show disk space", "exit"]), "s\nn\n").await;

        let commands = h.shell.session().commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].command, "df -h");
        assert!(!commands[0].executed);
        assert!(h.ran.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported_and_loop_continues() {
        let mut h = harness_with(Box::new(FailingGenerator));

        let shown = run(&mut h, ScriptedLines::new(&["anything", "history", "exit"]), "").await;

        assert!(shown.contains("Error: Command generation failed: API returned status 500"));
        assert!(shown.contains("No commands in current session"));
        assert!(shown.contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_save_then_load_replaces_session() {
        let mut h = harness();

        run(&mut h, ScriptedLines::new(&["what time is it", "save work"]), "s\nn\n").await;
        assert!(h.dir.path().join("history").join("work.yaml").exists());

        let mut other = harness();
        fs::create_dir_all(other.dir.path().join("history")).unwrap();
        fs::copy(
            h.dir.path().join("history").join("work.yaml"),
            other.dir.path().join("history").join("work.yaml"),
        )
        .unwrap();

        let shown = run(&mut other, ScriptedLines::new(&["load work"]), "n\n").await;

        assert!(shown.contains("Loaded session: work.yaml"));
        assert!(shown.contains("Prompt:"));
        assert!(shown.contains("what time is it"));
        assert_eq!(other.shell.session().len(), 1);
        assert_eq!(other.shell.session().commands()[0].command, "date");
    }

    #[tokio::test]
    async fn test_failed_load_leaves_session_untouched() {
        let mut h = harness();

        let lines = ScriptedLines::new(&["list files", "load missing"]);

        let shown = run(&mut h, lines, "s\nn\n").await;

        assert!(shown.contains("Failed to load session"));
        assert_eq!(h.shell.session().len(), 1);
    }

    #[tokio::test]
    async fn test_load_without_name_asks_for_one() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["load"]), "").await;

        assert!(shown.contains("Please specify a session name to load"));
    }

    #[tokio::test]
    async fn test_list_shows_counts_and_unreadable_sessions() {
        let mut h = harness();
        let history = h.dir.path().join("history");
        fs::create_dir_all(&history).unwrap();
        fs::write(
            history.join("a_good.yaml"),
            "commands:\n\
             - prompt: p\n  command: c\n  timestamp: '2024-01-01T10:00:00'\n\
             metadata:\n\
             \x20 created_at: '2024-01-01T10:00:00.5'\n\
             \x20 updated_at: '2024-01-01T10:00:00.5'\n",
        )
        .unwrap();
        fs::write(history.join("b_bad.yaml"), "commands: [").unwrap();

        let shown = run(&mut h, ScriptedLines::new(&["list"]), "").await;

        assert!(shown.contains("a_good.yaml"));
        assert!(shown.contains("1 commands, created: 2024-01-01 10:00:00"));
        assert!(shown.contains("? commands, created: Unknown"));
        assert!(shown.find("a_good.yaml").unwrap() < shown.find("b_bad.yaml").unwrap());
    }

    #[tokio::test]
    async fn test_list_without_sessions() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["list"]), "").await;

        assert!(shown.contains("No saved sessions found"));
    }

    #[tokio::test]
    async fn test_help_lists_meta_commands() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["help"]), "").await;

        for keyword in ["save [name]", "load <name>", "history", "exit, quit"] {
            assert!(shown.contains(keyword), "missing {}", keyword);
        }
    }

    #[tokio::test]
    async fn test_exit_offers_save_with_auto_name() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["list files", "exit"]), "s\ny\n\n").await;

        assert!(shown.contains("Save session before exiting?"));
        assert!(shown.contains("Session saved to:"));
        assert!(
            h.dir
                .path()
                .join("history")
                .join("session_20240517_093015.yaml")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_exit_with_empty_session_does_not_ask() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["exit"]), "").await;

        assert!(!shown.contains("Save session"));
        assert!(shown.contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_interrupt_asks_before_exiting() {
        let mut h = harness();
        let lines = ScriptedLines::new(&[])
            .then(ReadOutcome::Interrupted)
            .then(ReadOutcome::Line("help".to_string()))
            .then(ReadOutcome::Interrupted);

        let shown = run(&mut h, lines, "n\ny\n").await;

        assert_eq!(shown.matches("Exit? (y/n)").count(), 2);
        assert!(shown.contains("AI Shell Commands"));
        assert_eq!(shown.matches("Goodbye!").count(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_follows_exit_path_with_save() {
        let mut h = harness();
        let lines = ScriptedLines::new(&["list files"]).then(ReadOutcome::Interrupted);

        run(&mut h, lines, "s\ny\ny\nfriday\n").await;

        assert!(h.dir.path().join("history").join("friday.yaml").exists());
    }

    #[tokio::test]
    async fn test_interrupt_during_review_is_handled_at_next_prompt() {
        let mut h = harness();
        let lines =
            ScriptedLines::new(&["list files", "history"]).interrupting(h.shell.interrupts());

        let shown = run(&mut h, lines, "s
y
n
").await;

        assert_eq!(shown.matches("Exit? (y/n)").count(), 1);
        assert!(shown.find("Options:").unwrap() < shown.find("Exit? (y/n)").unwrap());
        assert!(!shown.contains("Command history:"));
        assert!(shown.contains("Save session before exiting?"));
        assert!(shown.contains("Goodbye!"));
        assert_eq!(h.shell.session().len(), 1);
        assert!(!h.shell.interrupts().take());
    }

    #[tokio::test]
    async fn test_declined_interrupt_resumes_reading() {
        let mut h = harness();
        let lines =
            ScriptedLines::new(&["list files", "history"]).interrupting(h.shell.interrupts());

        let shown = run(&mut h, lines, "s
n
n
").await;

        assert_eq!(shown.matches("Exit? (y/n)").count(), 1);
        assert!(shown.contains("Command history:"));
        assert!(shown.contains("Goodbye!"));
    }

    #[test]
    fn test_interrupt_flag_is_taken_once() {
        let flag = InterruptFlag::default();
        let watcher = flag.clone();

        assert!(!flag.take());
        watcher.raise();
        watcher.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[tokio::test]
    async fn test_clear_goes_through_the_line_source() {
        let mut h = harness();
        let mut lines = ScriptedLines::new(&["clear", "help", "clear"]);
        let mut output = Vec::new();

        h.shell
            .run_with_io(&mut lines, &mut Cursor::new(Vec::new()), &mut output)
            .await
            .unwrap();

        assert_eq!(lines.clears, 2);
        assert!(!String::from_utf8(output).unwrap().contains("\x1B[2J"));
    }

    #[tokio::test]
    async fn test_clear_is_left_to_the_caller() {
        let mut h = harness();

        let control = h
            .shell
            .handle_line("CLEAR", &mut Cursor::new(Vec::new()), &mut Vec::new())
            .await
            .unwrap();

        assert_eq!(control, LoopControl::ClearScreen);
    }

    #[tokio::test]
    async fn test_invalid_session_name_is_reported() {
        let mut h = harness();

        let shown = run(&mut h, ScriptedLines::new(&["save ../outside"]), "").await;

        assert!(shown.contains("Error: Invalid input"));
        assert!(!h.dir.path().join("outside.yaml").exists());
    }
}
