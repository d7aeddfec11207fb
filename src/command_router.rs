use crate::{
    buffer::{BufferBridge, InstallStatus},
    config::Config,
    editor::{PromptReader, RustylineEditor},
    error::{Result, ShellError},
    executor::Executor,
    generator::{self, CommandGenerator},
    interactive::{InteractiveShell, InterruptFlag},
    providers::{SystemClipboard, SystemTimeProvider, TimeProvider, iso_timestamp},
    review::{MenuStyle, ReviewState, Reviewer},
    session::{CommandRecord, SessionStore},
};
use colored::Colorize;
use std::io::{self, BufRead, BufReader, Stdin, Write};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// What to do with a generated command in single-shot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteMode {
    /// Show the review menu.
    Ask,
    /// `--execute`: run without asking.
    Always,
    /// `--no-execute`: publish to the shell buffer only.
    Never,
}

/// Dispatches the command-line surface to its components.
pub struct CommandRouter {
    config: Config,
    generator: Box<dyn CommandGenerator>,
    reviewer: Reviewer,
}

impl CommandRouter {
    pub fn new(config: Config) -> Result<Self> {
        let paths = config.paths()?.clone();
        let bridge = BufferBridge::new(
            paths.buffer_file,
            paths.shell_rc,
            Box::new(SystemClipboard),
        );
        let reviewer = Reviewer::new(
            Executor::new(),
            bridge,
            Box::new(SystemClipboard),
            Box::new(RustylineEditor),
        );
        let generator = generator::from_config(&config);
        Ok(Self::with_components(config, generator, reviewer))
    }

    pub fn with_components(
        config: Config,
        generator: Box<dyn CommandGenerator>,
        reviewer: Reviewer,
    ) -> Self {
        Self {
            config,
            generator,
            reviewer,
        }
    }

    /// Generates a command for `words` and handles it according to `mode`,
    /// talking to the terminal.
    pub async fn process_prompt(&mut self, words: &[String], mode: ExecuteMode) -> Result<bool> {
        let mut input = terminal_input();
        let mut output = io::stdout();
        self.process_prompt_with_io(words, mode, &mut input, &mut output).await
    }

    /// Returns whether the action finally taken succeeded.
    pub async fn process_prompt_with_io<R: BufRead, W: Write>(
        &mut self,
        words: &[String],
        mode: ExecuteMode,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        let prompt_text = words.join(" ");
        info!("Processing prompt: {}", prompt_text);

        writeln!(output, "{}", "Generating command...".green().bold())?;
        output.flush()?;
        let command = self.generator.generate(&prompt_text).await?;

        writeln!(output, "\n{}", "Suggested command:".blue().bold())?;
        writeln!(output, "{}", command.bright_white())?;

        match mode {
            ExecuteMode::Always => {
                debug!("Auto-executing command (--execute flag)");
                match self.reviewer.executor().run(&command, output) {
                    Ok(_) => Ok(true),
                    Err(ShellError::Execution { .. }) => Ok(false),
                    Err(e) => Err(e),
                }
            }
            ExecuteMode::Never => {
                debug!("Skipping execution (--no-execute flag)");
                let published = self.reviewer.bridge().publish(&command, output);
                writeln!(output, "{}", "Command ready (--no-execute flag was used).".blue())?;
                Ok(published)
            }
            ExecuteMode::Ask => {
                let now = iso_timestamp(&SystemTimeProvider.now());
                let mut record = CommandRecord::new(&prompt_text, &command, now);
                let outcome = self
                    .reviewer
                    .review_with_io(&mut record, MenuStyle::Prompt, input, output)?;
                debug!("Review ended in {:?}", outcome.state);
                Ok(outcome.state == ReviewState::Cancelled || outcome.succeeded)
            }
        }
    }

    /// Appends the shell integration to the configured rc file.
    pub fn install_integration<W: Write>(&self, output: &mut W) -> Result<()> {
        let bridge = self.reviewer.bridge();
        match bridge.install_integration()? {
            InstallStatus::AlreadyInstalled => {
                writeln!(output, "ZSH integration is already set up.")?;
            }
            InstallStatus::Installed => {
                writeln!(output, "{}", "ZSH integration installed successfully!".green().bold())?;
                writeln!(
                    output,
                    "To activate it, restart your terminal or run: {}",
                    format!("source {}", bridge.shell_rc().display()).bold()
                )?;
                writeln!(
                    output,
                    "Then you can use {} to insert AI-generated commands",
                    "Alt+i".bold()
                )?;
            }
        }
        Ok(())
    }

    /// Prints the integration snippet without touching the rc file.
    pub fn show_integration<W: Write>(&self, output: &mut W) -> Result<()> {
        let bridge = self.reviewer.bridge();
        writeln!(output, "{}", bridge.integration_snippet())?;
        writeln!(output, "\n# Add the above code to your {} file", bridge.shell_rc().display())?;
        writeln!(
            output,
            "# Then restart your shell or run 'source {}'",
            bridge.shell_rc().display()
        )?;
        Ok(())
    }

    /// Hands the router's components to an interactive shell.
    pub fn into_interactive(self) -> Result<InteractiveShell> {
        let paths = self.config.paths()?;
        let store = SessionStore::new(paths.history_dir.clone(), Arc::new(SystemTimeProvider));
        Ok(InteractiveShell::new(self.generator, self.reviewer, store))
    }

    /// Runs the interactive loop on the terminal.
    ///
    /// Ctrl-C is caught for the whole session. At the prompt rustyline
    /// reports it directly; anywhere else the signal raises the shell's
    /// interrupt flag and the loop asks about exiting before the next prompt.
    pub async fn run_interactive(self) -> Result<()> {
        let history_file = self.config.paths()?.command_history_file.clone();
        let mut lines = PromptReader::new(history_file)?;
        let mut shell = self.into_interactive()?;
        let watcher = watch_interrupts(shell.interrupts())?;

        let mut input = terminal_input();
        let mut output = io::stdout();
        let result = shell.run_with_io(&mut lines, &mut input, &mut output).await;
        watcher.abort();
        result
    }
}

/// Raises `flag` on every SIGINT until the returned task is aborted.
///
/// The handler is registered before this returns, so no interrupt between
/// here and the first prompt falls through to the default disposition.
#[cfg(unix)]
fn watch_interrupts(flag: InterruptFlag) -> Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupts = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        while interrupts.recv().await.is_some() {
            debug!("Interrupt received outside the prompt");
            flag.raise();
        }
    }))
}

#[cfg(not(unix))]
fn watch_interrupts(flag: InterruptFlag) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received outside the prompt");
            flag.raise();
        }
    }))
}

/// Menu answers read from stdin without holding its lock, so rustyline can
/// still read the same stream. A one-byte buffer leaves unread input in the
/// shared stdin buffer.
fn terminal_input() -> BufReader<Stdin> {
    BufReader::with_capacity(1, io::stdin())
}
