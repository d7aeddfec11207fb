//! Hands an accepted command to the operator's live shell line.
//!
//! The command is written to a well-known buffer file; a zsh widget bound to
//! Alt+i reads that file into `BUFFER`. The clipboard receives the same text
//! as a fallback for shells without the widget.

use crate::error::{Result, ShellError};
use crate::executor::shell_quote;
use crate::providers::Clipboard;
use colored::Colorize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Unique substring identifying an installed integration snippet.
pub const INTEGRATION_MARKER: &str = "ai-shell-inject-buffer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    AlreadyInstalled,
}

pub struct BufferBridge {
    buffer_file: PathBuf,
    shell_rc: PathBuf,
    clipboard: Box<dyn Clipboard>,
}

impl BufferBridge {
    pub fn new(buffer_file: PathBuf, shell_rc: PathBuf, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            buffer_file,
            shell_rc,
            clipboard,
        }
    }

    pub fn buffer_file(&self) -> &Path {
        &self.buffer_file
    }

    pub fn shell_rc(&self) -> &Path {
        &self.shell_rc
    }

    /// Publishes `command` for the shell widget and tells the operator how to
    /// pick it up.
    ///
    /// Returns `true` once the buffer file holds the command; a clipboard
    /// failure is only reported.
    pub fn publish<W: Write>(&self, command: &str, output: &mut W) -> bool {
        if let Err(e) = fs::write(&self.buffer_file, command) {
            warn!("Failed to write buffer file {}: {}", self.buffer_file.display(), e);
            let _ = writeln!(
                output,
                "{}",
                format!("Failed to prepare buffer injection: {}", e).red().bold()
            );
            return false;
        }
        info!("Command saved to buffer file: {}", self.buffer_file.display());

        let copied = match self.clipboard.copy(command) {
            Ok(()) => true,
            Err(e) => {
                warn!("Clipboard copy failed: {}", e);
                false
            }
        };

        let _ = self.show_instructions(copied, output);
        true
    }

    fn show_instructions<W: Write>(&self, copied: bool, output: &mut W) -> Result<()> {
        writeln!(output, "\n{}", "Command ready for buffer insertion!".green().bold())?;
        if self.integration_installed() {
            writeln!(
                output,
                "Press {} in your shell to insert it into your command line",
                "Alt+i".bold()
            )?;
        } else {
            if copied {
                writeln!(
                    output,
                    "Paste the command in your terminal (it's also been copied to your clipboard)"
                )?;
            } else {
                writeln!(
                    output,
                    "The shell integration script has not been installed; \
                     paste the command manually"
                )?;
            }
            writeln!(
                output,
                "To enable the keyboard shortcut (Alt+i), run: {}",
                "ai --setup-zsh".bold()
            )?;
        }
        Ok(())
    }

    /// Whether the shell configuration already carries the widget.
    pub fn integration_installed(&self) -> bool {
        match fs::read_to_string(&self.shell_rc) {
            Ok(content) => content.contains(INTEGRATION_MARKER),
            Err(_) => false,
        }
    }

    /// The zsh widget that consumes the buffer file.
    pub fn integration_snippet(&self) -> String {
        let buffer_file = shell_quote(&self.buffer_file.display().to_string());
        format!(
            r#"
# {marker}: AI Shell ZSH integration
function ai-shell-insert-buffer() {{
    local buffer_file={buffer_file}
    if [[ -f "$buffer_file" ]]; then
        BUFFER="$(<"$buffer_file")"
        CURSOR=${{#BUFFER}}
        command rm -f -- "$buffer_file"
        zle redisplay
    fi
}}

zle -N ai-shell-insert-buffer
bindkey '^[i' ai-shell-insert-buffer  # Alt+i
"#,
            marker = INTEGRATION_MARKER,
            buffer_file = buffer_file,
        )
    }

    /// Appends the widget to the shell configuration unless the marker is
    /// already present.
    pub fn install_integration(&self) -> Result<InstallStatus> {
        if self.integration_installed() {
            info!("Shell integration already present in {}", self.shell_rc.display());
            return Ok(InstallStatus::AlreadyInstalled);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.shell_rc)
            .map_err(|e| ShellError::shell_config(&self.shell_rc, e))?;
        write!(file, "\n{}\n", self.integration_snippet())
            .map_err(|e| ShellError::shell_config(&self.shell_rc, e))?;

        info!("Installed shell integration into {}", self.shell_rc.display());
        Ok(InstallStatus::Installed)
    }
}
