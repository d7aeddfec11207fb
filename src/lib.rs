//! AI Shell - natural language to shell commands.
//!
//! This library turns a plain-English request into a shell command through a
//! language model, then lets the operator decide what happens to it:
//!
//! - **Run** it through `sh -c` and see both output streams
//! - **Edit** it in a pre-filled line editor first
//! - **Copy** it to the clipboard
//! - **Buffer** it for a zsh keybinding (Alt+i) that drops it onto the live
//!   command line
//!
//! An interactive mode keeps a session transcript that can be saved to and
//! loaded from YAML files.
//!
//! # Architecture
//!
//! - [`config`] - Configuration file, environment overrides and resolved paths
//! - [`error`] - Error taxonomy shared by every component
//! - [`generator`] - Command generation via the Claude API (plus a mock backend)
//! - [`review`] - Review state machine driven by the option menus
//! - [`executor`] - Runs accepted commands
//! - [`buffer`] - Shell buffer bridge and zsh integration installer
//! - [`session`] - Session transcripts and their on-disk store
//! - [`interactive`] - Interactive loop with meta-commands
//! - [`editor`] - Line editing and the interactive prompt
//! - [`command_router`] - Dispatches the command-line surface
//! - [`providers`] - Shared dependency injection traits
//! - [`http_client`] - HTTP client abstraction
//!
//! # Example
//!
//! ```ignore
//! use ai_shell::command_router::{CommandRouter, ExecuteMode};
//! use ai_shell::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut router = CommandRouter::new(Config::load()?)?;
//!
//!     // Generate a command and review it through the y/n/e/c/b menu
//!     let words: Vec<String> = ["list", "files", "by", "size"].map(String::from).to_vec();
//!     router.process_prompt(&words, ExecuteMode::Ask).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod command_router;
pub mod config;
pub mod editor;
pub mod error;
pub mod executor;
pub mod generator;
pub mod http_client;
pub mod interactive;
pub mod providers;
pub mod review;
pub mod session;
