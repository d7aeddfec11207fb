use ai_shell::command_router::{CommandRouter, ExecuteMode};
use ai_shell::config::Config;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::io;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: ai <your prompt>
Example: ai list all files in current directory by size

Options:
  --interactive, -i   Run in interactive mode with session management
  --setup-zsh         Set up ZSH integration
  --show-zsh-code     Show ZSH integration code
  --execute, -x       Automatically execute the command
  --no-execute, -n    Don't execute, just show the command
  --debug             Enable debug logging";

fn cli() -> Command {
    Command::new("ai")
        .about("AI-powered command line assistant")
        .long_about(
            "Generates a bash command based on your prompt and optionally executes it for you.\n\n\
             Examples:\n  ai list all files by size\n  \
             ai find all python files changed in the last week\n  \
             ai --interactive\n  ai --setup-zsh",
        )
        .arg(Arg::new("prompt")
            .help("What you want the command to do")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .arg(Arg::new("execute")
            .short('x')
            .long("execute")
            .help("Automatically execute the command without prompting")
            .action(ArgAction::SetTrue)
            .conflicts_with("no-execute"))
        .arg(Arg::new("no-execute")
            .short('n')
            .long("no-execute")
            .help("Don't execute, just prepare the command for the shell buffer")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("debug")
            .long("debug")
            .help("Enable debug logging")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("setup-zsh")
            .long("setup-zsh")
            .help("Set up ZSH integration (adds code to ~/.zshrc)")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("show-zsh-code")
            .long("show-zsh-code")
            .help("Show ZSH integration code without installing")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("interactive")
            .short('i')
            .long("interactive")
            .help("Run in interactive mode with session management")
            .action(ArgAction::SetTrue))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("debug"));
    debug!("Debug logging enabled");

    match run(&matches).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", format!("An error occurred: {:#}", e).red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let config = Config::load()?;
    let mut router = CommandRouter::new(config)?;
    let mut stdout = io::stdout();

    if matches.get_flag("setup-zsh") {
        router.install_integration(&mut stdout)?;
        return Ok(true);
    }

    if matches.get_flag("show-zsh-code") {
        router.show_integration(&mut stdout)?;
        return Ok(true);
    }

    if matches.get_flag("interactive") {
        router.run_interactive().await?;
        return Ok(true);
    }

    let words: Vec<String> = matches
        .get_many::<String>("prompt")
        .unwrap_or_default()
        .cloned()
        .collect();

    if words.is_empty() {
        println!("{}", USAGE);
        return Ok(true);
    }

    let mode = if matches.get_flag("execute") {
        ExecuteMode::Always
    } else if matches.get_flag("no-execute") {
        ExecuteMode::Never
    } else {
        ExecuteMode::Ask
    };

    info!("Processing prompt words: {:?}", words);
    Ok(router.process_prompt(&words, mode).await?)
}
