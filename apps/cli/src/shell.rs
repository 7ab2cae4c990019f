//! Interactive `roundup-generator => ` prompt.
//!
//! Each line is parsed like a command-line invocation without the binary
//! name, so `generate --stdout --tag weekly` works the same in both places.

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use crossterm::style::Stylize;
use roundup_shared::AppConfig;
use tracing::{info, warn};

use crate::commands::{ConfigAction, GenerateArgs, cmd_config, cmd_generate};

const PROMPT: &str = "roundup-generator => ";

/// One line of shell input.
#[derive(Parser, Debug)]
#[command(name = "roundup-generator", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Generate a roundup.
    Generate(GenerateArgs),

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Leave the shell.
    #[command(alias = "quit")]
    Exit,
}

/// Run the prompt loop until `exit` or end of input.
pub(crate) async fn run(config: &AppConfig) -> Result<()> {
    info!("starting roundup shell");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", PROMPT.yellow());
        std::io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            println!();
            return Ok(());
        };

        let Some(words) = shlex::split(&line) else {
            eprintln!("{} unbalanced quotes", "error:".red());
            continue;
        };
        if words.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Covers `help` and `--help` as well as real mistakes.
                e.print()?;
                continue;
            }
        };

        let outcome = match parsed.command {
            ShellCommand::Generate(args) => cmd_generate(config, &args).await,
            ShellCommand::Config { action } => cmd_config(config, &action),
            ShellCommand::Exit => return Ok(()),
        };

        // A failed command should not end the session.
        if let Err(e) = outcome {
            warn!(error = %e, "command failed");
            eprintln!("{} {e:#}", "error:".red());
        }
    }
}
