use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lsp_types::Position;
use tracing::debug;

use eui_assist::config::RunConfig;
use eui_assist::lsp::eui::EuiService;
use eui_assist::lsp::LanguageService;
use eui_assist::runner::{
    locate, Notification, RunCommand, RunError, RunEvent, RunOutcome, Severity, SystemProbe,
};

#[derive(Parser)]
#[command(name = "eui-assist", about = "Completions and a run command for EUI markup.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print completions (JSON) for a line typed up to the cursor
    Complete { line: String },
    /// Print hover text for a line at a UTF-16 column
    Hover { line: String, column: u32 },
    /// Run an .eui/.ewui file through the interpreter
    Run {
        file: PathBuf,
        /// Directory holding the interpreter script (defaults to the executable's directory)
        #[arg(short, long)]
        extension_root: Option<PathBuf>,
    },
    /// Print the interpreter that `run` would use
    Locate,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eui_assist=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    debug!("eui-assist {}", env!("CARGO_PKG_VERSION"));
    let service = EuiService::new();

    match cli.command {
        Command::Complete { line } => {
            let items = service.complete_line(&line);
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Command::Hover { line, column } => match service.hover(&line, Position::new(0, column)) {
            Some(hover) => println!("{}", hover.content),
            None => return Ok(ExitCode::FAILURE),
        },
        Command::Run {
            file,
            extension_root,
        } => {
            let root = match extension_root {
                Some(root) => root,
                None => default_extension_root()?,
            };
            let command = RunCommand::new(root, RunConfig::load());
            let mut handle = match command.execute(Some(&file)).await {
                Ok(handle) => handle,
                Err(e) => {
                    show(&e.notification());
                    return Ok(ExitCode::FAILURE);
                }
            };
            while let Some(event) = handle.next_event().await {
                if let Some(note) = event.notification() {
                    show(&note);
                }
                if let RunEvent::Finished(outcome) = event {
                    return Ok(if outcome == RunOutcome::Success {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    });
                }
            }
        }
        Command::Locate => {
            let config = RunConfig::load();
            let found = locate(
                config.interpreter_path.as_deref(),
                &config.candidates,
                &SystemProbe,
                config.probe_timeout(),
            )
            .await;
            match found {
                Some(path) => println!("{path}"),
                None => {
                    show(&RunError::NoInterpreterFound.notification());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn default_extension_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    Ok(exe
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn show(note: &Notification) {
    match note.severity {
        Severity::Info => println!("{}", note.message),
        Severity::Warning => eprintln!("warning: {}", note.message),
        Severity::Error => eprintln!("error: {}", note.message),
    }
}
