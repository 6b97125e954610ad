// ABOUTME: sbxray CLI entry point
// ABOUTME: Argument parsing and dispatch for sandbox inspection commands

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

mod commands;
mod format;

use commands::OutputFormat;
use sbxray_inspector::SandboxInspector;

#[derive(Parser)]
#[command(name = "sbxray")]
#[command(about = "Debug, monitor, and interact with running sbxray sandboxes")]
#[command(version)]
struct Cli {
    /// API key; falls back to the SBXRAY_API_KEY environment variable
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sandboxes
    List {
        /// Filter by state (running, paused)
        #[arg(long)]
        state: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show detailed sandbox info
    Info {
        /// Sandbox ID to inspect
        id: String,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show resource metrics for a sandbox
    Metrics {
        /// Sandbox ID to get metrics for
        id: String,
        /// Continuously update (every 2s)
        #[arg(long)]
        watch: bool,
    },
    /// Execute a shell command in a sandbox
    Exec {
        /// Sandbox ID to execute in
        id: String,
        /// Shell command to execute
        command: String,
        /// Command timeout in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,
    },
    /// Execute code in a sandbox's managed interpreter
    Run {
        /// Sandbox ID to execute in
        id: String,
        /// Code to execute
        code: String,
        /// Interpreter language
        #[arg(long, default_value = "python")]
        language: String,
        /// Execution timeout in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,
    },
    /// List files in a sandbox directory
    Files {
        /// Sandbox ID to list files in
        id: String,
        /// Directory path to list
        #[arg(default_value = "/")]
        path: String,
    },
    /// Download a file from a sandbox
    Download {
        /// Sandbox ID to download from
        id: String,
        /// Path to file in sandbox
        remote_path: String,
        /// Local destination path
        local_path: PathBuf,
    },
    /// Upload a file to a sandbox
    Upload {
        /// Sandbox ID to upload to
        id: String,
        /// Local file path
        local_path: PathBuf,
        /// Destination path in sandbox
        remote_path: String,
    },
    /// Terminate a sandbox
    Kill {
        /// Sandbox ID to terminate
        id: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Terminate ALL sandboxes
    KillAll {
        /// Skip confirmation (dangerous!)
        #[arg(long)]
        force: bool,
    },
    /// Show overview of all sandboxes
    Summary {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let inspector = SandboxInspector::new(cli.api_key)?;

    match cli.command {
        Commands::List { state, format } => commands::list(&inspector, state, format).await,
        Commands::Info { id, format } => commands::info(&inspector, &id, format).await,
        Commands::Metrics { id, watch } => commands::metrics(&inspector, &id, watch).await,
        Commands::Exec { id, command, timeout } => {
            commands::exec(&inspector, &id, &command, timeout).await
        }
        Commands::Run {
            id,
            code,
            language,
            timeout,
        } => commands::run_code(&inspector, &id, &code, &language, timeout).await,
        Commands::Files { id, path } => commands::files(&inspector, &id, &path).await,
        Commands::Download {
            id,
            remote_path,
            local_path,
        } => commands::download(&inspector, &id, &remote_path, &local_path).await,
        Commands::Upload {
            id,
            local_path,
            remote_path,
        } => commands::upload(&inspector, &id, &local_path, &remote_path).await,
        Commands::Kill { id, force } => commands::kill(&inspector, &id, force).await,
        Commands::KillAll { force } => commands::kill_all(&inspector, force).await,
        Commands::Summary { format } => commands::summary(&inspector, format).await,
    }
}
