// ABOUTME: Command handlers for the sbxray CLI
// ABOUTME: Table and JSON rendering over the SandboxInspector facade

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use inquire::Confirm;
use std::path::Path;
use std::time::Duration;

use sbxray_inspector::{SandboxInfo, SandboxInspector, SandboxMetrics, SandboxState};

use crate::format::{format_bytes, format_duration, format_optional_duration, truncate};

/// Output format for read commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn sandbox_json(sandbox: &SandboxInfo) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(sandbox)?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert(
            "uptime_secs".to_string(),
            sandbox.uptime().num_seconds().into(),
        );
        map.insert(
            "time_remaining_secs".to_string(),
            sandbox.time_remaining().num_seconds().into(),
        );
    }
    Ok(value)
}

pub async fn list(
    inspector: &SandboxInspector,
    state: Option<String>,
    format: OutputFormat,
) -> Result<i32> {
    let state = state.map(|s| s.parse::<SandboxState>()).transpose()?;
    let sandboxes = inspector.list_sandboxes(state, None).await?;

    if format == OutputFormat::Json {
        let output: Vec<serde_json::Value> = sandboxes
            .iter()
            .map(sandbox_json)
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(0);
    }

    if sandboxes.is_empty() {
        println!("{}", "No sandboxes found".dimmed());
        return Ok(0);
    }

    println!(
        "{}",
        format!("Sandboxes ({} total)", sandboxes.len()).blue().bold()
    );
    println!();

    let mut table = styled_table();
    table.set_header(vec![
        "Sandbox ID",
        "State",
        "Template",
        "CPU",
        "Memory",
        "Uptime",
        "Remaining",
    ]);
    for sandbox in &sandboxes {
        table.add_row(vec![
            sandbox.sandbox_id.clone(),
            sandbox.state.to_string(),
            truncate(&sandbox.template_id, 20),
            sandbox.cpu_count.to_string(),
            format!("{}MB", sandbox.memory_mb),
            format_duration(sandbox.uptime()),
            format_duration(sandbox.time_remaining()),
        ]);
    }
    println!("{table}");

    Ok(0)
}

pub async fn info(inspector: &SandboxInspector, id: &str, format: OutputFormat) -> Result<i32> {
    let sandbox = inspector.info(id).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&sandbox_json(&sandbox)?)?);
        return Ok(0);
    }

    println!("{}", format!("Sandbox: {id}").blue().bold());
    println!();

    let mut table = styled_table();
    table.set_header(vec!["Property", "Value"]);
    table.add_row(vec!["Sandbox ID".to_string(), sandbox.sandbox_id.clone()]);
    table.add_row(vec!["State".to_string(), sandbox.state.to_string()]);
    table.add_row(vec!["Template".to_string(), sandbox.template_id.clone()]);
    table.add_row(vec![
        "Name".to_string(),
        sandbox.name.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "CPU".to_string(),
        format!("{} cores", sandbox.cpu_count),
    ]);
    table.add_row(vec![
        "Memory".to_string(),
        format!("{} MB", sandbox.memory_mb),
    ]);
    table.add_row(vec!["Started".to_string(), sandbox.started_at.to_string()]);
    table.add_row(vec!["Timeout".to_string(), sandbox.end_at.to_string()]);
    table.add_row(vec![
        "Uptime".to_string(),
        format_duration(sandbox.uptime()),
    ]);
    table.add_row(vec![
        "Remaining".to_string(),
        format_duration(sandbox.time_remaining()),
    ]);
    if !sandbox.metadata.is_empty() {
        table.add_row(vec![
            "Metadata".to_string(),
            serde_json::to_string_pretty(&sandbox.metadata)?,
        ]);
    }
    println!("{table}");

    Ok(0)
}

fn print_metrics(id: &str, metrics: &SandboxMetrics) {
    println!("{}", format!("Metrics: {id}").blue().bold());
    println!();

    let mut table = styled_table();
    table.set_header(vec!["Metric", "Value", "Usage"]);
    table.add_row(vec![
        "CPU".to_string(),
        format!("{} cores", metrics.cpu_count),
        format!("{:.1}%", metrics.cpu_pct),
    ]);
    table.add_row(vec![
        "Memory".to_string(),
        format!("{}/{} MB", metrics.mem_used_mb, metrics.mem_total_mb),
        format!("{:.1}%", metrics.mem_pct()),
    ]);
    table.add_row(vec![
        "Disk".to_string(),
        format!("{}/{} MB", metrics.disk_used_mb, metrics.disk_total_mb),
        format!("{:.1}%", metrics.disk_pct()),
    ]);
    table.add_row(vec![
        "Timestamp".to_string(),
        metrics.timestamp.to_string(),
        String::new(),
    ]);
    println!("{table}");
}

async fn show_metrics(inspector: &SandboxInspector, id: &str) -> Result<()> {
    let response = inspector.metrics(id, None, None).await?;
    match response.latest() {
        Some(metrics) => print_metrics(id, metrics),
        None => println!("{}", "No metrics available".red()),
    }
    Ok(())
}

pub async fn metrics(inspector: &SandboxInspector, id: &str, watch: bool) -> Result<i32> {
    if watch {
        loop {
            print!("\x1b[2J\x1b[H");
            show_metrics(inspector, id).await?;
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    show_metrics(inspector, id).await?;
    Ok(0)
}

pub async fn exec(
    inspector: &SandboxInspector,
    id: &str,
    command: &str,
    timeout: u64,
) -> Result<i32> {
    let result = inspector
        .exec(id, command, Some(Duration::from_secs(timeout)))
        .await?;

    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr.red());
    }

    Ok(result.exit_code)
}

pub async fn run_code(
    inspector: &SandboxInspector,
    id: &str,
    code: &str,
    language: &str,
    timeout: u64,
) -> Result<i32> {
    let result = inspector
        .run_code(id, code, language, Some(Duration::from_secs(timeout)))
        .await?;

    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr.dimmed());
    }
    if !result.results.is_empty() {
        println!("{}", "Results:".cyan());
        for value in &result.results {
            println!("  {value}");
        }
    }
    if let Some(error) = &result.error {
        eprintln!("{}", format!("Error: {error}").red());
        return Ok(1);
    }

    Ok(0)
}

pub async fn files(inspector: &SandboxInspector, id: &str, path: &str) -> Result<i32> {
    let mut files = inspector.list_files(id, path).await?;

    if files.is_empty() {
        println!("{}", "No files found".dimmed());
        return Ok(0);
    }

    // Directories first, then by name
    files.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    println!("{}", format!("Files in {path}").blue().bold());
    println!();

    let mut table = styled_table();
    table.set_header(vec!["Type", "Name", "Size"]);
    for file in &files {
        let icon = if file.is_dir { "dir" } else { "file" };
        let size = if file.is_dir {
            "-".to_string()
        } else {
            format_bytes(file.size_bytes as usize)
        };
        table.add_row(vec![icon.to_string(), file.name.clone(), size]);
    }
    println!("{table}");

    Ok(0)
}

pub async fn download(
    inspector: &SandboxInspector,
    id: &str,
    remote_path: &str,
    local_path: &Path,
) -> Result<i32> {
    let content = inspector.download(id, remote_path).await?;
    tokio::fs::write(local_path, &content).await?;

    println!(
        "{}",
        format!(
            "Downloaded {} bytes to {}",
            format_bytes(content.len()),
            local_path.display()
        )
        .green()
    );
    Ok(0)
}

pub async fn upload(
    inspector: &SandboxInspector,
    id: &str,
    local_path: &Path,
    remote_path: &str,
) -> Result<i32> {
    let content = tokio::fs::read(local_path).await?;
    inspector.upload(id, remote_path, &content).await?;

    println!(
        "{}",
        format!(
            "Uploaded {} bytes to {}",
            format_bytes(content.len()),
            remote_path
        )
        .green()
    );
    Ok(0)
}

pub async fn kill(inspector: &SandboxInspector, id: &str, force: bool) -> Result<i32> {
    if !force {
        let confirmed = Confirm::new(&format!("Are you sure you want to kill sandbox {id}?"))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(1);
        }
    }

    if inspector.kill(id).await? {
        println!("{}", format!("Terminated sandbox {id}").green());
    } else {
        println!(
            "{}",
            format!("Sandbox {id} not found or already terminated").yellow()
        );
    }
    Ok(0)
}

pub async fn kill_all(inspector: &SandboxInspector, force: bool) -> Result<i32> {
    let sandboxes = inspector.list_sandboxes(None, None).await?;

    if sandboxes.is_empty() {
        println!("{}", "No sandboxes to kill".dimmed());
        return Ok(0);
    }

    if !force {
        println!(
            "{}",
            format!("This will terminate {} sandbox(es)!", sandboxes.len())
                .red()
                .bold()
        );
        let confirmed = Confirm::new("Are you absolutely sure?")
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(1);
        }
    }

    let count = inspector.kill_all(true).await?;
    println!("{}", format!("Terminated {count} sandbox(es)").green());
    Ok(0)
}

pub async fn summary(inspector: &SandboxInspector, format: OutputFormat) -> Result<i32> {
    let summary = inspector.summary().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(0);
    }

    println!("{}", "Sandbox Summary".blue().bold());
    println!();

    let mut table = styled_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Running".to_string(), summary.running_count.to_string()]);
    table.add_row(vec!["Paused".to_string(), summary.paused_count.to_string()]);
    table.add_row(vec!["Total".to_string(), summary.total_count.to_string()]);
    table.add_row(vec![
        "Total CPU".to_string(),
        format!("{} cores", summary.total_cpu),
    ]);
    table.add_row(vec![
        "Total Memory".to_string(),
        format!("{} MB", summary.total_memory_mb),
    ]);
    if let Some(oldest) = &summary.oldest_sandbox_id {
        table.add_row(vec![
            "Oldest".to_string(),
            format!("{} ({})", oldest, format_optional_duration(summary.oldest_uptime)),
        ]);
    }
    if let Some(newest) = &summary.newest_sandbox_id {
        table.add_row(vec![
            "Newest".to_string(),
            format!("{} ({})", newest, format_optional_duration(summary.newest_uptime)),
        ]);
    }
    println!("{table}");

    Ok(0)
}
