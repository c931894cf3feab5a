use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use dockmon::app::App;
use dockmon::cli::{Cli, Commands};
use dockmon::core::collector::collect_stats;
use dockmon::core::groups::{group_by_project, summarize};
use dockmon::core::DockerClient;
use dockmon::utils::{format_bytes, AppConfig, ContainerStatus};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(refresh) = cli.refresh {
        config.refresh_secs = refresh;
    }
    if let Some(window) = cli.window {
        config.history_window = window;
    }
    if let Some(workers) = cli.workers {
        config.max_workers = workers;
    }
    let config = config.clamped();

    match cli.command {
        None => {
            // No command - run interactive TUI. Logging stays off so the
            // alternate screen is not polluted.
            let mut app = App::new(config).await?;
            app.run().await?;
        }
        Some(command) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "warn".into()),
                )
                .with_writer(std::io::stderr)
                .init();

            match command {
                Commands::Status { running } => handle_status(running).await?,
                Commands::Stats => handle_stats(config.max_workers).await?,
                Commands::Restart { container } => handle_restart(&container).await?,
                Commands::Logs { container, tail } => handle_logs(&container, tail).await?,
            }
        }
    }

    Ok(())
}

async fn handle_status(running_only: bool) -> Result<()> {
    let client = DockerClient::connect().await?;
    let containers = client.list_containers(!running_only).await?;
    let groups = group_by_project(&containers);
    let summary = summarize(&containers);

    println!(
        "Containers: {}   Running: {}   Instances: {}\n",
        summary.total, summary.running, summary.active_projects
    );

    for group in &groups {
        println!(
            "{} ({}/{} running)",
            group.project.bold(),
            group.running_count(),
            group.containers.len()
        );
        for container in &group.containers {
            let status = match container.status {
                ContainerStatus::Running => container.status.label().green(),
                ContainerStatus::Exited => container.status.label().red(),
                _ => container.status.label().yellow(),
            };
            println!(
                "  {:<12} {:<25} {:<10} {}",
                container.id, container.name, status, container.image
            );
        }
        println!();
    }

    Ok(())
}

async fn handle_stats(max_workers: usize) -> Result<()> {
    let client = DockerClient::connect().await?;
    let containers = client.list_containers(false).await?;

    if containers.is_empty() {
        println!("No running containers.");
        return Ok(());
    }

    let samples = collect_stats(&client, &containers, max_workers).await;

    println!(
        "{:<25} {:>8} {:>12} {:>8} {:>12} {:>12}",
        "Name", "CPU%", "Memory", "Mem%", "Net Rx", "Net Tx"
    );
    println!("{}", "-".repeat(82));

    for container in &containers {
        match samples.get(&container.id) {
            Some(sample) => {
                let (rx, tx) = sample.network_totals();
                println!(
                    "{:<25} {:>7.2}% {:>12} {:>7.1}% {:>12} {:>12}",
                    container.name,
                    sample.cpu_percent,
                    format_bytes(sample.mem_usage_bytes),
                    sample.mem_percent,
                    format_bytes(rx),
                    format_bytes(tx)
                );
            }
            None => {
                println!("{:<25} {:>8}", container.name, "n/a".dimmed());
            }
        }
    }

    Ok(())
}

async fn handle_restart(container: &str) -> Result<()> {
    let client = DockerClient::connect().await?;
    println!("Restarting {}...", container);
    client.restart(container).await?;
    println!("{} restarted", container.green());
    Ok(())
}

async fn handle_logs(container: &str, tail: usize) -> Result<()> {
    let client = DockerClient::connect().await?;
    let logs = client.logs(container, tail).await?;
    print!("{}", String::from_utf8_lossy(&logs));
    Ok(())
}
