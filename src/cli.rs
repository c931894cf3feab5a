/// CLI argument parsing and command handling

use clap::{Parser, Subcommand};

use crate::utils::DEFAULT_LOG_TAIL;

// Build timestamp injected at compile time
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
pub const VERSION_WITH_BUILD: &str =
    concat!(env!("CARGO_PKG_VERSION"), " (built: ", env!("BUILD_TIMESTAMP"), ")");

#[derive(Parser)]
#[command(name = "dockmon")]
#[command(author, version = VERSION_WITH_BUILD, about, long_about = None)]
pub struct Cli {
    /// Refresh interval in seconds (2-60), overrides the config file
    #[arg(short, long)]
    pub refresh: Option<u64>,

    /// History window in samples (10-100), overrides the config file
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Concurrent stats fetches per cycle (1-64), overrides the config file
    #[arg(long)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show containers grouped by compose project
    Status {
        /// Only show running containers
        #[arg(short, long)]
        running: bool,
    },

    /// One-shot resource usage for all running containers
    Stats,

    /// Restart a container
    Restart {
        /// Container name or id
        container: String,
    },

    /// Print recent logs for a container
    Logs {
        /// Container name or id
        container: String,

        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_LOG_TAIL)]
        tail: usize,
    },
}
