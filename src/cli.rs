//! # Command-Line Interface / 命令行接口
//!
//! Front end of the `quicktap` binary, which runs the bundled sample tree and
//! prints its TAP stream to stdout.
//!
//! `quicktap` 可执行文件的前端，运行内置的示例测试树并将 TAP 流输出到 stdout。

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

pub mod run;
pub mod sample;

/// Run the bundled sample tests and report them as TAP version 14.
#[derive(Debug, Clone, Parser)]
#[command(name = "quicktap", version, about)]
pub struct Cli {
    /// Path to a TOML run configuration (`timeout_ms`, `concurrency`, `details`).
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit a YAML diagnostic block after every failing test point.
    #[arg(long)]
    pub details: bool,

    /// Default timeout for every test body, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum number of sibling test points running at once.
    #[arg(short, long, value_name = "JOBS")]
    pub jobs: Option<usize>,

    /// Print a human-readable summary to stderr after the run.
    #[arg(long)]
    pub summary: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub async fn process_command(cli: Cli) -> Result<()> {
    run::execute(cli).await
}
