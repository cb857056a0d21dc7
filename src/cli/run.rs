//! # Run Command Module / 运行命令模块
//!
//! Builds the run configuration from the config file and flags, declares the
//! sample tree and runs it.
//!
//! 根据配置文件与命令行参数构建运行配置，声明示例测试树并运行。

use anyhow::{Context, Result};
use std::time::Duration;

use super::{Cli, sample};
use crate::api::Harness;
use crate::core::config::RunConfig;
use crate::infra::sink::StdoutSink;
use crate::reporting::console::print_summary;

/// Resolves the effective configuration. Flags override values from the file.
/// 解析最终生效的配置，命令行参数覆盖配置文件中的值。
pub fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if cli.details {
        config.details = true;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Some(Duration::from_millis(ms));
    }
    if let Some(jobs) = cli.jobs {
        config.concurrency = Some(jobs);
    }
    Ok(config)
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "starting run");

    let harness = Harness::with_config(config, StdoutSink);
    sample::declare(&harness).context("Failed to declare the sample tests")?;

    let summary = harness.run().await.context("The test run was aborted")?;
    if cli.summary {
        print_summary(&summary);
    }
    Ok(())
}
