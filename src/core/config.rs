//! # Configuration Module / 配置模块
//!
//! Per-node declaration options ([`TestOptions`]) and run-wide settings
//! ([`RunConfig`]). Both deserialize with `serde`; a `RunConfig` is usually
//! loaded from a TOML file such as `quicktap.toml`.
//!
//! 每个节点的声明选项（`TestOptions`）以及整个运行的设置（`RunConfig`）。
//! 两者都可以通过 `serde` 反序列化；`RunConfig` 通常从 TOML 文件加载。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::models::Directive;

/// A `skip`/`todo` option value: either a plain switch or a reason string.
/// `skip`/`todo` 选项的值：可以是布尔开关，也可以是原因字符串。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectiveFlag {
    /// `true` enables the directive without a reason.
    Enabled(bool),
    /// Enables the directive and carries the reason shown after `# SKIP` / `# TODO`.
    Reason(String),
}

impl Default for DirectiveFlag {
    fn default() -> Self {
        DirectiveFlag::Enabled(false)
    }
}

impl DirectiveFlag {
    pub fn is_set(&self) -> bool {
        match self {
            DirectiveFlag::Enabled(enabled) => *enabled,
            DirectiveFlag::Reason(_) => true,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            DirectiveFlag::Reason(reason) => Some(reason),
            DirectiveFlag::Enabled(_) => None,
        }
    }
}

impl From<bool> for DirectiveFlag {
    fn from(enabled: bool) -> Self {
        DirectiveFlag::Enabled(enabled)
    }
}

impl From<&str> for DirectiveFlag {
    fn from(reason: &str) -> Self {
        DirectiveFlag::Reason(reason.to_string())
    }
}

impl From<String> for DirectiveFlag {
    fn from(reason: String) -> Self {
        DirectiveFlag::Reason(reason)
    }
}

/// Options accepted by every `describe`/`it`/`test` declaration.
///
/// Defaults: `timeout: unbounded, skip: false, todo: false, only: false`,
/// no external abort signal and unbounded sibling concurrency.
///
/// 每个 `describe`/`it`/`test` 声明接受的选项。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestOptions {
    /// Upper bound for the node's body. Exceeding it fails the node with a timeout.
    /// 节点测试体的运行上限，超出即以超时失败。
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Option<Duration>,
    pub skip: DirectiveFlag,
    pub todo: DirectiveFlag,
    /// Restricts the run to `only`-marked nodes and their ancestors and descendants.
    /// 将运行范围限制为标记了 `only` 的节点及其祖先与后代。
    pub only: bool,
    /// External abort request. Cancelling it aborts the node and all of its descendants.
    /// 外部中止信号。取消它会中止该节点及其所有后代。
    #[serde(skip)]
    pub signal: Option<CancellationToken>,
    /// Maximum number of this node's children running at the same time.
    pub concurrency: Option<usize>,
}

impl TestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, flag: impl Into<DirectiveFlag>) -> Self {
        self.skip = flag.into();
        self
    }

    pub fn todo(mut self, flag: impl Into<DirectiveFlag>) -> Self {
        self.todo = flag.into();
        self
    }

    pub fn only(mut self) -> Self {
        self.only = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    /// Resolves the `skip`/`todo` switches into a single directive. Skip wins over todo.
    /// 将 `skip`/`todo` 开关合并为单个指令。skip 优先于 todo。
    pub fn directive(&self) -> Directive {
        Directive::resolve(&self.skip, &self.todo)
    }
}

/// Settings for one run of a harness.
/// 单次运行的设置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Timeout applied to every body that does not configure its own.
    /// 应用于所有未单独配置超时的测试体的默认超时。
    #[serde(
        rename = "timeout_ms",
        with = "duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
    /// Default sibling concurrency for nodes that do not configure their own.
    /// 未单独配置时使用的默认同级并发数。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Emit a YAML diagnostic block after every failing test point.
    /// 在每个失败的测试点之后输出 YAML 诊断块。
    pub details: bool,
}

impl RunConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse run configuration")
    }

    /// Loads a configuration file from disk.
    /// 从磁盘加载配置文件。
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }
}

/// Serializes `Option<Duration>` as an optional number of milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
