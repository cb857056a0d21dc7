//! # TAP Line Formatter / TAP 行格式化器
//!
//! Pure functions rendering Test Anything Protocol (version 14) fragments:
//! the version header, plan lines, result lines with `# SKIP`/`# TODO`
//! directives, comment diagnostics and YAML failure blocks.
//!
//! 渲染 TAP 14 协议片段的纯函数：版本头、计划行、带 `# SKIP`/`# TODO` 指令的
//! 结果行、注释诊断以及 YAML 失败块。
//!
//! ## Output Format / 输出格式
//! ```text
//! TAP version 14
//! 1..1
//! ok 1 - test1
//!   1..2
//!   ok 1 - test2
//!   not ok 2 - test3
//! ```

use crate::core::models::{Outcome, Report, Status};

pub const VERSION_HEADER: &str = "TAP version 14";
pub const INDENTATION: &str = "  ";

/// Indentation of a node nested one level below `parent`.
pub fn nested_indent(parent: &str) -> String {
    format!("{parent}{INDENTATION}")
}

/// Normalizes free-form text so it starts with `" - "`.
/// 规范化描述文本，使其以 `" - "` 开头。
pub fn description(text: &str) -> String {
    if text.starts_with(" - ") {
        text.to_string()
    } else {
        format!(" - {text}")
    }
}

/// Escapes backslashes and double quotes for a quoted diagnostic payload.
/// 为带引号的诊断内容转义反斜杠和双引号。
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn plan_line(indent: &str, count: usize) -> String {
    format!("{indent}1..{count}")
}

/// Renders `<indent><ok|not ok> <ordinal> - <name>[ # SKIP|TODO [reason]]`.
///
/// Todo points render as `ok` whether their body passed or failed.
///
/// 渲染单个测试点的结果行。todo 测试点无论成功失败都渲染为 `ok`。
pub fn result_line(indent: &str, ordinal: usize, name: &str, outcome: &Outcome) -> String {
    let status = match outcome.status() {
        Status::Ok => "ok",
        Status::NotOk => "not ok",
    };
    // `#` opens a directive and `\` escapes it, so both are escaped, backslashes first.
    let mut line = format!(
        "{indent}{status} {ordinal}{}",
        description(&name.replace('\\', "\\\\").replace('#', "\\#"))
    );
    match outcome {
        Outcome::Skipped(reason) => push_directive(&mut line, "SKIP", reason.as_deref()),
        Outcome::TodoPassed(reason) | Outcome::TodoFailed(reason, _) => {
            push_directive(&mut line, "TODO", reason.as_deref())
        }
        Outcome::Passed | Outcome::Failed(_) => {}
    }
    line
}

fn push_directive(line: &mut String, keyword: &str, reason: Option<&str>) {
    line.push_str(" # ");
    line.push_str(keyword);
    if let Some(reason) = reason.filter(|r| !r.is_empty()) {
        line.push(' ');
        line.push_str(reason);
    }
}

/// Renders a free-form diagnostic as `# ` comment lines, one per text line.
pub fn diagnostic_lines(indent: &str, message: &str) -> Vec<String> {
    message
        .lines()
        .map(|line| format!("{indent}# {line}"))
        .collect()
}

/// YAML diagnostic block describing a caught failure, indented under its test point.
/// 描述已捕获失败的 YAML 诊断块，缩进在其测试点之下。
pub fn yaml_block(indent: &str, outcome: &Outcome) -> Vec<String> {
    let Some(failure) = outcome.failure() else {
        return Vec::new();
    };
    let severity = if outcome.is_todo() { "todo" } else { "fail" };
    vec![
        format!("{indent}---"),
        format!("{indent}message: \"{}\"", escape(&failure.message)),
        format!("{indent}severity: {severity}"),
        format!("{indent}reason: {}", failure.reason),
        format!("{indent}..."),
    ]
}

/// Renders one test point: its result line (at `indent`), an optional YAML
/// block, then its nested block.
///
/// 渲染一个测试点：结果行、可选的 YAML 块以及其嵌套块。
pub fn render_point(report: &Report, ordinal: usize, indent: &str, details: bool) -> Vec<String> {
    let mut lines = Vec::new();
    write_point(&mut lines, report, ordinal, indent, details);
    lines
}

fn write_point(lines: &mut Vec<String>, report: &Report, ordinal: usize, indent: &str, details: bool) {
    lines.push(result_line(indent, ordinal, &report.name, &report.outcome));
    if details {
        lines.extend(yaml_block(&report.indent, &report.outcome));
    }
    write_nested(lines, report, details);
}

/// The nested block of a node: the plan line and every child, then queued
/// diagnostics. A leaf without diagnostics renders nothing.
fn write_nested(lines: &mut Vec<String>, report: &Report, details: bool) {
    if !report.children.is_empty() {
        lines.push(plan_line(&report.indent, report.children.len()));
        for (index, child) in report.children.iter().enumerate() {
            write_point(lines, child, index + 1, &report.indent, details);
        }
    }
    for message in &report.diagnostics {
        lines.extend(diagnostic_lines(&report.indent, message));
    }
}
