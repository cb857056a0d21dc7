//! # Console Reporting Module / 控制台报告模块
//!
//! Human-facing summary of a finished run. It is written to stderr so that
//! stdout keeps carrying nothing but the protocol stream.
//!
//! 面向人的运行摘要。它写入 stderr，使 stdout 只承载协议流。

use colored::*;
use std::io::{self, Write};

use crate::core::models::{Outcome, Report, RunSummary};

/// Prints a colored summary of the run to stderr.
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - passed   | 4
///   - failed   | 2
///   - skipped  | 0
///   - todo     | 0
///
/// Failures:
///   - test1 > test3: assertion failed (panic)
/// ```
pub fn print_summary(summary: &RunSummary) {
    let mut err = io::stderr().lock();
    if let Err(e) = write_summary(&mut err, summary, true) {
        tracing::warn!(error = %e, "failed to write run summary to stderr");
    }
}

/// Writes the summary; `color` toggles ANSI styling.
/// 写出摘要；`color` 控制是否使用 ANSI 样式。
pub fn write_summary(out: &mut dyn Write, summary: &RunSummary, color: bool) -> io::Result<()> {
    writeln!(out, "\n{}", paint("--- Test Summary ---", color, |s| s.bold()))?;
    let rows: [(&str, usize, fn(&str) -> ColoredString); 4] = [
        ("passed", summary.passed, |s| s.green()),
        ("failed", summary.failed, |s| s.red()),
        ("skipped", summary.skipped, |s| s.dimmed()),
        ("todo", summary.todo, |s| s.yellow()),
    ];
    for (label, count, style) in rows {
        // Pad before styling so escape codes do not count toward the width.
        writeln!(out, "  - {} | {count}", paint(&format!("{label:<8}"), color, style))?;
    }

    let mut failures = Vec::new();
    for report in &summary.reports {
        collect_failures(report, &mut Vec::new(), &mut failures);
    }
    if !failures.is_empty() {
        writeln!(out, "\n{}", paint("Failures:", color, |s| s.red().bold()))?;
        for line in failures {
            writeln!(out, "  - {line}")?;
        }
    }

    let verdict = if summary.is_ok() {
        paint("ALL TESTS PASSED", color, |s| s.green().bold())
    } else {
        paint("TESTS FAILED", color, |s| s.red().bold())
    };
    writeln!(out, "\n{verdict} ({:.2?})", summary.duration)
}

fn paint(text: &str, color: bool, style: fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

fn collect_failures<'a>(report: &'a Report, path: &mut Vec<&'a str>, out: &mut Vec<String>) {
    path.push(&report.name);
    if let Outcome::Failed(failure) = &report.outcome {
        out.push(format!(
            "{}: {} ({})",
            path.join(" > "),
            failure.message,
            failure.reason
        ));
    }
    for child in &report.children {
        collect_failures(child, path, out);
    }
    path.pop();
}
