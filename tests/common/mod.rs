// Shared test helpers for integration tests
#![allow(dead_code)]

use quicktap::{BufferSink, Declare, Error, Harness, RunConfig};

/// A harness writing into an in-memory buffer.
pub fn harness() -> (Harness, BufferSink) {
    harness_with(RunConfig::default())
}

pub fn harness_with(config: RunConfig) -> (Harness, BufferSink) {
    let sink = BufferSink::new();
    (Harness::with_config(config, sink.clone()), sink)
}

/// Declares a uniform tree: `depth` levels of suites, `width` children per node,
/// with passing units as leaves.
pub fn nest<D: Declare>(scope: &D, depth: usize, width: usize) -> Result<(), Error> {
    for i in 0..width {
        if depth == 0 {
            scope.it(&format!("leaf {i}"), || async { Ok(()) })?;
        } else {
            scope.describe(&format!("level {depth} suite {i}"), move |s| async move {
                nest(&s, depth - 1, width)?;
                Ok(())
            })?;
        }
    }
    Ok(())
}

/// Lines of the stream that are plan lines, with their indentation.
pub fn plan_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.trim_start().starts_with("1.."))
        .cloned()
        .collect()
}

/// Result lines (`ok`/`not ok`), trimmed.
pub fn result_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.trim_start().to_string())
        .filter(|line| line.starts_with("ok ") || line.starts_with("not ok "))
        .collect()
}
