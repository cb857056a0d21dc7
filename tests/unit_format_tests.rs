//! # TAP Formatter Unit Tests / TAP 格式化器单元测试
//!
//! Protocol-exact checks of every rendering rule.
//!
//! 对每条渲染规则进行与协议完全一致的检查。

use quicktap::reporting::tap::{
    self, description, diagnostic_lines, escape, nested_indent, plan_line, render_point, result_line,
    yaml_block,
};
use quicktap::{Failure, FailureReason, Kind, Outcome, Report, Status};
use std::time::Duration;

fn failure(message: &str) -> Failure {
    Failure {
        reason: FailureReason::Error,
        message: message.to_string(),
    }
}

fn leaf(name: &str, indent: &str, outcome: Outcome) -> Report {
    let status = outcome.status();
    Report {
        name: name.to_string(),
        kind: Kind::Unit,
        indent: indent.to_string(),
        outcome,
        status,
        children: vec![],
        diagnostics: vec![],
        duration: Duration::ZERO,
    }
}

#[cfg(test)]
mod line_tests {
    use super::*;

    #[test]
    fn test_version_header_literal() {
        assert_eq!(tap::VERSION_HEADER, "TAP version 14");
    }

    #[test]
    fn test_description_is_normalized_once() {
        assert_eq!(description("adds numbers"), " - adds numbers");
        assert_eq!(description(" - already prefixed"), " - already prefixed");
        assert_eq!(description(""), " - ");
    }

    #[test]
    fn test_escape_backslashes_and_quotes() {
        assert_eq!(escape(r#"a\b"#), r#"a\\b"#);
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r#"\""#), r#"\\\""#);
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_indentation_adds_two_spaces() {
        assert_eq!(nested_indent(""), "  ");
        assert_eq!(nested_indent("  "), "    ");
    }

    #[test]
    fn test_plan_line() {
        assert_eq!(plan_line("", 3), "1..3");
        assert_eq!(plan_line("    ", 0), "    1..0");
    }

    #[test]
    fn test_result_lines_for_each_outcome() {
        assert_eq!(result_line("", 1, "ok test", &Outcome::Passed), "ok 1 - ok test");
        assert_eq!(
            result_line("  ", 2, "broken", &Outcome::Failed(failure("x"))),
            "  not ok 2 - broken"
        );
        assert_eq!(
            result_line("", 3, "skipped", &Outcome::Skipped(None)),
            "ok 3 - skipped # SKIP"
        );
        assert_eq!(
            result_line("", 4, "skipped", &Outcome::Skipped(Some("no network".into()))),
            "ok 4 - skipped # SKIP no network"
        );
        assert_eq!(
            result_line("", 5, "wip", &Outcome::TodoPassed(Some("later".into()))),
            "ok 5 - wip # TODO later"
        );
        assert_eq!(
            result_line("", 6, "wip", &Outcome::TodoFailed(None, failure("x"))),
            "ok 6 - wip # TODO"
        );
    }

    #[test]
    fn test_result_line_escapes_hash_in_name() {
        assert_eq!(result_line("", 1, "a # b", &Outcome::Passed), "ok 1 - a \\# b");
    }

    #[test]
    fn test_result_line_escapes_backslash_before_hash() {
        assert_eq!(
            result_line("", 1, r"a\#b", &Outcome::Passed),
            r"ok 1 - a\\\#b"
        );
        assert_eq!(result_line("", 2, r"C:\tmp", &Outcome::Passed), r"ok 2 - C:\\tmp");
    }

    #[test]
    fn test_diagnostic_lines_split_multiline_messages() {
        assert_eq!(
            diagnostic_lines("  ", "first\nsecond"),
            vec!["  # first", "  # second"]
        );
    }

    #[test]
    fn test_yaml_block_only_for_failures() {
        assert!(yaml_block("  ", &Outcome::Passed).is_empty());
        assert_eq!(
            yaml_block("  ", &Outcome::Failed(failure(r#"got "x""#))),
            vec![
                "  ---",
                r#"  message: "got \"x\"""#,
                "  severity: fail",
                "  reason: error",
                "  ...",
            ]
        );
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[test]
    fn test_render_point_nests_children_under_plan() {
        let mut suite = leaf("test1", "  ", Outcome::Passed);
        suite.kind = Kind::Suite;
        suite.children = vec![
            leaf("test2", "    ", Outcome::Passed),
            leaf("test3", "    ", Outcome::Failed(failure("nope"))),
        ];
        suite.status = Status::NotOk;

        assert_eq!(
            render_point(&suite, 1, "", false),
            vec!["ok 1 - test1", "  1..2", "  ok 1 - test2", "  not ok 2 - test3"]
        );
    }

    #[test]
    fn test_render_point_leaf_has_no_plan() {
        let unit = leaf("alone", "  ", Outcome::Passed);
        assert_eq!(render_point(&unit, 7, "", true), vec!["ok 7 - alone"]);
    }

    #[test]
    fn test_render_point_appends_diagnostics_after_children() {
        let mut case = leaf("case", "  ", Outcome::Passed);
        case.children = vec![leaf("sub", "    ", Outcome::Skipped(None))];
        case.diagnostics = vec!["note".to_string()];

        assert_eq!(
            render_point(&case, 1, "", false),
            vec!["ok 1 - case", "  1..1", "  ok 1 - sub # SKIP", "  # note"]
        );
    }
}

#[cfg(test)]
mod console_tests {
    use super::*;
    use quicktap::RunSummary;
    use quicktap::reporting::console::write_summary;

    #[test]
    fn test_summary_lists_counts_and_failure_paths() {
        let mut suite = leaf("test1", "  ", Outcome::Passed);
        suite.children = vec![
            leaf("test2", "    ", Outcome::Passed),
            leaf("test3", "    ", Outcome::Failed(failure("expected 3, got 2"))),
        ];
        let summary = RunSummary::new(Status::NotOk, vec![suite], Duration::ZERO);

        let mut out = Vec::new();
        write_summary(&mut out, &summary, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("--- Test Summary ---"));
        assert!(text.contains("  - passed   | 2"));
        assert!(text.contains("  - failed   | 1"));
        assert!(text.contains("  - test1 > test3: expected 3, got 2 (error)"));
        assert!(text.contains("TESTS FAILED"));
    }

    struct ClosedPipe;

    impl std::io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_summary_write_error_is_returned() {
        let summary = RunSummary::new(Status::Ok, vec![], Duration::ZERO);

        let err = write_summary(&mut ClosedPipe, &summary, false).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_summary_of_clean_run_has_no_failure_section() {
        let summary = RunSummary::new(
            Status::Ok,
            vec![leaf("only", "  ", Outcome::Skipped(None))],
            Duration::ZERO,
        );

        let mut out = Vec::new();
        write_summary(&mut out, &summary, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("Failures:"));
        assert!(text.contains("  - skipped  | 1"));
        assert!(text.contains("ALL TESTS PASSED"));
    }
}
