//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Tests for `RunConfig` TOML loading and `TestOptions` deserialization.
//!
//! 测试 `RunConfig` 的 TOML 加载以及 `TestOptions` 的反序列化。

use quicktap::{Directive, DirectiveFlag, RunConfig, TestOptions};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[cfg(test)]
mod run_config_tests {
    use super::*;

    #[test]
    fn test_full_run_config_parses() {
        let config = RunConfig::from_toml_str(
            r#"
            timeout_ms = 1500
            concurrency = 4
            details = true
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.concurrency, Some(4));
        assert!(config.details);
    }

    #[test]
    fn test_empty_run_config_uses_defaults() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.timeout, None);
        assert!(!config.details);
    }

    #[test]
    fn test_run_config_serialization_omits_unset_values() {
        let config = RunConfig {
            timeout: Some(Duration::from_millis(250)),
            concurrency: None,
            details: false,
        };

        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains("timeout_ms = 250"));
        assert!(!toml_str.contains("concurrency"));
        assert_eq!(RunConfig::from_toml_str(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = RunConfig::from_toml_str("timeout_ms = \"soon\"");
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to parse run configuration"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "concurrency = 2").unwrap();

        let config = RunConfig::load(file.path()).unwrap();

        assert_eq!(config.concurrency, Some(2));
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let message = format!("{:#}", RunConfig::load(&path).unwrap_err());

        assert!(message.contains("Failed to read configuration file"));
        assert!(message.contains("absent.toml"));
    }
}

#[cfg(test)]
mod test_options_tests {
    use super::*;

    #[test]
    fn test_options_default_to_plain_node() {
        let options = TestOptions::default();
        assert_eq!(options.timeout, None);
        assert!(!options.only);
        assert!(options.signal.is_none());
        assert_eq!(options.directive(), Directive::None);
    }

    #[test]
    fn test_options_accept_bool_or_reason_flags() {
        let options: TestOptions = toml::from_str(
            r#"
            skip = "needs network"
            todo = true
            only = true
            timeout_ms = 20
            "#,
        )
        .unwrap();

        assert_eq!(options.skip, DirectiveFlag::Reason("needs network".to_string()));
        assert_eq!(options.todo, DirectiveFlag::Enabled(true));
        assert!(options.only);
        assert_eq!(options.timeout, Some(Duration::from_millis(20)));
        assert_eq!(
            options.directive(),
            Directive::Skip(Some("needs network".to_string()))
        );
    }

    #[test]
    fn test_builder_sets_every_field() {
        let options = TestOptions::new()
            .todo("later")
            .timeout(Duration::from_secs(1))
            .concurrency(3);

        assert_eq!(options.directive(), Directive::Todo(Some("later".to_string())));
        assert_eq!(options.timeout, Some(Duration::from_secs(1)));
        assert_eq!(options.concurrency, Some(3));
    }
}
