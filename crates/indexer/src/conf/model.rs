//! Model — IndexerConfig and related structs.

use serde::{Deserialize, Serialize};

use crate::parser::{DEFAULT_FALLBACK_FORMAT, DEFAULT_PRIMARY_FORMAT};
use crate::pipeline::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Access log to index
    pub input_path: String,
    pub primary_format: String,
    /// Catch-all format tried when the primary one does not match
    pub fallback_format: String,
    pub batch_size: usize,
    pub sink: SinkConfig,
    pub logging: LoggingConfig,
    /// When set, print these fields as CSV rows instead of indexing
    pub extract_fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Newline-delimited JSON appended to a file
    Ndjson { path: String },
    Stdout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            input_path: "".to_string(),
            primary_format: DEFAULT_PRIMARY_FORMAT.to_string(),
            fallback_format: DEFAULT_FALLBACK_FORMAT.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            sink: SinkConfig::default(),
            logging: LoggingConfig::default(),
            extract_fields: None,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Ndjson {
            path: "apachelog.ndjson".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "indexer=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn test_default_formats_and_batch_size() {
        let cfg = IndexerConfig::default();
        assert_eq!(cfg.primary_format, DEFAULT_PRIMARY_FORMAT);
        assert_eq!(cfg.fallback_format, DEFAULT_FALLBACK_FORMAT);
        assert_eq!(cfg.batch_size, 2000);
        assert!(cfg.extract_fields.is_none());
    }

    #[test]
    fn test_default_sink_is_ndjson_file() {
        let cfg = IndexerConfig::default();
        assert_eq!(cfg.sink, SinkConfig::Ndjson { path: "apachelog.ndjson".to_string() });
    }

    #[test]
    fn test_default_logging() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.level, "indexer=info");
        assert_eq!(cfg.format, LogFormat::Pretty);
    }

    // ── TOML ─────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_str = r#"
            input_path = "/var/log/httpd/access.log"
            batch_size = 500
        "#;
        let cfg: IndexerConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.input_path, "/var/log/httpd/access.log");
        assert_eq!(cfg.batch_size, 500);
        assert_eq!(cfg.primary_format, DEFAULT_PRIMARY_FORMAT);
    }

    #[test]
    fn test_deserialize_sink_and_logging() {
        let toml_str = r#"
            primary_format = '%h %l %u %t "%r" %>s %b'
            extract_fields = ["%h", "%>s"]

            [sink]
            kind = "stdout"

            [logging]
            format = "json"
        "#;
        let cfg: IndexerConfig = toml::from_str(toml_str).expect("Should parse sink table");
        assert_eq!(cfg.sink, SinkConfig::Stdout);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "indexer=info");
        assert_eq!(cfg.primary_format, r#"%h %l %u %t "%r" %>s %b"#);
        assert_eq!(cfg.extract_fields, Some(vec!["%h".to_string(), "%>s".to_string()]));
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = IndexerConfig::default();
        let toml_str = toml::to_string(&cfg).expect("Should serialize to TOML");
        let back: IndexerConfig = toml::from_str(&toml_str).expect("Should deserialize from TOML");
        assert_eq!(back, cfg);
    }
}
