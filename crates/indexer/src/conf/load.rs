//! Load — config loading from file and environment variables.

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::{IndexerConfig, SinkConfig};
use crate::parser::CompiledFormat;

impl IndexerConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("INDEXER_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/indexer/indexer.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config file {}", path))
    }

    /// Apply `INDEXER_*` overrides; `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = lookup("INDEXER_INPUT") {
            self.input_path = input;
        }
        if let Some(format) = lookup("INDEXER_PRIMARY_FORMAT") {
            self.primary_format = format;
        }
        if let Some(format) = lookup("INDEXER_FALLBACK_FORMAT") {
            self.fallback_format = format;
        }
        if let Some(size) = lookup("INDEXER_BATCH_SIZE").and_then(|s| s.parse().ok()) {
            self.batch_size = size;
        }
        if let Some(output) = lookup("INDEXER_OUTPUT") {
            self.sink = if output == "-" {
                SinkConfig::Stdout
            } else {
                SinkConfig::Ndjson { path: output }
            };
        }
        if let Some(fields) = lookup("INDEXER_EXTRACT_FIELDS") {
            self.extract_fields = Some(fields.split_whitespace().map(str::to_string).collect());
        }
    }

    /// Validate that the input exists and the formats compile
    pub fn validate(&self) -> Result<()> {
        if self.input_path.is_empty() {
            bail!("input_path must not be empty");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be > 0");
        }
        if !Path::new(&self.input_path).exists() {
            bail!("Input log not found at: {}", self.input_path);
        }
        CompiledFormat::compile(&self.primary_format).context("primary_format does not compile")?;
        CompiledFormat::compile(&self.fallback_format).context("fallback_format does not compile")?;
        if let Some(fields) = &self.extract_fields {
            if fields.is_empty() {
                bail!("extract_fields must name at least one field when set");
            }
        }
        if let SinkConfig::Ndjson { path } = &self.sink {
            if path.is_empty() {
                bail!("sink.path must not be empty");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn with_input() -> (tempfile::NamedTempFile, IndexerConfig) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = IndexerConfig {
            input_path: file.path().display().to_string(),
            ..Default::default()
        };
        (file, cfg)
    }

    #[test]
    fn test_overrides_replace_values() {
        let mut cfg = IndexerConfig::default();
        cfg.apply_overrides(lookup(&[
            ("INDEXER_INPUT", "/tmp/access.log"),
            ("INDEXER_BATCH_SIZE", "50"),
            ("INDEXER_OUTPUT", "-"),
            ("INDEXER_EXTRACT_FIELDS", "%h  %>s"),
        ]));
        assert_eq!(cfg.input_path, "/tmp/access.log");
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.sink, SinkConfig::Stdout);
        assert_eq!(cfg.extract_fields, Some(vec!["%h".to_string(), "%>s".to_string()]));
    }

    #[test]
    fn test_unparseable_batch_size_is_ignored() {
        let mut cfg = IndexerConfig::default();
        cfg.apply_overrides(lookup(&[("INDEXER_BATCH_SIZE", "lots")]));
        assert_eq!(cfg.batch_size, 2000);
    }

    #[test]
    fn test_output_path_override() {
        let mut cfg = IndexerConfig::default();
        cfg.apply_overrides(lookup(&[("INDEXER_OUTPUT", "/data/out.ndjson")]));
        assert_eq!(cfg.sink, SinkConfig::Ndjson { path: "/data/out.ndjson".to_string() });
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "input_path = \"/var/log/access.log\"\nbatch_size = 10").unwrap();
        let cfg = IndexerConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.input_path, "/var/log/access.log");
        assert_eq!(cfg.batch_size, 10);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = \"many\"").unwrap();
        assert!(IndexerConfig::from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_defaults_with_input() {
        let (_file, cfg) = with_input();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_input() {
        let err = IndexerConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("input_path"), "{}", err);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let (_file, mut cfg) = with_input();
        cfg.batch_size = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"), "{}", err);
    }

    #[test]
    fn test_validate_rejects_empty_format() {
        let (_file, mut cfg) = with_input();
        cfg.fallback_format = "   ".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("fallback_format"), "{}", err);
    }
}
