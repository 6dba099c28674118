//! Two-tier classification: strict primary format, then a permissive fallback.
//!
//! Access-log streams interleave well-formed request lines with syslog framing
//! lines and truncated fragments. A line the primary format rejects gets a
//! second chance against the fallback format; only a line rejected by both is
//! dropped.

use super::format::CompiledFormat;
use super::model::{FieldMap, LineParseError};
use super::traits::LineParser;

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Matched the primary format.
    Valid(FieldMap),
    /// Primary failed, fallback matched. Indexable, flagged not-valid.
    Invalid {
        fields: FieldMap,
        primary: LineParseError,
    },
    /// Neither format matched; the line is not indexed.
    Dropped {
        primary: LineParseError,
        secondary: LineParseError,
    },
}

#[derive(Debug, Clone)]
pub struct FallbackClassifier {
    primary: CompiledFormat,
    fallback: CompiledFormat,
}

impl FallbackClassifier {
    pub fn new(primary: CompiledFormat, fallback: CompiledFormat) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &CompiledFormat {
        &self.primary
    }

    pub fn fallback(&self) -> &CompiledFormat {
        &self.fallback
    }

    pub fn classify(&self, line: &str) -> Classification {
        let primary = match self.primary.parse(line) {
            Ok(fields) => return Classification::Valid(fields),
            Err(e) => e,
        };

        match self.fallback.parse(line) {
            Ok(fields) => Classification::Invalid { fields, primary },
            Err(secondary) => Classification::Dropped { primary, secondary },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::model::FieldKey;

    fn classifier() -> FallbackClassifier {
        FallbackClassifier::new(
            CompiledFormat::compile(r#"%h %l %u %t "%r" %>s %b"#).unwrap(),
            CompiledFormat::compile("%syslog_ti %syslog_ws %syslog_n %_").unwrap(),
        )
    }

    #[test]
    fn test_primary_match_is_valid() {
        let result = classifier()
            .classify(r#"10.0.0.1 - - [01/Feb/2026:12:00:00 +0000] "GET /missing HTTP/1.1" 404 0"#);
        match result {
            Classification::Valid(fields) => assert_eq!(fields.get(&FieldKey::Status), Some("404")),
            other => panic!("expected valid, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_match_is_invalid() {
        let line = "2026-02-01T12:00:00+00:00 web01 httpd: truncated \"GET /x HTT";
        match classifier().classify(line) {
            Classification::Invalid { fields, primary } => {
                assert_eq!(fields.get(&FieldKey::SyslogServer), Some("web01"));
                assert_eq!(primary.line, line);
            }
            other => panic!("expected invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_no_match_is_dropped() {
        match classifier().classify("garbage") {
            Classification::Dropped { primary, secondary } => {
                assert_eq!(primary.pattern, classifier().primary().pattern());
                assert_eq!(secondary.pattern, classifier().fallback().pattern());
            }
            other => panic!("expected dropped, got {:?}", other),
        }
    }
}
