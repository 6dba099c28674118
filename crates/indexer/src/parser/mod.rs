/// Access-log format compilation and line parsing
///
/// # Architecture
///
/// - `format.rs`: Apache `LogFormat` string -> anchored regex ([`CompiledFormat`])
/// - `line.rs`: applies a compiled format to one line ([`LineParser`])
/// - `classify.rs`: primary / fallback two-tier classification
/// - `model.rs`: typed field keys, field maps and parse errors

pub mod traits;
pub mod format;
pub mod line;
pub mod classify;
pub mod model;

// Re-export commonly used types
pub use traits::LineParser;
pub use format::{AliasFn, CompiledFormat, FormatCompiler, Subpattern, Token};
pub use classify::{Classification, FallbackClassifier};
pub use model::{FieldKey, FieldMap, FieldValueError, FormatCompileError, LineParseError};

/// Lines longer than this are dropped before matching
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB

// Default formats: syslog-framed combined log with forwarded-for, host and timing
pub const DEFAULT_PRIMARY_FORMAT: &str = r#"%syslog_ti %syslog_ws %syslog_n %{X-Forwarded-For}i %l %u %t %{Host}i "%r" %>s %b "%{Referer}i" "%{User-Agent}i" %D"#;
pub const DEFAULT_FALLBACK_FORMAT: &str = "%syslog_ti %syslog_ws %syslog_n %_";
