pub use super::model::{FieldMap, LineParseError};

pub trait LineParser: Send + Sync {
    /// parse a single log line into its captured fields
    fn parse(&self, line: &str) -> Result<FieldMap, LineParseError>;
    fn pattern(&self) -> &str;
}
