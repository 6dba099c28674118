//! Line parser — applies a [`CompiledFormat`] to one log line.

use super::format::CompiledFormat;
use super::model::{FieldMap, LineParseError};
use super::traits::LineParser;

impl LineParser for CompiledFormat {
    fn parse(&self, line: &str) -> Result<FieldMap, LineParseError> {
        let text = line.trim();

        // Anchored at both ends, so a match always spans the whole trimmed line
        let caps = self.regex().captures(text).ok_or_else(|| LineParseError {
            line: line.to_string(),
            pattern: self.pattern().to_string(),
        })?;

        let mut fields = FieldMap::new();
        for (key, group) in self.keys().iter().zip(caps.iter().skip(1)) {
            // Optional groups (`%_`) that did not participate stay absent
            if let Some(m) = group {
                fields.insert(key.clone(), m.as_str());
            }
        }
        Ok(fields)
    }

    fn pattern(&self) -> &str {
        CompiledFormat::pattern(self)
    }
}
