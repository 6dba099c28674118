//! Extract — print selected fields of every parsed line, one row per line.

use std::io::{BufRead, Write};

use tracing::warn;

use super::run::IngestError;
use crate::document::extract::render_row;
use crate::parser::{CompiledFormat, LineParser};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub processed: u64,
    pub rows: u64,
    pub skipped: u64,
}

/// Parse every line of `reader` with `format` and write the `names` columns to `out`.
/// Lines that do not match are reported and skipped.
pub fn run_extract<R: BufRead, W: Write>(
    format: &CompiledFormat,
    names: &[String],
    reader: R,
    name: &str,
    mut out: W,
) -> Result<ExtractSummary, IngestError> {
    let mut summary = ExtractSummary::default();

    for line in reader.lines() {
        let line = line.map_err(|source| IngestError::Source {
            name: name.to_string(),
            source,
        })?;
        summary.processed += 1;

        match format.parse(&line) {
            Ok(fields) => {
                writeln!(out, "{}", render_row(&fields, names)).map_err(IngestError::Output)?;
                summary.rows += 1;
            }
            Err(e) => {
                warn!("Skipping line {}: {}", summary.processed, e);
                summary.skipped += 1;
            }
        }
    }

    out.flush().map_err(IngestError::Output)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_extract_rows_and_skips() {
        let format = CompiledFormat::compile(r#"%h %l %u %t "%r" %>s %b"#).unwrap();
        let input = concat!(
            "127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] \"GET /apache_pb.gif HTTP/1.0\" 200 2326\n",
            "not a log line\n",
            "10.0.0.1 - - [01/Feb/2026:12:00:00 +0000] \"GET /missing HTTP/1.1\" 404 0\n",
        );
        let names = vec!["%r".to_string(), "%>s".to_string()];
        let mut out = Vec::new();

        let summary = run_extract(&format, &names, Cursor::new(input), "test", &mut out).unwrap();

        assert_eq!(summary, ExtractSummary { processed: 3, rows: 2, skipped: 1 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"GET /apache_pb.gif HTTP/1.0\",\"200\"\n\"GET /missing HTTP/1.1\",\"404\"\n"
        );
    }
}
