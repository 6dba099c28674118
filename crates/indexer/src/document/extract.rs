//! Extract — render selected raw fields as one CSV-style row per line.

use crate::parser::FieldMap;

/// `"v1","v2",...` in the order of `names`; absent fields render as `""`.
pub fn render_row(fields: &FieldMap, names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{}\"", fields.get_by_name(name).unwrap_or("")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CompiledFormat, LineParser};

    #[test]
    fn test_render_selected_fields_in_order() {
        let format = CompiledFormat::compile(r#"%h %l %u %t "%r" %>s %b"#).unwrap();
        let fields = format
            .parse(r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#)
            .unwrap();
        let names = vec!["%r".to_string(), "%>s".to_string(), "%u".to_string()];
        assert_eq!(render_row(&fields, &names), r#""GET /apache_pb.gif HTTP/1.0","200","frank""#);
    }

    #[test]
    fn test_render_missing_field_is_empty() {
        let fields = FieldMap::new();
        assert_eq!(render_row(&fields, &["%D".to_string()]), r#""""#);
    }
}
