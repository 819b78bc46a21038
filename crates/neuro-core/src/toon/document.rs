//! Generic line-oriented TOON document parsing, shared by the RIR,
//! embedding-store, and patch-history documents. Each document is a header
//! object (`repo:` / `store:` / `patch_history:`) of scalar `key: value`
//! lines followed by zero or more tables (`name[N]{f1,f2,...}:` plus
//! indented rows). A blank line ends the header or the current table.

use std::collections::HashMap;

use super::row::{parse_row, parse_table_header};

#[derive(Debug, Default)]
pub struct ToonDocument {
    pub header: HashMap<String, String>,
    pub tables: HashMap<String, Vec<HashMap<String, String>>>,
}

impl ToonDocument {
    pub fn table(&self, name: &str) -> &[HashMap<String, String>] {
        self.tables.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn header_get<'a>(&'a self, key: &str) -> Option<&'a str> {
        self.header.get(key).map(|s| s.as_str())
    }
}

/// Parse a TOON document. `header_tag` is the object key that opens the
/// header block (e.g. `"repo"`, `"store"`, `"patch_history"`).
pub fn parse_document(text: &str, header_tag: &str) -> ToonDocument {
    let mut doc = ToonDocument::default();
    let open_tag = format!("{header_tag}:");

    let mut in_header = false;
    let mut current_table: Option<String> = None;
    let mut current_fields: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let stripped = raw_line.trim();

        if stripped.is_empty() {
            in_header = false;
            continue;
        }

        if stripped == open_tag {
            in_header = true;
            current_table = None;
            continue;
        }

        if in_header {
            if let Some((key, value)) = stripped.split_once(':') {
                doc.header.insert(key.trim().to_string(), value.trim().to_string());
                continue;
            }
        }

        if !raw_line.starts_with(' ') && raw_line.contains('[') && raw_line.contains('{') && raw_line.ends_with(':') {
            if let Some((name, fields)) = parse_table_header(raw_line) {
                doc.tables.entry(name.clone()).or_default();
                current_table = Some(name);
                current_fields = fields;
            }
            continue;
        }

        if let Some(table_name) = &current_table {
            if raw_line.starts_with(' ') {
                let values = parse_row(stripped);
                let mut row = HashMap::with_capacity(current_fields.len());
                for (i, field) in current_fields.iter().enumerate() {
                    row.insert(field.clone(), values.get(i).cloned().unwrap_or_default());
                }
                doc.tables.get_mut(table_name).unwrap().push(row);
            }
        }
    }

    doc
}

/// Helper for row lookup with a default when the column was absent from an
/// older document.
pub fn col<'a>(row: &'a HashMap<String, String>, key: &str) -> &'a str {
    row.get(key).map(|s| s.as_str()).unwrap_or("")
}
