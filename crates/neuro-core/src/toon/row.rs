//! Field escaping and row encoding shared by every TOON document
//! (`ir.toon`, `ir-embeddings.toon`, `patch-history.toon`).
//!
//! Three escape sequences: `\\` for a literal backslash, `\,` for a literal
//! comma, `\n` for an embedded newline. No quoting. Encoding and decoding are
//! both single left-to-right character scans, so they are exact inverses of
//! each other regardless of what a field contains (short of `|`, which
//! multi-valued columns forbid by convention rather than by escaping).

/// Escape a scalar value for use as a single TOON row field.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split one already-unindented row line into raw fields, resolving escape
/// sequences along the way. This is the sole place `\\`, `\,`, `\n` are
/// interpreted — downstream code never sees an escaped field.
pub fn parse_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('\\') => current.push('\\'),
                Some(',') => current.push(','),
                Some('n') => current.push('\n'),
                Some(other) => current.push(other),
                None => {}
            }
        } else if ch == ',' {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
}

/// Join pre-escaped fields with `,` into one row body (without the leading
/// two-space indent).
pub fn join_row(fields: &[String]) -> String {
    fields.join(",")
}

/// Parse a table header line of the shape `name[N]{f1,f2,...}:`.
pub fn parse_table_header(line: &str) -> Option<(String, Vec<String>)> {
    let line = line.trim();
    let bracket_open = line.find('[')?;
    let name = line[..bracket_open].trim().to_string();
    let rest = &line[bracket_open + 1..];
    let bracket_close = rest.find(']')?;
    let after_bracket = &rest[bracket_close + 1..];
    let brace_open = after_bracket.find('{')?;
    let brace_close = after_bracket.find('}')?;
    let fields_str = &after_bracket[brace_open + 1..brace_close];
    let fields = fields_str
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    Some((name, fields))
}

/// Encode a `|`-joined multi-valued column. Callers must ensure no element
/// contains `|`.
pub fn join_multi(values: &[String]) -> String {
    values.join("|")
}

pub fn split_multi(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split('|').filter(|s| !s.is_empty()).map(|s| s.to_string()).collect()
    }
}

pub fn bool_to_col(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

pub fn col_to_bool(raw: &str) -> bool {
    raw == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_then_parse_row_round_trips_commas_and_newlines() {
        let original = vec!["a,b".to_string(), "line1\nline2".to_string(), "plain".to_string()];
        let escaped: Vec<String> = original.iter().map(|s| escape_value(s)).collect();
        let row = join_row(&escaped);
        let parsed = parse_row(&row);
        assert_eq!(parsed, original);
    }

    #[test]
    fn escape_then_parse_row_round_trips_backslash() {
        let original = vec!["C:\\path\\to\\file".to_string()];
        let escaped: Vec<String> = original.iter().map(|s| escape_value(s)).collect();
        let parsed = parse_row(&join_row(&escaped));
        assert_eq!(parsed, original);
    }

    #[test]
    fn parse_table_header_extracts_name_count_and_fields() {
        let (name, fields) = parse_table_header("modules[3]{module_id,module_name,path}:").unwrap();
        assert_eq!(name, "modules");
        assert_eq!(fields, vec!["module_id", "module_name", "path"]);
    }

    #[test]
    fn multi_value_round_trips() {
        let values = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let joined = join_multi(&values);
        assert_eq!(joined, "a|b|c");
        assert_eq!(split_multi(&joined), values);
        assert_eq!(split_multi(""), Vec::<String>::new());
    }
}
