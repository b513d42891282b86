// Reading and writing survey tables as CSV text.
//
// The reader is line oriented and permissive: it never fails. A quoted field
// cannot span lines, an unterminated quote runs to the end of its line, and rows
// of the wrong width are padded or truncated to the header.

use log::debug;

use crate::config::{trim_ws, Record, Table};

const BOM: char = '\u{feff}';

/// Parses a whole CSV document into a table.
///
/// The first line is the header. Every later line is trimmed, and lines that are
/// blank after trimming are skipped. The header line itself is not trimmed.
pub fn parse_table(content: &str) -> Table {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut lines = content.split('\n');
    let headers = parse_line(lines.next().unwrap_or(""));
    debug!("parse_table: headers: {:?}", headers);

    let records: Vec<Record> = lines
        .map(trim_ws)
        .filter(|line| !line.is_empty())
        .map(|line| Record::from_values(&headers, parse_line(line)))
        .collect();
    debug!("parse_table: {} records", records.len());
    Table { headers, records }
}

/// Splits one line into its fields.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Quotes a field if it contains a comma, a double quote or a newline.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Serializes the table: the header row, then every record in header order.
///
/// Rows are joined with a newline and there is no trailing newline.
pub fn write_table(table: &Table) -> String {
    let header_line = join_fields(table.headers.iter().map(|h| h.as_str()));
    let mut lines: Vec<String> = Vec::with_capacity(table.records.len() + 1);
    lines.push(header_line);
    for record in table.records.iter() {
        lines.push(join_fields(table.headers.iter().map(|h| record.get(h))));
    }
    lines.join("\n")
}

fn join_fields<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(escape_field).collect::<Vec<String>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_line_plain() {
        assert_eq!(parse_line("a,b,,c"), strings(&["a", "b", "", "c"]));
        assert_eq!(parse_line(""), strings(&[""]));
    }

    #[test]
    fn parse_line_quotes() {
        assert_eq!(
            parse_line(r#""Smith, Jo","say ""hi""",x"#),
            strings(&["Smith, Jo", r#"say "hi""#, "x"])
        );
        // Quotes in the middle of a field only toggle the state.
        assert_eq!(parse_line(r#"ab"c,d"e"#), strings(&["abc,de"]));
    }

    #[test]
    fn parse_line_unterminated_quote() {
        assert_eq!(parse_line(r#"a,"b,c"#), strings(&["a", "b,c"]));
        assert_eq!(parse_line(r#"""""#), strings(&["\""]));
    }

    #[test]
    fn parse_table_strips_bom_and_skips_blank_lines() {
        let table = parse_table("\u{feff}Username,Email address\nAlice,a@x.com\n\n   \nBob,b@y.com\n");
        assert_eq!(table.headers, strings(&["Username", "Email address"]));
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1].get("Username"), "Bob");
        assert_eq!(table.records[1].get("Email address"), "b@y.com");
    }

    #[test]
    fn stray_bom_line_is_blank() {
        let table = parse_table("Username,Email address\nAlice,a@x.com\n\u{feff}\n\u{feff}Bob,b@y.com\u{feff}");
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1].get("Username"), "Bob");
        assert_eq!(table.records[1].get("Email address"), "b@y.com");
    }

    #[test]
    fn quoted_trailing_space_is_lost_on_reread() {
        // The writer only quotes commas, quotes and newlines, and data lines are
        // trimmed on reading, so trailing spaces of a last field do not survive.
        let table = parse_table("Username,Notes\nAlice,\"North \"");
        assert_eq!(table.records[0].get("Notes"), "North ");
        let written = write_table(&table);
        assert_eq!(written, "Username,Notes\nAlice,North ");
        assert_eq!(parse_table(&written).records[0].get("Notes"), "North");
    }

    #[test]
    fn parse_table_ragged_rows() {
        let table = parse_table("A,B,C\n1\n1,2,3,4");
        assert_eq!(table.records[0].get("A"), "1");
        assert_eq!(table.records[0].get("B"), "");
        assert_eq!(table.records[0].get("C"), "");
        assert_eq!(table.records[1].get("C"), "3");
        assert_eq!(write_table(&table), "A,B,C\n1,,\n1,2,3");
    }

    #[test]
    fn parse_table_trims_data_lines_but_not_header() {
        let table = parse_table("A,B\r\n x,y \r\n");
        assert_eq!(table.headers, strings(&["A", "B\r"]));
        assert_eq!(table.records[0].get("A"), "x");
        assert_eq!(table.records[0].get("B\r"), "y");
    }

    #[test]
    fn empty_content() {
        let table = parse_table("");
        assert_eq!(table.headers, strings(&[""]));
        assert!(table.records.is_empty());
        assert_eq!(write_table(&table), "");
    }

    #[test]
    fn escape_only_when_needed() {
        assert_eq!(escape_field("plain text"), "plain text");
        assert_eq!(escape_field(""), "");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        // Carriage returns alone do not trigger quoting.
        assert_eq!(escape_field("a\rb"), "a\rb");
    }

    #[test]
    fn escaped_fields_parse_back() {
        for field in ["a,b", "say \"hi\"", "two\nlines", "\",\"", "trailing,"] {
            let line = format!("{},{}", escape_field(field), escape_field("next"));
            assert_eq!(parse_line(&line), strings(&[field, "next"]));
        }
    }

    #[test]
    fn write_keeps_header_order() {
        let table = parse_table("Email address,Username,Notes\na@x.com,Alice,\"likes, commas\"");
        assert_eq!(
            write_table(&table),
            "Email address,Username,Notes\na@x.com,Alice,\"likes, commas\""
        );
    }
}
