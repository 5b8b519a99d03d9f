//! Minimal CSV reader (quotes + CRLF tolerant)

use std::mem::take;

/// One parsed record and the 1-based line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub cells: Vec<String>,
}

impl CsvRecord {
    /// True when every cell is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Split `text` into records. Quoted fields may contain separators, doubled
/// quotes and newlines. Blank lines are dropped.
pub fn parse_records(text: &str, sep: char) -> Vec<CsvRecord> {
    let mut records = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    records.push(CsvRecord {
                        line: row_start,
                        cells: take(&mut row),
                    });
                } else {
                    row.clear();
                }
                line += 1;
                row_start = line;
            }
            '\n' => {
                line += 1;
                field.push(ch);
            }
            _ => field.push(ch),
        }
    }

    // Flush a trailing row without newline, even if quotes were unterminated
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        records.push(CsvRecord {
            line: row_start,
            cells: row,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(records: &[CsvRecord]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|r| r.cells.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_quoted_fields_and_crlf() {
        let text = "a,\"b, c\",d\r\n\"say \"\"hi\"\"\",,x\r\n";
        let records = parse_records(text, ',');
        assert_eq!(
            cells(&records),
            vec![vec!["a", "b, c", "d"], vec!["say \"hi\"", "", "x"]]
        );
    }

    #[test]
    fn test_blank_lines_skipped_and_lines_tracked() {
        let text = "h1,h2\n\nv1,v2\nlast,row";
        let records = parse_records(text, ',');
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[2].line, 4);
        assert_eq!(records[2].cells, vec!["last", "row"]);
    }

    #[test]
    fn test_multiline_quoted_field_keeps_start_line() {
        let text = "a,\"one\ntwo\"\nb,c\n";
        let records = parse_records(text, ',');
        assert_eq!(records[0].cells[1], "one\ntwo");
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let records = parse_records("\u{feff}type,name\n", ',');
        assert_eq!(records[0].cells[0], "type");
    }
}
