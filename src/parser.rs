//! Input file parsing: header check and account rows.
//!
//! The input is `;`-delimited with no quoting or escaping. Fields are taken
//! verbatim; only the field count is validated.

use crate::account::AccountRecord;
use crate::diagnostics::Diagnostics;
use crate::error::{BatchError, Result};
use csv::{ReaderBuilder, StringRecord, Terminator};
use std::io::Read;

/// Field delimiter of the input file.
pub const DELIMITER: char = ';';

/// Exact first line every input file must start with.
pub const EXPECTED_HEADER: &str = "link;user;secret";

/// Checks the first line of the input against [`EXPECTED_HEADER`].
///
/// The comparison is exact: case-sensitive and without trimming.
pub fn validate_header(line: &str) -> Result<()> {
    if line == EXPECTED_HEADER {
        Ok(())
    } else {
        Err(BatchError::HeaderMismatch {
            expected: EXPECTED_HEADER.to_string(),
            found: line.to_string(),
        })
    }
}

/// Parses one data line into a pending [`AccountRecord`].
///
/// The line must split into exactly three fields: endpoint, user, secret.
pub fn parse_row(line: &str) -> Result<AccountRecord> {
    parse_numbered_row(line, 0)
}

fn parse_numbered_row(line: &str, line_number: usize) -> Result<AccountRecord> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    match fields.as_slice() {
        [endpoint, user, secret] => Ok(AccountRecord::new(*endpoint, *user, *secret)),
        _ => Err(BatchError::Parse {
            line_number,
            line: line.to_string(),
        }),
    }
}

/// Rebuilds the raw line of a record. Quoting is disabled, so this is lossless
/// apart from the `\r` of a CRLF line ending, which is dropped.
fn raw_line(record: &StringRecord) -> String {
    let line = record
        .iter()
        .collect::<Vec<_>>()
        .join(DELIMITER.to_string().as_str());
    match line.strip_suffix('\r') {
        Some(stripped) => stripped.to_string(),
        None => line,
    }
}

/// 1-based line a record starts on.
fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

/// The reader drops empty lines; this is how one surfaces as a row.
fn blank_line(line_number: usize) -> BatchError {
    BatchError::Parse {
        line_number,
        line: String::new(),
    }
}

/// Reads the header and every data row from `reader`, in file order.
///
/// Stops at the first structural problem: a wrong header is reported before
/// any row is looked at, and a malformed row discards everything parsed so
/// far. An empty line is a malformed row like any other.
pub fn read_accounts<R: Read>(
    reader: R,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<AccountRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(DELIMITER as u8)
        .terminator(Terminator::Any(b'\n'))
        .quoting(false)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = StringRecord::new();

    // A record past line 1 means the file starts with an empty line.
    let header = match csv_reader.read_record(&mut record)? {
        true if line_of(&record) == 1 => raw_line(&record),
        _ => String::new(),
    };
    diagnostics.info(&format!("first line of input is '{}'", header));
    validate_header(&header)?;

    let mut next_line = 2;
    let mut accounts = Vec::new();
    while csv_reader.read_record(&mut record)? {
        let line_number = line_of(&record);
        if line_number > next_line {
            return Err(blank_line(next_line));
        }
        let line = raw_line(&record);
        diagnostics.info(&format!("reading line {}: '{}'", line_number, line));
        accounts.push(parse_numbered_row(&line, line_number)?);
        next_line = line_number + 1;
    }

    // Empty lines after the last row leave the reader further down the file.
    if csv_reader.position().line() as usize > next_line {
        return Err(blank_line(next_line));
    }

    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;

    #[derive(Default)]
    struct Recorder {
        lines: RefCell<Vec<String>>,
    }

    impl Diagnostics for Recorder {
        fn info(&self, message: &str) {
            self.lines.borrow_mut().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.lines.borrow_mut().push(message.to_string());
        }
    }

    fn read(input: &str) -> Result<Vec<AccountRecord>> {
        read_accounts(Cursor::new(input), &Recorder::default())
    }

    #[test]
    fn test_parse_row_positional_fields() {
        let rec = parse_row("https://a.example;alice;s1").unwrap();
        assert_eq!(rec.endpoint, "https://a.example");
        assert_eq!(rec.user, "alice");
        assert_eq!(rec.secret, "s1");
        assert!(rec.is_pending());
    }

    #[test]
    fn test_parse_row_keeps_whitespace_and_empty_fields() {
        let rec = parse_row(" https://a.example ;;").unwrap();
        assert_eq!(rec.endpoint, " https://a.example ");
        assert_eq!(rec.user, "");
        assert_eq!(rec.secret, "");
    }

    #[test]
    fn test_parse_row_rejects_wrong_field_count() {
        for line in ["https://a.example;alice", "a;b;c;d", ""] {
            match parse_row(line) {
                Err(BatchError::Parse { line: raw, .. }) => assert_eq!(raw, line),
                other => panic!("Expected Parse error for '{}', got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_parse_row_does_not_unquote() {
        let rec = parse_row("\"https://a.example\";alice;\"s;1\"");
        assert!(rec.is_err(), "quoted delimiter must still split");
    }

    #[test]
    fn test_validate_header_is_exact() {
        assert!(validate_header(EXPECTED_HEADER).is_ok());
        for bad in ["Link;user;secret", "link;user;secret ", "link,user,secret", ""] {
            assert!(matches!(
                validate_header(bad),
                Err(BatchError::HeaderMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_read_accounts_in_file_order() {
        let accounts = read(
            "link;user;secret\nhttps://a.example;alice;s1\nhttps://b.example;bob;s2\n",
        )
        .unwrap();
        let endpoints: Vec<_> = accounts.iter().map(|a| a.endpoint.as_str()).collect();
        assert_eq!(endpoints, ["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_read_accounts_handles_crlf() {
        let accounts = read("link;user;secret\r\nhttps://a.example;alice;s1\r\n").unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].secret, "s1");
    }

    #[test]
    fn test_read_accounts_header_only() {
        assert!(read("link;user;secret\n").unwrap().is_empty());
    }

    #[test]
    fn test_read_accounts_empty_input_is_header_mismatch() {
        match read("") {
            Err(BatchError::HeaderMismatch { found, .. }) => assert_eq!(found, ""),
            other => panic!("Expected HeaderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_read_accounts_wrong_header_stops_before_rows() {
        let recorder = Recorder::default();
        let result = read_accounts(
            Cursor::new("url;username;password\nbroken\n"),
            &recorder,
        );
        assert!(matches!(result, Err(BatchError::HeaderMismatch { .. })));
        assert!(recorder
            .lines
            .borrow()
            .iter()
            .all(|l| !l.starts_with("reading line")));
    }

    #[test]
    fn test_read_accounts_malformed_row_reports_line_number() {
        let result = read("link;user;secret\nhttps://a.example;alice;s1\nhttps://b.example;bob\n");
        match result {
            Err(BatchError::Parse { line_number, line }) => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "https://b.example;bob");
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_accounts_blank_line_between_rows_is_malformed() {
        let result = read(
            "link;user;secret\nhttps://a.example;alice;s1\n\nhttps://b.example;bob;s2\n",
        );
        match result {
            Err(BatchError::Parse { line_number, line }) => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "");
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_accounts_blank_crlf_line_is_malformed() {
        let result = read("link;user;secret\r\n\r\nhttps://a.example;alice;s1\r\n");
        assert!(matches!(
            result,
            Err(BatchError::Parse { line_number: 2, .. })
        ));
    }

    #[test]
    fn test_read_accounts_trailing_blank_lines_are_malformed() {
        let result = read("link;user;secret\nhttps://a.example;alice;s1\n\n\n");
        assert!(matches!(
            result,
            Err(BatchError::Parse { line_number: 3, .. })
        ));
    }

    #[test]
    fn test_read_accounts_without_final_newline() {
        let accounts = read("link;user;secret\nhttps://a.example;alice;s1").unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_read_accounts_leading_blank_line_is_header_mismatch() {
        match read("\nlink;user;secret\nhttps://a.example;alice;s1\n") {
            Err(BatchError::HeaderMismatch { found, .. }) => assert_eq!(found, ""),
            other => panic!("Expected HeaderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_read_accounts_keeps_carriage_return_inside_field() {
        let accounts = read("link;user;secret\nhttps://a.example;alice;s\r1\n").unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].secret, "s\r1");
    }
}
