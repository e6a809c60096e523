//! Loading of recipient records and template files.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::domain::RecipientRecord;
use crate::errors::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads recipient records from CSV data with a header row.
///
/// Every row must carry a non-empty `email` and `group_field` value;
/// the first offending row aborts loading.
pub fn read_recipients<R: io::Read>(
    reader: R,
    group_field: &str,
) -> Result<Vec<RecipientRecord>, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    reader
        .records()
        .enumerate()
        .map(|(index, row)| {
            let row = row?;
            let fields: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(row.iter().map(str::to_string))
                .collect();
            // Header is line 1.
            RecipientRecord::try_new(fields, group_field).map_err(|e| match e {
                Error::RecipientSource(reason) => {
                    Error::RecipientSource(format!("line {}: {reason}", index + 2))
                }
                other => other,
            })
        })
        .collect()
}

/// Opens and reads the recipient file at `path`.
pub fn load_recipients(path: &Path, group_field: &str) -> Result<Vec<RecipientRecord>, Error> {
    let file = File::open(path).map_err(|e| {
        Error::RecipientSource(format!("cannot open {}: {e}", path.display()))
    })?;
    read_recipients(io::BufReader::new(file), group_field)
}

/// Reads a template file as UTF-8, ignoring a byte-order mark and
/// surrounding whitespace.
pub fn read_template(path: &Path) -> Result<String, Error> {
    let template_error = |reason: String| Error::TemplateRead {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| template_error(e.to_string()))?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    let text = std::str::from_utf8(bytes).map_err(|e| template_error(e.to_string()))?;

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupFilter;

    #[test]
    fn reads_records_in_source_order() {
        let data = "email,department,name\na@x.com,IT,Ann\nb@x.com,HR,Bob\n";
        let records = read_recipients(data.as_bytes(), "department").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].email(), "a@x.com");
        assert_eq!(records[0].group(), "IT");
        assert_eq!(records[0].fields()["name"], "Ann");
        assert_eq!(records[1].group(), "HR");
    }

    #[test]
    fn header_bom_is_ignored() {
        let data = "\u{feff}email,department\na@x.com,IT\n";
        let records = read_recipients(data.as_bytes(), "department").unwrap();
        assert_eq!(records[0].email(), "a@x.com");
    }

    #[test]
    fn custom_group_field() {
        let data = "email,team\na@x.com,Ops\n";
        let records = read_recipients(data.as_bytes(), "team").unwrap();
        assert_eq!(records[0].group(), "Ops");
    }

    #[test]
    fn group_values_are_matched_verbatim() {
        let data = "email,department\na@x.com,IT \nb@x.com,IT\n";
        let records = read_recipients(data.as_bytes(), "department").unwrap();

        assert_eq!(records[0].group(), "IT ");
        assert_eq!(records[1].group(), "IT");
        let it = GroupFilter::from("IT");
        assert!(!it.matches(&records[0]));
        assert!(it.matches(&records[1]));
    }

    #[test]
    fn blank_group_value_is_rejected() {
        let data = "email,department\na@x.com,  \n";
        assert!(matches!(
            read_recipients(data.as_bytes(), "department"),
            Err(Error::RecipientSource(_))
        ));
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let data = "email,name\na@x.com,Ann\n";
        let err = read_recipients(data.as_bytes(), "department").unwrap_err();
        match err {
            Error::RecipientSource(reason) => assert!(reason.contains("line 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_source_yields_no_records() {
        let records = read_recipients("email,department\n".as_bytes(), "department").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn template_is_trimmed_and_bom_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject.txt");
        std::fs::write(&path, b"\xEF\xBB\xBF  Hi #name#\n").unwrap();

        assert_eq!(read_template(&path).unwrap(), "Hi #name#");
    }

    #[test]
    fn unreadable_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.html");
        assert!(matches!(
            read_template(&missing),
            Err(Error::TemplateRead { .. })
        ));

        let invalid = dir.path().join("invalid.html");
        std::fs::write(&invalid, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            read_template(&invalid),
            Err(Error::TemplateRead { .. })
        ));
    }
}
