//! Spreadsheet parsing for the bulk user import.
//!
//! The first worksheet is read with a header row mapping columns to fields;
//! header matching is case-insensitive and tolerates both `phoneNumber` and
//! `phone_number` spellings. Row-level validation happens in the users
//! service so one bad row never aborts the batch.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::utils::errors::AppError;

/// One parsed spreadsheet row, prior to validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone_number: Option<String>,
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn cell_to_string(cell: &Data) -> Option<String> {
    let value = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // phone numbers imported as numeric cells come through as floats
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => return None,
    };

    if value.is_empty() { None } else { Some(value) }
}

/// Parse the first worksheet of an xlsx document into import rows.
pub fn parse_user_rows(bytes: &[u8]) -> Result<Vec<ImportRow>, AppError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Could not read spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Spreadsheet has no worksheets")))?
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Could not read worksheet: {}", e)))?;

    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Spreadsheet is empty")))?
        .iter()
        .map(|cell| cell_to_string(cell).map(|h| normalize_header(&h)).unwrap_or_default())
        .collect();

    let mut parsed = Vec::new();

    for row in rows {
        let mut record = ImportRow::default();
        let mut any_value = false;

        for (idx, cell) in row.iter().enumerate() {
            let Some(value) = cell_to_string(cell) else {
                continue;
            };
            any_value = true;

            match headers.get(idx).map(String::as_str) {
                Some("name") => record.name = Some(value),
                Some("email") => record.email = Some(value),
                Some("password") => record.password = Some(value),
                Some("role") => record.role = Some(value),
                Some("phonenumber") => record.phone_number = Some(value),
                _ => {}
            }
        }

        if any_value {
            parsed.push(record);
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_variants() {
        assert_eq!(normalize_header("phoneNumber"), "phonenumber");
        assert_eq!(normalize_header("phone_number"), "phonenumber");
        assert_eq!(normalize_header(" Email "), "email");
        assert_eq!(normalize_header("PASSWORD"), "password");
    }

    #[test]
    fn test_cell_to_string_conversions() {
        assert_eq!(
            cell_to_string(&Data::String("  alice  ".to_string())),
            Some("alice".to_string())
        );
        assert_eq!(
            cell_to_string(&Data::Float(5551234567.0)),
            Some("5551234567".to_string())
        );
        assert_eq!(cell_to_string(&Data::Int(42)), Some("42".to_string()));
        assert_eq!(cell_to_string(&Data::String("   ".to_string())), None);
        assert_eq!(cell_to_string(&Data::Empty), None);
    }
}
