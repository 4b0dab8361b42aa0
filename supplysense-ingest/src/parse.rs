use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use supplysense_core::NewSalesRecord;

use crate::error::IngestError;

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Product Name",
    "Date",
    "Quantity Sold",
    "Unit Price",
    "Current Stock",
    "Reorder Point",
];

pub const PREVIEW_ROWS: usize = 20;

const MAX_READ_ERRORS: usize = 3;
const MAX_REPORTED_ERRORS: usize = 5;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A CSV file whose every row passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedCsv {
    file_name: String,
    records: Vec<NewSalesRecord>,
}

impl ParsedCsv {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[NewSalesRecord] {
        &self.records
    }

    /// The first rows, as shown before the user confirms the import.
    pub fn preview(&self) -> &[NewSalesRecord] {
        &self.records[..self.records.len().min(PREVIEW_ROWS)]
    }
}

struct ColumnIndex([usize; 6]);

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, Vec<String>> {
        let names: Vec<&str> = headers
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}'))
            .collect();

        let mut indices = [0; 6];
        let mut missing = Vec::new();
        for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
            match names.iter().position(|name| name == column) {
                Some(index) => indices[slot] = index,
                None => missing.push(*column),
            }
        }

        if missing.is_empty() {
            Ok(Self(indices))
        } else {
            Err(vec![format!("Missing columns: {}", missing.join(", "))])
        }
    }

    fn field<'r>(&self, record: &'r StringRecord, slot: usize) -> &'r str {
        record.get(self.0[slot]).unwrap_or("")
    }
}

/// Parses and validates a sales CSV.
///
/// Nothing is returned unless every row is valid; the error lists at most five
/// problems plus a count of the rest.
pub fn parse_csv(file_name: &str, bytes: &[u8]) -> Result<ParsedCsv, IngestError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);
    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers).map_err(IngestError::Validation)?;

    let mut rows = Vec::new();
    let mut read_errors = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(err) => {
                if read_errors.len() < MAX_READ_ERRORS {
                    read_errors.push(format!("Row {}: {}", index + 1, read_error_message(&err)));
                }
            }
        }
    }
    if !read_errors.is_empty() {
        return Err(IngestError::Validation(read_errors));
    }

    let mut errors = Vec::new();
    let mut records = Vec::with_capacity(rows.len());
    for (index, record) in rows.iter().enumerate() {
        if let Some(parsed) = validate_row(index + 1, record, &columns, &mut errors) {
            records.push(parsed);
        }
    }

    if !errors.is_empty() {
        return Err(IngestError::Validation(cap_errors(errors)));
    }
    if records.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(ParsedCsv {
        file_name: file_name.to_string(),
        records,
    })
}

fn read_error_message(err: &csv::Error) -> String {
    match err.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("Expected {expected_len} fields but found {len}"),
        ErrorKind::Utf8 { .. } => "Invalid UTF-8".to_string(),
        _ => err.to_string(),
    }
}

fn validate_row(
    row: usize,
    record: &StringRecord,
    columns: &ColumnIndex,
    errors: &mut Vec<String>,
) -> Option<NewSalesRecord> {
    let before = errors.len();

    let product_name = columns.field(record, 0).trim();
    if product_name.is_empty() {
        errors.push(format!("Row {row}: Missing Product Name"));
    }

    let raw_date = columns.field(record, 1);
    let sale_date = parse_sale_date(raw_date);
    if sale_date.is_none() {
        errors.push(format!("Row {row}: Invalid date \"{raw_date}\""));
    }

    let quantity_sold = parse_whole(columns.field(record, 2));
    if quantity_sold.is_none() {
        errors.push(format!("Row {row}: Invalid Quantity Sold"));
    }

    let unit_price = parse_number(columns.field(record, 3));
    if unit_price.is_none() {
        errors.push(format!("Row {row}: Invalid Unit Price"));
    }

    let current_stock = parse_whole(columns.field(record, 4));
    if current_stock.is_none() {
        errors.push(format!("Row {row}: Invalid Current Stock"));
    }

    let reorder_point = parse_whole(columns.field(record, 5));
    if reorder_point.is_none() {
        errors.push(format!("Row {row}: Invalid Reorder Point"));
    }

    if errors.len() > before {
        return None;
    }

    Some(NewSalesRecord {
        product_name: product_name.to_string(),
        sale_date: sale_date?,
        quantity_sold: quantity_sold?,
        unit_price: unit_price?,
        current_stock: current_stock?,
        reorder_point: reorder_point?,
    })
}

fn cap_errors(mut errors: Vec<String>) -> Vec<String> {
    if errors.len() > MAX_REPORTED_ERRORS {
        let rest = errors.len() - MAX_REPORTED_ERRORS;
        errors.truncate(MAX_REPORTED_ERRORS);
        errors.push(format!("...and {rest} more errors"));
    }
    errors
}

/// Accepts the date shapes spreadsheets commonly export and keeps the
/// calendar date only.
pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.with_timezone(&Utc).date_naive())
}

// Blank cells count as zero.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_whole(raw: &str) -> Option<i64> {
    let value = parse_number(raw)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_dates_accept_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for raw in [
            "2024-03-05",
            "2024/03/05",
            "03/05/2024",
            "2024-03-05 10:30:00",
            "2024-03-05T10:30:00Z",
        ] {
            assert_eq!(parse_sale_date(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_sale_date("yesterday"), None);
        assert_eq!(parse_sale_date(""), None);
    }

    #[test]
    fn blank_numbers_read_as_zero() {
        assert_eq!(parse_number(""), Some(0.0));
        assert_eq!(parse_whole("  "), Some(0));
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn quantities_must_be_whole() {
        assert_eq!(parse_whole("4"), Some(4));
        assert_eq!(parse_whole("4.0"), Some(4));
        assert_eq!(parse_whole("4.5"), None);
    }

    #[test]
    fn errors_beyond_five_are_summarised() {
        let errors: Vec<String> = (1..=8).map(|i| format!("Row {i}: bad")).collect();
        let capped = cap_errors(errors);
        assert_eq!(capped.len(), 6);
        assert_eq!(capped[4], "Row 5: bad");
        assert_eq!(capped[5], "...and 3 more errors");
    }
}
