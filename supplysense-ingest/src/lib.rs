//! CSV sales data import.
//!
//! [`parse_csv`] validates a whole file up front; [`import`] then writes it
//! through a [`RecordSink`] in fixed-size batches.

pub mod error;
pub mod import;
pub mod parse;

pub use error::IngestError;
pub use import::{import, ImportSummary, RecordSink, BATCH_SIZE};
pub use parse::{parse_csv, parse_sale_date, ParsedCsv, PREVIEW_ROWS, REQUIRED_COLUMNS};
