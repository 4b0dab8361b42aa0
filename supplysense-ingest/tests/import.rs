use std::sync::Mutex;

use async_trait::async_trait;
use supplysense_core::{NewSalesRecord, SupplySenseError, Upload, UserContext};
use supplysense_ingest::{import, parse_csv, IngestError, RecordSink, PREVIEW_ROWS};
use supplysense_store::SqliteStore;

const HEADER: &str = "Product Name,Date,Quantity Sold,Unit Price,Current Stock,Reorder Point\n";

#[derive(Default)]
struct RecordingSink {
    uploads: Mutex<Vec<(String, usize)>>,
    batches: Mutex<Vec<usize>>,
    fail_on_batch: Option<usize>,
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn create_upload(
        &self,
        ctx: &UserContext,
        file_name: &str,
        row_count: usize,
    ) -> Result<Upload, SupplySenseError> {
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), row_count));
        Ok(Upload {
            id: "upload-1".to_string(),
            user_id: ctx.user_id().to_string(),
            file_name: file_name.to_string(),
            row_count: row_count as i64,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        })
    }

    async fn insert_batch(
        &self,
        _ctx: &UserContext,
        _upload_id: &str,
        batch: &[NewSalesRecord],
    ) -> Result<u64, SupplySenseError> {
        let mut batches = self.batches.lock().unwrap();
        if self.fail_on_batch == Some(batches.len()) {
            return Err(SupplySenseError::Storage("disk full".to_string()));
        }
        batches.push(batch.len());
        Ok(batch.len() as u64)
    }
}

fn csv_with_rows(count: usize) -> String {
    let mut csv = HEADER.to_string();
    for i in 0..count {
        csv.push_str(&format!("Widget {},2024-01-{:02},3,4.50,100,20\n", i % 7, i % 28 + 1));
    }
    csv
}

fn user() -> UserContext {
    UserContext::new("user-1").unwrap()
}

#[test]
fn missing_columns_are_named() {
    let csv = "Product Name,Date,Quantity Sold\nMouse,2024-01-01,3\n";
    let err = parse_csv("partial.csv", csv.as_bytes()).unwrap_err();

    match err {
        IngestError::Validation(errors) => assert_eq!(
            errors,
            vec!["Missing columns: Unit Price, Current Stock, Reorder Point".to_string()]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_rows_are_reported_with_row_numbers() {
    let csv = format!(
        "{HEADER}Mouse,2024-01-01,3,4.5,10,2\n,not-a-date,x,y,10,2\n\nKeyboard,2024-01-02,1.5,9,10,2\n"
    );
    let err = parse_csv("bad.csv", csv.as_bytes()).unwrap_err();

    assert_eq!(
        err.messages(),
        vec![
            "Row 2: Missing Product Name".to_string(),
            "Row 2: Invalid date \"not-a-date\"".to_string(),
            "Row 2: Invalid Quantity Sold".to_string(),
            "Row 2: Invalid Unit Price".to_string(),
            "Row 3: Invalid Quantity Sold".to_string(),
        ]
    );
}

#[test]
fn ragged_records_are_read_errors() {
    let csv = format!("{HEADER}Mouse,2024-01-01,3\n");
    let err = parse_csv("ragged.csv", csv.as_bytes()).unwrap_err();

    assert_eq!(
        err.messages(),
        vec!["Row 1: Expected 6 fields but found 3".to_string()]
    );
}

#[test]
fn header_only_file_is_empty() {
    let err = parse_csv("empty.csv", HEADER.as_bytes()).unwrap_err();
    assert!(matches!(err, IngestError::Empty));
}

#[test]
fn preview_is_limited_to_the_first_rows() {
    let parsed = parse_csv("big.csv", csv_with_rows(45).as_bytes()).unwrap();
    assert_eq!(parsed.row_count(), 45);
    assert_eq!(parsed.preview().len(), PREVIEW_ROWS);
    assert_eq!(parsed.preview()[0].product_name, "Widget 0");
}

#[tokio::test]
async fn validation_failure_performs_no_inserts() {
    let sink = RecordingSink::default();
    let csv = "Product Name,Date\nMouse,2024-01-01\n";

    if let Ok(parsed) = parse_csv("bad.csv", csv.as_bytes()) {
        import(&user(), &parsed, &sink).await.unwrap();
    }

    assert!(sink.uploads.lock().unwrap().is_empty());
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rows_are_inserted_in_batches_of_five_hundred() {
    let sink = RecordingSink::default();
    let parsed = parse_csv("sales.csv", csv_with_rows(1201).as_bytes()).unwrap();

    let summary = import(&user(), &parsed, &sink).await.unwrap();

    assert_eq!(summary.inserted, parsed.row_count());
    assert_eq!(summary.batches, 3);
    assert_eq!(*sink.batches.lock().unwrap(), vec![500, 500, 201]);
    assert_eq!(
        *sink.uploads.lock().unwrap(),
        vec![("sales.csv".to_string(), 1201)]
    );
}

#[tokio::test]
async fn failing_batch_reports_committed_rows() {
    let sink = RecordingSink {
        fail_on_batch: Some(1),
        ..RecordingSink::default()
    };
    let parsed = parse_csv("sales.csv", csv_with_rows(1201).as_bytes()).unwrap();

    let err = import(&user(), &parsed, &sink).await.unwrap_err();

    match err {
        IngestError::PartialImport {
            inserted,
            total,
            upload_id,
            ..
        } => {
            assert_eq!(inserted, 500);
            assert_eq!(total, 1201);
            assert_eq!(upload_id, "upload-1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn sqlite_import_keeps_every_row() {
    let store = SqliteStore::builder("sqlite::memory:")
        .build()
        .await
        .expect("store");
    let ctx = user();
    let parsed = parse_csv("sales.csv", csv_with_rows(620).as_bytes()).unwrap();

    let summary = import(&ctx, &parsed, &store).await.unwrap();

    assert_eq!(
        store
            .count_sales_for_upload(&ctx, &summary.upload.id)
            .await
            .unwrap(),
        620
    );
    assert_eq!(store.list_uploads(&ctx).await.unwrap()[0].row_count, 620);
}
