use async_trait::async_trait;
use supplysense_core::{NewSalesRecord, SupplySenseError, Upload, UserContext};
use supplysense_store::SqliteStore;
use tracing::Instrument;

use crate::error::IngestError;
use crate::parse::ParsedCsv;

pub const BATCH_SIZE: usize = 500;

/// Destination for imported rows.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn create_upload(
        &self,
        ctx: &UserContext,
        file_name: &str,
        row_count: usize,
    ) -> Result<Upload, SupplySenseError>;

    async fn insert_batch(
        &self,
        ctx: &UserContext,
        upload_id: &str,
        batch: &[NewSalesRecord],
    ) -> Result<u64, SupplySenseError>;
}

#[async_trait]
impl RecordSink for SqliteStore {
    async fn create_upload(
        &self,
        ctx: &UserContext,
        file_name: &str,
        row_count: usize,
    ) -> Result<Upload, SupplySenseError> {
        Ok(self.insert_upload(ctx, file_name, row_count).await?)
    }

    async fn insert_batch(
        &self,
        ctx: &UserContext,
        upload_id: &str,
        batch: &[NewSalesRecord],
    ) -> Result<u64, SupplySenseError> {
        Ok(self.insert_sales_batch(ctx, upload_id, batch).await?)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportSummary {
    pub upload: Upload,
    pub inserted: usize,
    pub batches: usize,
}

/// Writes the upload record and then every row in batches of [`BATCH_SIZE`].
///
/// Batches are not rolled back: when one fails, rows from earlier batches stay
/// and the error reports how many were committed.
pub async fn import<S>(
    ctx: &UserContext,
    parsed: &ParsedCsv,
    sink: &S,
) -> Result<ImportSummary, IngestError>
where
    S: RecordSink + ?Sized,
{
    let upload = sink
        .create_upload(ctx, parsed.file_name(), parsed.row_count())
        .await
        .map_err(IngestError::Upload)?;

    let total = parsed.row_count();
    let total_batches = total.div_ceil(BATCH_SIZE);
    let mut inserted = 0;

    for (batch_index, batch) in parsed.records().chunks(BATCH_SIZE).enumerate() {
        let span = tracing::info_span!(
            "import_batch",
            upload_id = %upload.id,
            batch_index = batch_index + 1,
            total_batches = total_batches,
            batch_size = batch.len(),
        );

        let result = sink
            .insert_batch(ctx, &upload.id, batch)
            .instrument(span)
            .await;
        if let Err(source) = result {
            tracing::warn!(
                error = %source,
                upload_id = %upload.id,
                inserted,
                total,
                "sales batch insert failed"
            );
            return Err(IngestError::PartialImport {
                inserted,
                total,
                upload_id: upload.id.clone(),
                source,
            });
        }
        inserted += batch.len();
    }

    tracing::info!(
        upload_id = %upload.id,
        file_name = parsed.file_name(),
        rows = inserted,
        "csv import finished"
    );

    Ok(ImportSummary {
        upload,
        inserted,
        batches: total_batches,
    })
}
