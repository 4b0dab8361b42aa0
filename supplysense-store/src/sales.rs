use sqlx::{QueryBuilder, Sqlite};
use supplysense_core::{new_id, now_timestamp, NewSalesRecord, SalesRecord, Upload, UserContext};

use crate::error::StoreError;
use crate::rows::{sales_record_from_row, upload_from_row, SALE_DATE_FORMAT};
use crate::SqliteStore;

impl SqliteStore {
    pub async fn insert_upload(
        &self,
        ctx: &UserContext,
        file_name: &str,
        row_count: usize,
    ) -> Result<Upload, StoreError> {
        let row_count = i64::try_from(row_count)
            .map_err(|_| StoreError::Corrupt("row count does not fit into i64".to_string()))?;
        let upload = Upload {
            id: new_id(),
            user_id: ctx.user_id().to_string(),
            file_name: file_name.to_string(),
            row_count,
            created_at: now_timestamp(),
        };

        sqlx::query(
            "INSERT INTO uploads (id, user_id, file_name, row_count, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&upload.id)
        .bind(&upload.user_id)
        .bind(&upload.file_name)
        .bind(upload.row_count)
        .bind(&upload.created_at)
        .execute(&self.pool)
        .await?;

        Ok(upload)
    }

    /// Inserts one batch with a single multi-row statement.
    pub async fn insert_sales_batch(
        &self,
        ctx: &UserContext,
        upload_id: &str,
        batch: &[NewSalesRecord],
    ) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO sales_data (id, upload_id, user_id, product_name, sale_date, \
             quantity_sold, unit_price, current_stock, reorder_point) ",
        );
        builder.push_values(batch, |mut values, record| {
            values
                .push_bind(new_id())
                .push_bind(upload_id.to_string())
                .push_bind(ctx.user_id().to_string())
                .push_bind(record.product_name.clone())
                .push_bind(record.sale_date.format(SALE_DATE_FORMAT).to_string())
                .push_bind(record.quantity_sold)
                .push_bind(record.unit_price)
                .push_bind(record.current_stock)
                .push_bind(record.reorder_point);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Uploads for the user, newest first.
    pub async fn list_uploads(&self, ctx: &UserContext) -> Result<Vec<Upload>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, file_name, row_count, created_at FROM uploads \
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(ctx.user_id())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(upload_from_row).collect()
    }

    pub async fn latest_upload(&self, ctx: &UserContext) -> Result<Option<Upload>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, file_name, row_count, created_at FROM uploads \
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .bind(ctx.user_id())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(upload_from_row).transpose()
    }

    /// Deletes an upload and, through the foreign key, its sales rows.
    /// Returns `false` when the upload does not exist for this user.
    pub async fn delete_upload(&self, ctx: &UserContext, upload_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = ? AND user_id = ?")
            .bind(upload_id)
            .bind(ctx.user_id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sales rows for the user ordered by sale date, then insertion order.
    pub async fn list_sales(&self, ctx: &UserContext) -> Result<Vec<SalesRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, upload_id, user_id, product_name, sale_date, quantity_sold, unit_price, \
             current_stock, reorder_point FROM sales_data WHERE user_id = ? \
             ORDER BY sale_date ASC, rowid ASC",
        )
        .bind(ctx.user_id())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sales_record_from_row).collect()
    }

    pub async fn count_sales_for_upload(
        &self,
        ctx: &UserContext,
        upload_id: &str,
    ) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sales_data WHERE upload_id = ? AND user_id = ?",
        )
        .bind(upload_id)
        .bind(ctx.user_id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
