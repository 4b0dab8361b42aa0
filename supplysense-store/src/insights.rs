use supplysense_core::{new_id, now_timestamp, Insight, NewInsight, UserContext};

use crate::error::StoreError;
use crate::rows::insight_from_row;
use crate::SqliteStore;

impl SqliteStore {
    /// Replaces every insight of the user with `insights` in one transaction.
    ///
    /// Readers observe either the previous set or the new one, never a mix or
    /// an empty table in between.
    pub async fn replace_insights(
        &self,
        ctx: &UserContext,
        upload_id: Option<&str>,
        insights: &[NewInsight],
    ) -> Result<Vec<Insight>, StoreError> {
        let created_at = now_timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ai_insights WHERE user_id = ?")
            .bind(ctx.user_id())
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(insights.len());
        for insight in insights {
            let forecast = insight
                .forecast_next_30
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            let id = new_id();

            sqlx::query(
                "INSERT INTO ai_insights (id, user_id, upload_id, product_name, status, risk_level, \
                 recommendation, explanation, recommended_order_qty, forecast_next_30, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(ctx.user_id())
            .bind(upload_id)
            .bind(&insight.product_name)
            .bind(insight.status.as_str())
            .bind(insight.risk_level.as_str())
            .bind(&insight.recommendation)
            .bind(&insight.explanation)
            .bind(insight.recommended_order_qty)
            .bind(forecast)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;

            stored.push(Insight {
                id,
                user_id: ctx.user_id().to_string(),
                upload_id: upload_id.map(str::to_string),
                product_name: insight.product_name.clone(),
                status: insight.status,
                risk_level: insight.risk_level,
                recommendation: insight.recommendation.clone(),
                explanation: insight.explanation.clone(),
                recommended_order_qty: insight.recommended_order_qty,
                forecast_next_30: insight.forecast_next_30.clone(),
                created_at: created_at.clone(),
            });
        }

        tx.commit().await?;
        tracing::debug!(user_id = ctx.user_id(), count = stored.len(), "replaced insights");

        Ok(stored)
    }

    pub async fn list_insights(&self, ctx: &UserContext) -> Result<Vec<Insight>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, upload_id, product_name, status, risk_level, recommendation, \
             explanation, recommended_order_qty, forecast_next_30, created_at FROM ai_insights \
             WHERE user_id = ? ORDER BY created_at DESC, rowid ASC",
        )
        .bind(ctx.user_id())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(insight_from_row).collect()
    }
}
