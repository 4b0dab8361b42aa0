use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use supplysense_core::{
    AgentMessage, CoordinationSession, Insight, InsightStatus, RiskLevel, SalesRecord,
    SessionStatus, Upload, Value,
};

use crate::error::StoreError;

pub(crate) const SALE_DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn upload_from_row(row: &SqliteRow) -> Result<Upload, StoreError> {
    Ok(Upload {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        file_name: row.try_get("file_name")?,
        row_count: row.try_get("row_count")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn sales_record_from_row(row: &SqliteRow) -> Result<SalesRecord, StoreError> {
    let sale_date: String = row.try_get("sale_date")?;
    let sale_date = NaiveDate::parse_from_str(&sale_date, SALE_DATE_FORMAT)
        .map_err(|err| StoreError::Corrupt(format!("sale_date '{sale_date}': {err}")))?;

    Ok(SalesRecord {
        id: row.try_get("id")?,
        upload_id: row.try_get("upload_id")?,
        user_id: row.try_get("user_id")?,
        product_name: row.try_get("product_name")?,
        sale_date,
        quantity_sold: row.try_get("quantity_sold")?,
        unit_price: row.try_get("unit_price")?,
        current_stock: row.try_get("current_stock")?,
        reorder_point: row.try_get("reorder_point")?,
    })
}

pub(crate) fn insight_from_row(row: &SqliteRow) -> Result<Insight, StoreError> {
    let status: String = row.try_get("status")?;
    let risk_level: String = row.try_get("risk_level")?;
    let forecast: Option<String> = row.try_get("forecast_next_30")?;
    let forecast_next_30 = forecast
        .map(|raw| serde_json::from_str::<Vec<f64>>(&raw))
        .transpose()?;

    Ok(Insight {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        upload_id: row.try_get("upload_id")?,
        product_name: row.try_get("product_name")?,
        status: status
            .parse::<InsightStatus>()
            .map_err(|err| StoreError::Corrupt(format!("{err}")))?,
        risk_level: risk_level
            .parse::<RiskLevel>()
            .map_err(|err| StoreError::Corrupt(format!("{err}")))?,
        recommendation: row.try_get("recommendation")?,
        explanation: row.try_get("explanation")?,
        recommended_order_qty: row.try_get("recommended_order_qty")?,
        forecast_next_30,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn session_from_row(row: &SqliteRow) -> Result<CoordinationSession, StoreError> {
    let status: String = row.try_get("status")?;
    let report: Option<String> = row.try_get("report")?;
    let report = report
        .map(|raw| serde_json::from_str::<Value>(&raw))
        .transpose()?;

    Ok(CoordinationSession {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        trigger_type: row.try_get("trigger_type")?,
        status: status
            .parse::<SessionStatus>()
            .map_err(|err| StoreError::Corrupt(format!("{err}")))?,
        report,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

pub(crate) fn agent_message_from_row(row: &SqliteRow) -> Result<AgentMessage, StoreError> {
    let content: String = row.try_get("content")?;

    Ok(AgentMessage {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        user_id: row.try_get("user_id")?,
        from_agent: row.try_get("from_agent")?,
        to_agent: row.try_get("to_agent")?,
        message_type: row.try_get("message_type")?,
        content: serde_json::from_str(&content)?,
        timestamp_offset_ms: row.try_get("timestamp_offset_ms")?,
        created_at: row.try_get("created_at")?,
    })
}
