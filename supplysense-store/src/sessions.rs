use supplysense_core::{
    new_id, now_timestamp, AgentMessage, CoordinationSession, NewAgentMessage, SessionStatus,
    UserContext, Value,
};

use crate::error::StoreError;
use crate::rows::{agent_message_from_row, session_from_row};
use crate::SqliteStore;

const SESSION_COLUMNS: &str =
    "id, user_id, trigger_type, status, report, created_at, completed_at";

impl SqliteStore {
    pub async fn create_session(
        &self,
        ctx: &UserContext,
        trigger_type: &str,
    ) -> Result<CoordinationSession, StoreError> {
        let session = CoordinationSession {
            id: new_id(),
            user_id: ctx.user_id().to_string(),
            trigger_type: trigger_type.to_string(),
            status: SessionStatus::Running,
            report: None,
            created_at: now_timestamp(),
            completed_at: None,
        };

        sqlx::query(
            "INSERT INTO coordination_sessions (id, user_id, trigger_type, status, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.trigger_type)
        .bind(session.status.as_str())
        .bind(&session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    /// Persists messages in the given order inside one transaction.
    pub async fn insert_agent_messages(
        &self,
        ctx: &UserContext,
        session_id: &str,
        messages: &[NewAgentMessage],
    ) -> Result<u64, StoreError> {
        let created_at = now_timestamp();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for message in messages {
            let content = serde_json::to_string(&message.content)?;
            let result = sqlx::query(
                "INSERT INTO agent_messages (id, session_id, user_id, from_agent, to_agent, \
                 message_type, content, timestamp_offset_ms, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(session_id)
            .bind(ctx.user_id())
            .bind(&message.from_agent)
            .bind(&message.to_agent)
            .bind(&message.message_type)
            .bind(content)
            .bind(message.timestamp_offset_ms)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Stores the report and marks the session completed. Returns `false`
    /// when no session with that id belongs to the user.
    pub async fn complete_session(
        &self,
        ctx: &UserContext,
        session_id: &str,
        report: &Value,
    ) -> Result<bool, StoreError> {
        let report = serde_json::to_string(report)?;
        let result = sqlx::query(
            "UPDATE coordination_sessions SET status = ?, report = ?, completed_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(SessionStatus::Completed.as_str())
        .bind(report)
        .bind(now_timestamp())
        .bind(session_id)
        .bind(ctx.user_id())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sessions for the user, newest first.
    pub async fn list_sessions(
        &self,
        ctx: &UserContext,
    ) -> Result<Vec<CoordinationSession>, StoreError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM coordination_sessions WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(ctx.user_id())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(session_from_row).collect()
    }

    pub async fn get_session(
        &self,
        ctx: &UserContext,
        session_id: &str,
    ) -> Result<Option<CoordinationSession>, StoreError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM coordination_sessions WHERE id = ? AND user_id = ?"
        );
        let row = sqlx::query(&sql)
            .bind(session_id)
            .bind(ctx.user_id())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// Messages of one session in insertion order.
    pub async fn list_agent_messages(
        &self,
        ctx: &UserContext,
        session_id: &str,
    ) -> Result<Vec<AgentMessage>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, session_id, user_id, from_agent, to_agent, message_type, content, \
             timestamp_offset_ms, created_at FROM agent_messages \
             WHERE session_id = ? AND user_id = ? ORDER BY rowid ASC",
        )
        .bind(session_id)
        .bind(ctx.user_id())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(agent_message_from_row).collect()
    }
}
