use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::schema::MIGRATION_STATEMENTS_SQL;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in MIGRATION_STATEMENTS_SQL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(StoreError::Migration)?;
    }

    Ok(())
}
