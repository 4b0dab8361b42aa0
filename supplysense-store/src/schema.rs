pub const UPLOADS_TABLE: &str = "uploads";
pub const SALES_TABLE: &str = "sales_data";
pub const INSIGHTS_TABLE: &str = "ai_insights";
pub const SESSIONS_TABLE: &str = "coordination_sessions";
pub const MESSAGES_TABLE: &str = "agent_messages";

pub const CREATE_UPLOADS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS uploads (\
    id TEXT PRIMARY KEY,\
    user_id TEXT NOT NULL,\
    file_name TEXT NOT NULL,\
    row_count INTEGER NOT NULL,\
    created_at TEXT NOT NULL\
)";

pub const CREATE_SALES_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS sales_data (\
    id TEXT PRIMARY KEY,\
    upload_id TEXT NOT NULL REFERENCES uploads(id) ON DELETE CASCADE,\
    user_id TEXT NOT NULL,\
    product_name TEXT NOT NULL,\
    sale_date TEXT NOT NULL,\
    quantity_sold INTEGER NOT NULL,\
    unit_price REAL NOT NULL,\
    current_stock INTEGER NOT NULL,\
    reorder_point INTEGER NOT NULL\
)";

pub const CREATE_SALES_USER_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_sales_data_user_date ON sales_data (user_id, sale_date)";

pub const CREATE_INSIGHTS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS ai_insights (\
    id TEXT PRIMARY KEY,\
    user_id TEXT NOT NULL,\
    upload_id TEXT REFERENCES uploads(id) ON DELETE SET NULL,\
    product_name TEXT NOT NULL,\
    status TEXT NOT NULL,\
    risk_level TEXT NOT NULL,\
    recommendation TEXT NOT NULL,\
    explanation TEXT NOT NULL,\
    recommended_order_qty REAL NOT NULL,\
    forecast_next_30 TEXT,\
    created_at TEXT NOT NULL\
)";

pub const CREATE_SESSIONS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS coordination_sessions (\
    id TEXT PRIMARY KEY,\
    user_id TEXT NOT NULL,\
    trigger_type TEXT NOT NULL,\
    status TEXT NOT NULL,\
    report TEXT,\
    created_at TEXT NOT NULL,\
    completed_at TEXT\
)";

pub const CREATE_MESSAGES_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS agent_messages (\
    id TEXT PRIMARY KEY,\
    session_id TEXT NOT NULL REFERENCES coordination_sessions(id) ON DELETE CASCADE,\
    user_id TEXT NOT NULL,\
    from_agent TEXT NOT NULL,\
    to_agent TEXT NOT NULL,\
    message_type TEXT NOT NULL,\
    content TEXT NOT NULL,\
    timestamp_offset_ms REAL,\
    created_at TEXT NOT NULL\
)";

pub const MIGRATION_STATEMENTS_SQL: [&str; 6] = [
    CREATE_UPLOADS_TABLE_SQL,
    CREATE_SALES_TABLE_SQL,
    CREATE_SALES_USER_INDEX_SQL,
    CREATE_INSIGHTS_TABLE_SQL,
    CREATE_SESSIONS_TABLE_SQL,
    CREATE_MESSAGES_TABLE_SQL,
];
