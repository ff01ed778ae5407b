//! SQLite connection pool and schema

use crate::{WebError, WebResult};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tracing::{debug, error, info};

const SCHEMA: &[(&str, &str)] = &[
    (
        "admins",
        r#"
        CREATE TABLE IF NOT EXISTS admins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "farmers",
        r#"
        CREATE TABLE IF NOT EXISTS farmers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            farm_name TEXT NOT NULL,
            farm_size TEXT NOT NULL,
            location TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            rejection_reason TEXT,
            approved_at TEXT,
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "buyers",
        r#"
        CREATE TABLE IF NOT EXISTS buyers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            delivery_address TEXT NOT NULL,
            delivery_preferences TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "products",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            farmer_id INTEGER NOT NULL REFERENCES farmers(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            price REAL NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            description TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "product_images",
        r#"
        CREATE TABLE IF NOT EXISTS product_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            image_url TEXT NOT NULL,
            image_order INTEGER NOT NULL
        )
        "#,
    ),
    (
        "cart_items",
        r#"
        CREATE TABLE IF NOT EXISTS cart_items (
            buyer_id INTEGER NOT NULL REFERENCES buyers(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            quantity INTEGER NOT NULL,
            added_at TEXT NOT NULL,
            PRIMARY KEY (buyer_id, product_id)
        )
        "#,
    ),
    (
        "notifications",
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient_id INTEGER NOT NULL REFERENCES farmers(id) ON DELETE CASCADE,
            notification_type TEXT NOT NULL,
            message TEXT NOT NULL,
            is_sent INTEGER NOT NULL DEFAULT 0,
            sent_at TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "sessions",
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            user_type TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_products_farmer ON products(farmer_id)",
    "CREATE INDEX IF NOT EXISTS idx_product_images_product ON product_images(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_subject ON sessions(user_id, user_type)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at)",
];

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Open a pool for `database_url` and make sure every table exists
pub async fn connect(database_url: &str, max_connections: u32) -> WebResult<SqlitePool> {
    info!("🔗 Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| WebError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `sqlite::memory:` is its own database, so keep exactly one alive.
    let pool_options = if is_in_memory(database_url) {
        debug!("Using a single connection for in-memory database");
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        error!("❌ Database connection failed: {}", e);
        WebError::Database(format!("Failed to connect to database: {}", e))
    })?;

    create_tables(&pool).await?;
    info!("✅ Database ready");

    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> WebResult<()> {
    for (table, statement) in SCHEMA {
        debug!("📋 Creating {} table...", table);
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            error!("❌ Failed to create {} table: {}", table, e);
            WebError::Database(format!("Failed to create {} table: {}", table, e))
        })?;
    }

    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            error!("❌ Failed to create index: {}", e);
            WebError::Database(format!("Failed to create index: {}", e))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_in_memory_schema_is_created() {
        let pool = connect("sqlite::memory:", 5).await.unwrap();

        let tables: Vec<String> =
            sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap()
                .iter()
                .map(|row| row.get("name"))
                .collect();

        for (table, _) in SCHEMA {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }
    }

    #[tokio::test]
    async fn test_file_database_is_created_and_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("farmgate.db").display());

        let pool = connect(&url, 2).await.unwrap();
        pool.close().await;

        // Second open runs the IF NOT EXISTS statements against existing tables
        assert!(connect(&url, 2).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        let result = sqlx::query(
            "INSERT INTO products (farmer_id, name, category_id, price, created_at, updated_at) \
             VALUES (999, 'Kale', 1, 2.0, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_memory_url_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://farmgate.db"));
    }
}
