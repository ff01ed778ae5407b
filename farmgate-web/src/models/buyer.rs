use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, SqlitePool};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Buyer {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub delivery_address: String,
    /// Free-form JSON such as preferred delivery days
    pub delivery_preferences: Option<Json<serde_json::Value>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBuyer {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub delivery_address: String,
    pub delivery_preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuyerUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub delivery_address: String,
    #[serde(default)]
    pub delivery_preferences: Option<serde_json::Value>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct BuyerStore {
    pool: SqlitePool,
}

impl BuyerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, buyer: &NewBuyer) -> Result<Buyer, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (
                email, password_hash, first_name, last_name, delivery_address,
                delivery_preferences, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&buyer.email)
        .bind(&buyer.password_hash)
        .bind(&buyer.first_name)
        .bind(&buyer.last_name)
        .bind(&buyer.delivery_address)
        .bind(buyer.delivery_preferences.clone().map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Buyer>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>("SELECT * FROM buyers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Buyer>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>("SELECT * FROM buyers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<Buyer>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>("SELECT * FROM buyers ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM buyers")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn toggle_active(&self, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE buyers SET is_active = NOT is_active, updated_at = ? WHERE id = ? RETURNING is_active",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, id: i64, update: &BuyerUpdate) -> Result<Option<Buyer>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>(
            r#"
            UPDATE buyers
            SET email = ?, first_name = ?, last_name = ?, delivery_address = ?,
                delivery_preferences = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.delivery_address)
        .bind(update.delivery_preferences.clone().map(Json))
        .bind(update.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM buyers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
