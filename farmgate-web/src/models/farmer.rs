use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Where a farmer is in the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FarmerStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farmer {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub farm_name: String,
    pub farm_size: String,
    pub location: String,
    pub status: FarmerStatus,
    pub rejection_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Farmer {
    /// Only approved, active farmers may log in
    pub fn can_sign_in(&self) -> bool {
        self.status == FarmerStatus::Approved && self.is_active
    }
}

#[derive(Debug, Clone)]
pub struct NewFarmer {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub farm_name: String,
    pub farm_size: String,
    pub location: String,
}

/// Profile fields an admin can change
#[derive(Debug, Clone, Deserialize)]
pub struct FarmerUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub farm_name: String,
    pub farm_size: String,
    pub location: String,
    pub status: FarmerStatus,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct FarmerStore {
    pool: SqlitePool,
}

impl FarmerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// New farmers start pending and inactive
    pub async fn create(&self, farmer: &NewFarmer) -> Result<Farmer, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Farmer>(
            r#"
            INSERT INTO farmers (
                email, password_hash, first_name, last_name, farm_name, farm_size,
                location, status, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&farmer.email)
        .bind(&farmer.password_hash)
        .bind(&farmer.first_name)
        .bind(&farmer.last_name)
        .bind(&farmer.farm_name)
        .bind(&farmer.farm_size)
        .bind(&farmer.location)
        .bind(FarmerStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Farmer>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>("SELECT * FROM farmers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Farmer>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>("SELECT * FROM farmers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_by_status(&self, status: FarmerStatus) -> Result<Vec<Farmer>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>("SELECT * FROM farmers WHERE status = ? ORDER BY created_at, id")
            .bind(status)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<Farmer>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>("SELECT * FROM farmers ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count_by_status(&self, status: FarmerStatus) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM farmers WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn approve(&self, id: i64) -> Result<Option<Farmer>, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Farmer>(
            r#"
            UPDATE farmers
            SET status = ?, is_active = 1, approved_at = ?, rejection_reason = NULL, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(FarmerStatus::Approved)
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn reject(&self, id: i64, reason: &str) -> Result<Option<Farmer>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>(
            r#"
            UPDATE farmers
            SET status = ?, is_active = 0, rejection_reason = ?, approved_at = NULL, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(FarmerStatus::Rejected)
        .bind(reason)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Flip `is_active`, returning the new value
    pub async fn toggle_active(&self, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE farmers SET is_active = NOT is_active, updated_at = ? WHERE id = ? RETURNING is_active",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, id: i64, update: &FarmerUpdate) -> Result<Option<Farmer>, sqlx::Error> {
        sqlx::query_as::<_, Farmer>(
            r#"
            UPDATE farmers
            SET email = ?, first_name = ?, last_name = ?, farm_name = ?, farm_size = ?,
                location = ?, status = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.farm_name)
        .bind(&update.farm_size)
        .bind(&update.location)
        .bind(update.status)
        .bind(update.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Returns whether a row was deleted
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM farmers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{new_farmer, pool};

    #[tokio::test]
    async fn test_registration_starts_pending_and_inactive() {
        let store = FarmerStore::new(pool().await);
        let farmer = store.create(&new_farmer("ada@farm.test")).await.unwrap();

        assert_eq!(farmer.status, FarmerStatus::Pending);
        assert!(!farmer.is_active);
        assert!(!farmer.can_sign_in());
        assert_eq!(store.count_by_status(FarmerStatus::Pending).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_approve_then_reject() {
        let store = FarmerStore::new(pool().await);
        let farmer = store.create(&new_farmer("ada@farm.test")).await.unwrap();

        let approved = store.approve(farmer.id).await.unwrap().unwrap();
        assert_eq!(approved.status, FarmerStatus::Approved);
        assert!(approved.is_active);
        assert!(approved.approved_at.is_some());
        assert!(approved.can_sign_in());

        let rejected = store.reject(farmer.id, "incomplete papers").await.unwrap().unwrap();
        assert_eq!(rejected.status, FarmerStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("incomplete papers"));
        assert!(!rejected.is_active);

        assert!(store.approve(farmer.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toggle_update_and_delete() {
        let store = FarmerStore::new(pool().await);
        let farmer = store.create(&new_farmer("ada@farm.test")).await.unwrap();

        assert_eq!(store.toggle_active(farmer.id).await.unwrap(), Some(true));
        assert_eq!(store.toggle_active(farmer.id).await.unwrap(), Some(false));
        assert_eq!(store.toggle_active(999).await.unwrap(), None);

        let update = FarmerUpdate {
            email: "ada@farm.test".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Okafor".to_string(),
            farm_name: "Blue Acre".to_string(),
            farm_size: "20 acres".to_string(),
            location: "Eldoret".to_string(),
            status: FarmerStatus::Approved,
            is_active: true,
        };
        let updated = store.update(farmer.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.farm_name, "Blue Acre");
        assert_eq!(updated.status, FarmerStatus::Approved);

        assert!(store.delete(farmer.id).await.unwrap());
        assert!(!store.delete(farmer.id).await.unwrap());
        assert!(store.find_by_id(farmer.id).await.unwrap().is_none());
    }
}
