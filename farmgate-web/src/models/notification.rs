use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// Account events a farmer is told about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    FarmerApproved,
    FarmerRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::FarmerApproved => "farmer_approved",
            NotificationKind::FarmerRejected => "farmer_rejected",
        }
    }
}

/// Queued message for a farmer; delivery happens elsewhere
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub notification_type: String,
    pub message: String,
    pub is_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NotificationStore {
    pool: SqlitePool,
}

impl NotificationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, notification_type, message, is_sent, created_at)
            VALUES (?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(recipient_id)
        .bind(kind.as_str())
        .bind(message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    /// Newest first
    pub async fn list_for(&self, recipient_id: i64) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_unsent(&self, recipient_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_sent = 0")
            .bind(recipient_id)
            .fetch_one(&self.pool)
            .await
    }
}
