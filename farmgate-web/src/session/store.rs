use crate::clock::Clock;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use farmgate_core::Role;
use rand::{rngs::OsRng, RngCore};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

/// Random bytes per token; hex encoding doubles the length
pub const SESSION_TOKEN_BYTES: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("session expired")]
    Expired,
    #[error("session record is corrupt: {0}")]
    Corrupt(String),
    #[error("session storage failure: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("failed to generate session token: {0}")]
    TokenGeneration(#[from] rand::Error),
}

/// Who a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSubject {
    pub subject_id: i64,
    pub role: Role,
}

/// A freshly created session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub subject: SessionSubject,
    pub expires_at: DateTime<Utc>,
}

/// Sessions persisted in the `sessions` table
///
/// The store holds no locks of its own; concurrent access to one token is
/// serialized by SQLite.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

fn generate_token() -> Result<String, SessionError> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// Stored expiries have whole-second precision, so round up rather than
/// cut a session short
fn ceil_to_second(at: DateTime<Utc>) -> DateTime<Utc> {
    let secs = at.timestamp() + i64::from(at.timestamp_subsec_nanos() > 0);
    DateTime::from_timestamp(secs, 0).unwrap_or(at)
}

fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { pool, ttl, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, subject_id: i64, role: Role) -> Result<IssuedSession, SessionError> {
        let token = generate_token()?;
        let expires_at = ceil_to_second(self.clock.now() + self.ttl);
        let stored_expiry = encode_timestamp(expires_at);

        sqlx::query(
            "INSERT INTO sessions (session_id, user_id, user_type, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(subject_id)
        .bind(role.as_str())
        .bind(&stored_expiry)
        .execute(&self.pool)
        .await?;

        debug!(subject_id, %role, expires_at = %stored_expiry, "Session created");

        Ok(IssuedSession {
            token,
            subject: SessionSubject { subject_id, role },
            expires_at,
        })
    }

    /// Look up `token`, deleting it on the spot if it has expired
    pub async fn resolve(&self, token: &str) -> Result<SessionSubject, SessionError> {
        let row = sqlx::query("SELECT user_id, user_type, expires_at FROM sessions WHERE session_id = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(SessionError::NotFound)?;

        let subject_id: i64 = row.try_get("user_id")?;
        let role_name: String = row.try_get("user_type")?;
        let expires_raw: String = row.try_get("expires_at")?;

        let role = role_name.parse::<Role>().map_err(SessionError::Corrupt)?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_raw)
            .map_err(|e| SessionError::Corrupt(format!("bad expiry {:?}: {}", expires_raw, e)))?
            .with_timezone(&Utc);

        if self.clock.now() > expires_at {
            self.destroy(token).await?;
            debug!(subject_id, %role, "Expired session removed");
            return Err(SessionError::Expired);
        }

        Ok(SessionSubject { subject_id, role })
    }

    /// Delete a session; deleting an unknown token succeeds
    pub async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete every session held by one account
    pub async fn destroy_for_subject(&self, subject_id: i64, role: Role) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ? AND user_type = ?")
            .bind(subject_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(subject_id, %role, count = result.rows_affected(), "Sessions revoked");
        }
        Ok(result.rows_affected())
    }

    /// Bulk delete of sessions past their expiry
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        let now = encode_timestamp(self.clock.now());
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::HashSet;

    async fn store_with_clock() -> (SessionStore, Arc<ManualClock>) {
        let pool = crate::database::connect("sqlite::memory:", 1).await.unwrap();
        let clock = Arc::new(ManualClock::default());
        let store = SessionStore::new(pool, Duration::hours(24), clock.clone());
        (store, clock)
    }

    #[tokio::test]
    async fn test_create_then_resolve_returns_subject() {
        let (store, _clock) = store_with_clock().await;

        for role in Role::ALL {
            let issued = store.create(7, role).await.unwrap();
            assert_eq!(issued.token.len(), SESSION_TOKEN_BYTES * 2);
            assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));

            let subject = store.resolve(&issued.token).await.unwrap();
            assert_eq!(subject, SessionSubject { subject_id: 7, role });
        }
    }

    #[tokio::test]
    async fn test_unknown_and_destroyed_tokens_are_not_found() {
        let (store, _clock) = store_with_clock().await;

        assert!(matches!(
            store.resolve("deadbeef").await,
            Err(SessionError::NotFound)
        ));

        let issued = store.create(1, Role::Buyer).await.unwrap();
        store.destroy(&issued.token).await.unwrap();
        assert!(matches!(
            store.resolve(&issued.token).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let (store, _clock) = store_with_clock().await;
        let issued = store.create(1, Role::Admin).await.unwrap();

        store.destroy(&issued.token).await.unwrap();
        store.destroy(&issued.token).await.unwrap();
        store.destroy("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn test_expiry_reports_once_then_not_found() {
        let (store, clock) = store_with_clock().await;
        let issued = store.create(42, Role::Farmer).await.unwrap();

        assert_eq!(
            store.resolve(&issued.token).await.unwrap(),
            SessionSubject {
                subject_id: 42,
                role: Role::Farmer
            }
        );

        clock.advance(Duration::hours(24) + Duration::seconds(1));
        assert!(matches!(
            store.resolve(&issued.token).await,
            Err(SessionError::Expired)
        ));
        assert!(matches!(
            store.resolve(&issued.token).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_session_is_valid_until_expiry() {
        let (store, clock) = store_with_clock().await;
        let issued = store.create(3, Role::Buyer).await.unwrap();

        clock.set(issued.expires_at);
        assert!(store.resolve(&issued.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_sub_second_clock_never_shortens_session() {
        let (store, clock) = store_with_clock().await;
        let start = DateTime::from_timestamp(1_700_000_000, 900_000_000).unwrap();
        clock.set(start);

        let issued = store.create(4, Role::Farmer).await.unwrap();
        assert_eq!(issued.expires_at.timestamp_subsec_nanos(), 0);
        assert!(issued.expires_at >= start + store.ttl());

        clock.set(start + store.ttl());
        assert!(store.resolve(&issued.token).await.is_ok());

        clock.set(issued.expires_at + Duration::milliseconds(1));
        assert!(matches!(
            store.resolve(&issued.token).await,
            Err(SessionError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_tokens_do_not_collide() {
        let (store, _clock) = store_with_clock().await;
        let mut seen = HashSet::new();

        for subject_id in 0..200 {
            let issued = store.create(subject_id, Role::Buyer).await.unwrap();
            assert!(seen.insert(issued.token));
        }
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_independent() {
        let (store, _clock) = store_with_clock().await;

        let handles: Vec<_> = (0..16)
            .map(|subject_id| {
                let store = store.clone();
                tokio::spawn(async move { store.create(subject_id, Role::Farmer).await })
            })
            .collect();

        let mut tokens = HashSet::new();
        for handle in handles {
            let issued = handle.await.unwrap().unwrap();
            let subject = store.resolve(&issued.token).await.unwrap();
            assert_eq!(subject, issued.subject);
            tokens.insert(issued.token);
        }
        assert_eq!(tokens.len(), 16);
    }

    #[tokio::test]
    async fn test_unknown_role_is_corrupt() {
        let (store, _clock) = store_with_clock().await;
        sqlx::query(
            "INSERT INTO sessions (session_id, user_id, user_type, expires_at) VALUES ('abc', 1, 'root', '2999-01-01T00:00:00Z')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        assert!(matches!(
            store.resolve("abc").await,
            Err(SessionError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_subject_revocation_and_purge() {
        let (store, clock) = store_with_clock().await;
        let first = store.create(5, Role::Farmer).await.unwrap();
        let second = store.create(5, Role::Farmer).await.unwrap();
        let other = store.create(5, Role::Buyer).await.unwrap();

        assert_eq!(store.destroy_for_subject(5, Role::Farmer).await.unwrap(), 2);
        assert!(store.resolve(&first.token).await.is_err());
        assert!(store.resolve(&second.token).await.is_err());
        assert!(store.resolve(&other.token).await.is_ok());

        clock.advance(Duration::hours(48));
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }
}
