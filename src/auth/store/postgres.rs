use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument};

use super::{CredentialStore, LoginAttempt, Member};
use crate::auth::error::{AuthError, OP_LOGIN_ATTEMPTS, OP_STATEMENT};

/// `members` / `login_attempts` backed by Postgres (see `sql/schema.sql`).
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, AuthError> {
        let query = "SELECT id, username, password, salt FROM members WHERE email = $1 LIMIT 1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(AuthError::database(OP_STATEMENT))?;

        row.map(|row| -> Result<Member, sqlx::Error> {
            Ok(Member {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                password_hash: row.try_get("password")?,
                salt: row.try_get("salt")?,
            })
        })
        .transpose()
        .map_err(AuthError::database(OP_STATEMENT))
    }

    async fn password_hash_by_id(&self, user_id: i64) -> Result<Option<String>, AuthError> {
        let query = "SELECT password FROM members WHERE id = $1 LIMIT 1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(AuthError::database(OP_STATEMENT))?;

        row.map(|row| row.try_get("password"))
            .transpose()
            .map_err(AuthError::database(OP_STATEMENT))
    }

    async fn count_attempts_since(&self, user_id: i64, since: i64) -> Result<i64, AuthError> {
        let query = r"
            SELECT COUNT(*) AS attempts
            FROM login_attempts
            WHERE user_id = $1
              AND attempted_at > $2
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .bind(since)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(AuthError::database(OP_STATEMENT))?;

        row.try_get("attempts")
            .map_err(AuthError::database(OP_STATEMENT))
    }

    async fn record_attempt(&self, attempt: LoginAttempt) -> Result<(), AuthError> {
        let query = "INSERT INTO login_attempts (user_id, attempted_at) VALUES ($1, $2)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(attempt.user_id)
            .bind(attempt.timestamp)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(AuthError::database(OP_LOGIN_ATTEMPTS))?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AuthError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(AuthError::database(OP_STATEMENT))?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(AuthError::database(OP_STATEMENT))
    }
}
