use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::Identity,
    error::Result,
    repository::IdentityLookup,
};

/// Prefix of the payload printed on beneficiary QR badges.
pub const TOKEN_PREFIX: &str = "user:";

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    barangay: String,
}

/// Resolves `user:<id>` tokens against the `users` table. Unverified
/// accounts are treated the same as unknown ones.
pub struct SqliteIdentityLookup {
    pool: SqlitePool,
}

impl SqliteIdentityLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub fn parse_token(token: &str) -> Option<&str> {
    token
        .trim()
        .strip_prefix(TOKEN_PREFIX)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl IdentityLookup for SqliteIdentityLookup {
    async fn by_token(&self, token: &str) -> Result<Option<Identity>> {
        let Some(user_id) = parse_token(token) else {
            tracing::debug!(%token, "QR payload is not a user token");
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, barangay
            FROM users
            WHERE id = ? AND verified = 1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Identity {
            user_id: r.id,
            name: r.name,
            email: r.email,
            barangay: r.barangay,
        }))
    }
}
