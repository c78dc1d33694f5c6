//! `PostgreSQL` bag repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use vieux_carre_core::{BagId, UserId};

use super::{BagRepository, RepositoryError};
use crate::models::Bag;

#[derive(Debug, sqlx::FromRow)]
struct BagRow {
    id: BagId,
    user_id: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BagRow> for Bag {
    fn from(row: BagRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for bag database operations.
#[derive(Clone)]
pub struct PgBagRepository {
    pool: PgPool,
}

impl PgBagRepository {
    /// Create a new bag repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BagRepository for PgBagRepository {
    async fn find_by_id(&self, id: BagId) -> Result<Option<Bag>, RepositoryError> {
        let row = sqlx::query_as::<_, BagRow>(
            "SELECT id, user_id, created_at, updated_at FROM bags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Bag::from))
    }

    async fn claim(&self, id: BagId, user_id: UserId) -> Result<bool, RepositoryError> {
        // Both statements commit together so a user never ends up with zero
        // or two bags after a sign-in.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bags WHERE user_id = $1 AND id <> $2")
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE bags SET user_id = $1, updated_at = now() WHERE id = $2 AND user_id IS NULL",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let claimed = result.rows_affected() == 1;

        if claimed {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }

        Ok(claimed)
    }
}
