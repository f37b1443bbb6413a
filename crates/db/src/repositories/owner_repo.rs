//! Repository for the `owners` table.

use sqlx::PgPool;

use crate::models::owner::Owner;

/// Provides lookup-or-create access to owner identities.
pub struct OwnerRepo;

impl OwnerRepo {
    /// Find the owner for `email`, creating it if absent.
    ///
    /// A single `INSERT ... ON CONFLICT` statement so concurrent
    /// submissions with the same email cannot race: the losing insert
    /// degrades to an update of the same row and both callers get the
    /// same id back.
    pub async fn get_or_create(pool: &PgPool, email: &str) -> Result<Owner, sqlx::Error> {
        sqlx::query_as::<_, Owner>(
            "INSERT INTO owners (email) VALUES ($1) \
             ON CONFLICT ON CONSTRAINT uq_owners_email \
             DO UPDATE SET email = EXCLUDED.email \
             RETURNING id, email, created_at",
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Find an owner by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Owner>, sqlx::Error> {
        sqlx::query_as::<_, Owner>("SELECT id, email, created_at FROM owners WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
