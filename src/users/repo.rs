use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    repo_types::{Phone, User, UserRow},
    store::{StoreError, UserStore},
};

/// Postgres-backed [`UserStore`]. Relies on the `users.email` UNIQUE
/// constraint for atomic email uniqueness.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// A user row with its phones folded into one JSON array column.
#[derive(FromRow)]
struct UserWithPhonesRow {
    #[sqlx(flatten)]
    user: UserRow,
    phones: Json<Vec<Phone>>,
}

/// Replace the stored phone list of `user_id` with `phones`.
async fn replace_phones_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    phones: &[Phone],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM phones WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    for phone in phones {
        sqlx::query(
            r#"
            INSERT INTO phones (user_id, number, citycode, contrycode)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(&phone.number)
        .bind(&phone.citycode)
        .bind(&phone.contrycode)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// A unique violation on save can only come from `users.email`.
fn map_save_error(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserWithPhonesRow>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.created, u.modified,
                   u.last_login, u.token, u.is_active,
                   COALESCE(
                       (SELECT json_agg(
                                   json_build_object(
                                       'number', p.number,
                                       'citycode', p.citycode,
                                       'contrycode', p.contrycode
                                   ) ORDER BY p.id
                               )
                          FROM phones p
                         WHERE p.user_id = u.id),
                       '[]'::json
                   ) AS phones
              FROM users u
             WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| r.user.into_user(r.phones.0)))
    }

    async fn save(&self, user: User) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created, modified, last_login, token, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
               SET name = EXCLUDED.name,
                   email = EXCLUDED.email,
                   password_hash = EXCLUDED.password_hash,
                   modified = $10,
                   last_login = EXCLUDED.last_login,
                   token = EXCLUDED.token,
                   is_active = EXCLUDED.is_active
            RETURNING id, name, email, password_hash, created, modified, last_login, token, is_active
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created)
        .bind(user.modified)
        .bind(user.last_login)
        .bind(&user.token)
        .bind(user.is_active)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_save_error(e, &user.email))?;

        replace_phones_tx(&mut tx, user.id, &user.phones).await?;
        tx.commit().await?;

        debug!(user_id = %row.id, phones = user.phones.len(), "user saved");
        Ok(row.into_user(user.phones))
    }
}
