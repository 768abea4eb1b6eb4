use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::user::{ProfileUpdate, Role, User};

const UNIQUE_MESSAGE: &str = "User with Email or Username already exists";

pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub avatar: Option<&'a str>,
    pub bio: Option<&'a str>,
}

pub async fn create(pool: &PgPool, new_user: NewUser<'_>) -> Result<User, DatabaseError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, full_name, username, email, password, avatar, bio)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_user.full_name)
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.avatar)
    .bind(new_user.bio)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::conflict_on_unique(e, UNIQUE_MESSAGE))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Look up by username or email, whichever matches.
pub async fn find_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<User>, DatabaseError> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 OR email = $1")
            .bind(identifier)
            .fetch_optional(pool)
            .await?;
    Ok(user)
}

pub async fn exists_by_username_or_email(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<bool, DatabaseError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Overwrite the single refresh-token slot; `None` clears it (logout).
pub async fn set_refresh_token(
    pool: &PgPool,
    id: Uuid,
    refresh_token: Option<&str>,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(refresh_token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE users SET last_login = now(), updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE users SET password = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> Result<bool, DatabaseError> {
    let result = sqlx::query("UPDATE users SET role = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate,
) -> Result<Option<User>, DatabaseError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(full_name) = &update.full_name {
            set.push("full_name = ");
            set.push_bind_unseparated(full_name);
        }
        if let Some(username) = &update.username {
            set.push("username = ");
            set.push_bind_unseparated(username);
        }
        if let Some(email) = &update.email {
            set.push("email = ");
            set.push_bind_unseparated(email);
        }
        if let Some(bio) = &update.bio {
            set.push("bio = ");
            set.push_bind_unseparated(bio);
        }
        if let Some(avatar) = &update.avatar {
            set.push("avatar = ");
            set.push_bind_unseparated(avatar);
        }
        set.push("updated_at = now()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    qb.build_query_as::<User>()
        .fetch_optional(pool)
        .await
        .map_err(|e| DatabaseError::conflict_on_unique(e, UNIQUE_MESSAGE))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All users except the given one, most recent first.
pub async fn list_except(pool: &PgPool, id: Uuid) -> Result<Vec<User>, DatabaseError> {
    let users =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id <> $1 ORDER BY created_at DESC")
            .bind(id)
            .fetch_all(pool)
            .await?;
    Ok(users)
}

pub async fn count(pool: &PgPool) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
