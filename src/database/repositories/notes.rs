use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::note::{Note, NoteTag, NoteUpdate};

pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tag: NoteTag,
    pub user_id: Uuid,
}

/// Note search is always owner-scoped; there is no admin-wide variant.
#[derive(Debug, Default)]
pub struct NoteSearch {
    pub q: Option<String>,
    pub tag: Option<NoteTag>,
}

pub async fn create(pool: &PgPool, new_note: NewNote) -> Result<Note, DatabaseError> {
    let note = sqlx::query_as::<_, Note>(
        r#"
        INSERT INTO notes (id, title, content, tag, user_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_note.title)
    .bind(&new_note.content)
    .bind(new_note.tag)
    .bind(new_note.user_id)
    .fetch_one(pool)
    .await?;
    Ok(note)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Note>, DatabaseError> {
    let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(note)
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
    let notes = sqlx::query_as::<_, Note>(
        "SELECT * FROM notes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(notes)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    update: &NoteUpdate,
) -> Result<Option<Note>, DatabaseError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE notes SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(title) = &update.title {
            set.push("title = ");
            set.push_bind_unseparated(title);
        }
        if let Some(content) = &update.content {
            set.push("content = ");
            set.push_bind_unseparated(content);
        }
        if let Some(tag) = update.tag {
            set.push("tag = ");
            set.push_bind_unseparated(tag);
        }
        set.push("updated_at = now()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    let note = qb.build_query_as::<Note>().fetch_optional(pool).await?;
    Ok(note)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn search(
    pool: &PgPool,
    user_id: Uuid,
    search: &NoteSearch,
) -> Result<Vec<Note>, DatabaseError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM notes WHERE user_id = ");
    qb.push_bind(user_id);
    if let Some(q) = &search.q {
        let pattern = format!("%{}%", q);
        qb.push(" AND (title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR content ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(tag) = search.tag {
        qb.push(" AND tag = ");
        qb.push_bind(tag);
    }
    qb.push(" ORDER BY created_at DESC");

    let notes = qb.build_query_as::<Note>().fetch_all(pool).await?;
    Ok(notes)
}

pub async fn count(pool: &PgPool) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM notes")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM notes WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
