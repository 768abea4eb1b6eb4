use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::task::{Task, TaskPriority, TaskStatus, TaskUpdate};

pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Search filters; `owner: None` means no owner scoping (Admin callers).
#[derive(Debug, Default)]
pub struct TaskSearch {
    pub owner: Option<Uuid>,
    pub q: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Counts partitioned by completion; "pending" is everything not completed,
/// compared case-insensitively.
#[derive(Debug, FromRow)]
pub struct TaskStatusCounts {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

pub async fn create(pool: &PgPool, new_task: NewTask) -> Result<Task, DatabaseError> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (id, title, description, status, priority, due_date, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_task.title)
    .bind(&new_task.description)
    .bind(new_task.status)
    .bind(new_task.priority)
    .bind(new_task.due_date)
    .bind(new_task.user_id)
    .fetch_one(pool)
    .await?;
    Ok(task)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Task>, DatabaseError> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Task>, DatabaseError> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    update: &TaskUpdate,
) -> Result<Option<Task>, DatabaseError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE tasks SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(title) = &update.title {
            set.push("title = ");
            set.push_bind_unseparated(title);
        }
        if let Some(description) = &update.description {
            set.push("description = ");
            set.push_bind_unseparated(description);
        }
        if let Some(status) = update.status {
            set.push("status = ");
            set.push_bind_unseparated(status);
        }
        if let Some(priority) = update.priority {
            set.push("priority = ");
            set.push_bind_unseparated(priority);
        }
        if let Some(due_date) = update.due_date {
            set.push("due_date = ");
            set.push_bind_unseparated(due_date);
        }
        set.push("updated_at = now()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    let task = qb.build_query_as::<Task>().fetch_optional(pool).await?;
    Ok(task)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn search(pool: &PgPool, search: &TaskSearch) -> Result<Vec<Task>, DatabaseError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM tasks WHERE TRUE");
    if let Some(owner) = search.owner {
        qb.push(" AND user_id = ");
        qb.push_bind(owner);
    }
    if let Some(q) = &search.q {
        let pattern = format!("%{}%", q);
        qb.push(" AND (title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(status) = search.status {
        qb.push(" AND status = ");
        qb.push_bind(status);
    }
    if let Some(priority) = search.priority {
        qb.push(" AND priority = ");
        qb.push_bind(priority);
    }
    if let Some(due_from) = search.due_from {
        qb.push(" AND due_date >= ");
        qb.push_bind(due_from);
    }
    if let Some(due_to) = search.due_to {
        qb.push(" AND due_date <= ");
        qb.push_bind(due_to);
    }
    qb.push(" ORDER BY created_at DESC");
    if let Some(limit) = search.limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit);
    }

    let tasks = qb.build_query_as::<Task>().fetch_all(pool).await?;
    Ok(tasks)
}

pub async fn status_counts_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<TaskStatusCounts, DatabaseError> {
    let counts = sqlx::query_as::<_, TaskStatusCounts>(
        r#"
        SELECT count(*) AS total,
               count(*) FILTER (WHERE lower(status) = 'completed') AS completed,
               count(*) FILTER (WHERE lower(status) <> 'completed') AS pending
        FROM tasks
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

pub async fn recent_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Task>, DatabaseError> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

/// Fetch tasks by id, preserving the order of the input references.
pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Task>, DatabaseError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let mut tasks = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ANY($1)")
        .bind(ids.to_vec())
        .fetch_all(pool)
        .await?;

    let positions: HashMap<Uuid, usize> =
        ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    tasks.sort_by_key(|task| positions.get(&task.id).copied().unwrap_or(usize::MAX));
    Ok(tasks)
}

pub async fn count(pool: &PgPool) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM tasks")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
