use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::project::{Project, ProjectStatus, ProjectUpdate};

pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub user_id: Uuid,
}

pub async fn create(pool: &PgPool, new_project: NewProject) -> Result<Project, DatabaseError> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (id, name, description, status, user_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_project.name)
    .bind(&new_project.description)
    .bind(new_project.status)
    .bind(new_project.user_id)
    .fetch_one(pool)
    .await?;
    Ok(project)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, DatabaseError> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(project)
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(projects)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    update: &ProjectUpdate,
) -> Result<Option<Project>, DatabaseError> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE projects SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &update.name {
            set.push("name = ");
            set.push_bind_unseparated(name);
        }
        if let Some(description) = &update.description {
            set.push("description = ");
            set.push_bind_unseparated(description);
        }
        if let Some(status) = update.status {
            set.push("status = ");
            set.push_bind_unseparated(status);
        }
        set.push("updated_at = now()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    let project = qb.build_query_as::<Project>().fetch_optional(pool).await?;
    Ok(project)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Append a task reference if it is not already present. Returns `None` when
/// nothing changed (reference already present, or project gone).
pub async fn add_task(
    pool: &PgPool,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<Option<Project>, DatabaseError> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET tasks = array_append(tasks, $2), updated_at = now()
        WHERE id = $1 AND NOT ($2 = ANY(tasks))
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(task_id)
    .fetch_optional(pool)
    .await?;
    Ok(project)
}

/// Drop a task reference; removing an absent reference is a no-op.
pub async fn remove_task(
    pool: &PgPool,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<Option<Project>, DatabaseError> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET tasks = array_remove(tasks, $2), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(task_id)
    .fetch_optional(pool)
    .await?;
    Ok(project)
}

pub async fn count(pool: &PgPool) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM projects")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM projects WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
