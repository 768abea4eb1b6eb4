use sqlx::PgPool;

use crate::database::manager::DatabaseError;

/// Owner references are plain UUID columns rather than foreign keys: deleting
/// a user leaves their records behind, and deleting a project never touches
/// the tasks it references.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        full_name TEXT NOT NULL,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        avatar TEXT,
        bio TEXT,
        last_login TIMESTAMPTZ,
        role TEXT NOT NULL DEFAULT 'User' CHECK (role IN ('Admin', 'User')),
        refresh_token TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending'
            CHECK (status IN ('Pending', 'In-Progress', 'Completed')),
        priority TEXT NOT NULL DEFAULT 'Medium'
            CHECK (priority IN ('Low', 'Medium', 'High')),
        due_date TIMESTAMPTZ NOT NULL,
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        tag TEXT NOT NULL DEFAULT 'Personal' CHECK (tag IN ('Work', 'Personal')),
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Active'
            CHECK (status IN ('Active', 'On Hold', 'Completed')),
        tasks UUID[] NOT NULL DEFAULT '{}',
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_projects_user_id ON projects (user_id)",
];

/// Bootstrap the schema at startup. Statements are idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
