use anyhow::Context;
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod api;
mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and the token secrets
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting Taskboard API in {:?} mode", config.environment);

    // Fail fast if the database is unreachable; the schema bootstrap is idempotent
    let pool = database::manager::DatabaseManager::pool()
        .await
        .context("failed to connect to the database")?;
    database::schema::ensure_schema(pool)
        .await
        .context("failed to bootstrap the database schema")?;

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("TASKBOARD_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Taskboard API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Versioned API
        .nest("/api/v1/auth", auth_routes())
        .nest("/api/v1/users", user_routes())
        .nest("/api/v1/tasks", task_routes())
        .nest("/api/v1/notes", note_routes())
        .nest("/api/v1/projects", project_routes())
        .nest("/api/v1/dashboard", dashboard_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        // Logout needs an authenticated session; the rest acquire one
        .route("/logout", post(auth::logout))
        .route_layer(axum::middleware::from_fn(middleware::auth::session_auth))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh-tokens", get(auth::refresh_tokens))
}

fn user_routes() -> Router {
    use axum::routing::{delete, patch};
    use handlers::users;

    Router::new()
        .route("/get-all-users", get(users::get_all_users))
        .route("/get-current-user", get(users::get_current_user))
        .route("/get-user-by-id/:userId", get(users::get_user_by_id))
        .route("/update-user-role/:userId", patch(users::update_user_role))
        .route("/delete-user/:userId", delete(users::delete_user))
        .route(
            "/delete-current-user-account",
            delete(users::delete_current_user_account),
        )
        .route("/change-password", patch(users::change_password))
        .route("/update-profile", patch(users::update_profile))
        .route_layer(axum::middleware::from_fn(middleware::auth::session_auth))
}

fn task_routes() -> Router {
    use axum::routing::{delete, patch, post};
    use handlers::tasks;

    Router::new()
        .route("/create", post(tasks::create_task))
        .route("/get-tasks", get(tasks::get_tasks))
        .route("/get-task-by-id/:id", get(tasks::get_task_by_id))
        .route("/update-task/:id", patch(tasks::update_task))
        .route("/delete-task/:id", delete(tasks::delete_task))
        .route("/search", get(tasks::search_tasks))
        .route("/get-all-tasks", get(tasks::get_all_tasks))
        .route_layer(axum::middleware::from_fn(middleware::auth::session_auth))
}

fn note_routes() -> Router {
    use axum::routing::{delete, patch, post};
    use handlers::notes;

    Router::new()
        .route("/create", post(notes::create_note))
        .route("/get-notes", get(notes::get_notes))
        .route("/get-note-by-id/:id", get(notes::get_note_by_id))
        .route("/update-note/:id", patch(notes::update_note))
        .route("/delete-note/:id", delete(notes::delete_note))
        .route("/search", get(notes::search_notes))
        .route_layer(axum::middleware::from_fn(middleware::auth::session_auth))
}

fn project_routes() -> Router {
    use axum::routing::{delete, patch, post};
    use handlers::projects;

    Router::new()
        .route("/create", post(projects::create_project))
        .route("/get-projects", get(projects::get_projects))
        .route("/get-project-by-id/:id", get(projects::get_project_by_id))
        .route("/update-project/:id", patch(projects::update_project))
        .route("/delete-project/:id", delete(projects::delete_project))
        .route(
            "/add-task-to-project/:taskId/:projectId",
            post(projects::add_task_to_project),
        )
        .route(
            "/remove-task-from-project/:taskId/:projectId",
            patch(projects::remove_task_from_project),
        )
        .route("/get-project-tasks/:id", get(projects::get_project_tasks))
        .route_layer(axum::middleware::from_fn(middleware::auth::session_auth))
}

fn dashboard_routes() -> Router {
    use handlers::dashboard;

    Router::new()
        .route("/user", get(dashboard::user_stats))
        .route("/admin", get(dashboard::admin_stats))
        .route_layer(axum::middleware::from_fn(middleware::auth::session_auth))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "statusCode": 200,
        "data": {
            "name": "Taskboard API",
            "version": version,
            "description": "Task, project and notes management REST API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/v1/auth/register, /api/v1/auth/login, /api/v1/auth/refresh-tokens (public), /api/v1/auth/logout (protected)",
                "users": "/api/v1/users/* (protected)",
                "tasks": "/api/v1/tasks/* (protected)",
                "notes": "/api/v1/notes/* (protected)",
                "projects": "/api/v1/projects/* (protected)",
                "dashboard": "/api/v1/dashboard/user, /api/v1/dashboard/admin (protected)",
            }
        },
        "message": "OK",
        "success": true,
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "statusCode": 200,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                },
                "message": "OK",
                "success": true,
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "statusCode": 503,
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                },
                "message": "database unavailable",
                "success": false,
            })),
        ),
    }
}
