//! HTTP server for the to-do page and JSON API.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::templates;
use crate::db::TaskStore;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{NewTask, Task, TaskId, TaskPatch};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct TodoServer {
    store: Arc<dyn TaskStore>,
}

impl TodoServer {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Get the task store.
    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Body of a successful delete.
#[derive(serde::Serialize)]
struct DeleteResponse {
    result: bool,
}

/// Parse a JSON request body whatever its `Content-Type`.
fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(ApiError::malformed)
}

/// Ids that are not integers cannot name a task.
fn parse_task_id(raw: &str) -> ApiResult<TaskId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::task_not_found(raw));
    }
    raw.parse().map_err(|_| ApiError::task_not_found(raw))
}

/// Root endpoint - the task list page, newest first.
async fn index(State(state): State<TodoServer>) -> ApiResult<Html<String>> {
    let tasks = state.store().list_tasks()?;
    Ok(Html(templates::render_index(&tasks)))
}

/// `GET /api/tasks`
async fn list_tasks(State(state): State<TodoServer>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.store().list_tasks()?))
}

/// `POST /api/tasks`
async fn create_task(
    State(state): State<TodoServer>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let request: NewTask = parse_json_body(&body)?;
    let title = request.title.as_deref().unwrap_or_default();
    let task = state.store().create_task(title)?;
    info!(task_id = task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /api/tasks/{id}`
///
/// The id is resolved before the body is parsed, so an unknown id is a 404
/// even when the body is malformed.
async fn update_task(
    State(state): State<TodoServer>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&raw_id)?;
    if state.store().get_task(id)?.is_none() {
        return Err(ApiError::task_not_found(id));
    }

    let patch: TaskPatch = parse_json_body(&body)?;
    let task = state.store().update_task(id, &patch)?;
    info!(task_id = id, completed = task.completed, "Task updated");
    Ok(Json(task))
}

/// `DELETE /api/tasks/{id}`
async fn delete_task(
    State(state): State<TodoServer>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_task_id(&raw_id)?;
    state.store().delete_task(id)?;
    info!(task_id = id, "Task deleted");
    Ok(Json(DeleteResponse { result: true }))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback for unknown routes.
async fn not_found() -> impl IntoResponse {
    (
        ErrorCode::RouteNotFound.status(),
        Html(templates::NOT_FOUND_TEMPLATE),
    )
}

/// Build the router with all routes.
pub fn build_router(state: TodoServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page routes
        .route("/", get(index))
        // API routes
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{task_id}",
            axum::routing::put(update_task).delete(delete_task),
        )
        .route("/api/health", get(health))
        .fallback(not_found)
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle to a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections, finish in-flight requests, and wait for the
    /// server task to exit.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.await?;
        Ok(())
    }
}

/// Bind `addr` and serve the router in a background task.
///
/// Port 0 picks a free port; see [`ServerHandle::addr`] for the result.
pub async fn start_server(state: TodoServer, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"healthy","version":"0.1.0"}"#);
    }

    #[test]
    fn non_integer_id_is_not_found() {
        for raw in ["abc", "+1", "-1", " 1", "1.0", ""] {
            let err = parse_task_id(raw).unwrap_err();
            assert_eq!(err.code, ErrorCode::TaskNotFound, "{raw:?}");
        }
        assert_eq!(parse_task_id("42").unwrap(), 42);
        assert_eq!(parse_task_id("007").unwrap(), 7);
    }

    #[test]
    fn body_is_parsed_without_content_type() {
        let body = Bytes::from_static(br#"{"title": "Buy milk"}"#);
        let parsed: NewTask = parse_json_body(&body).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Buy milk"));

        let err = parse_json_body::<NewTask>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedRequest);
    }
}
