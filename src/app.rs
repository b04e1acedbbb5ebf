use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    authentication::{self, AuthGate},
    client::{RemoteClient, TodoApi, UserDirectory},
    config::Config,
    crud_ops,
    error::ServerError,
    storage::{SqliteStorage, Storage},
    todo_store::TodoStore,
};

/// The containers one running dashboard owns.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub todos: Arc<TodoStore>,
}

impl AppState {
    pub async fn new(
        directory: Arc<dyn UserDirectory>,
        api: Arc<dyn TodoApi>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let auth = AuthGate::new(directory, storage.clone());
        auth.initialize().await;
        let todos = TodoStore::new(api, storage).await;

        Self {
            auth: Arc::new(auth),
            todos: Arc::new(todos),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/login",
            get(authentication::login_page).post(authentication::sign_in),
        )
        .route("/login/error", delete(authentication::clear_login_error))
        .route("/logout", post(authentication::sign_out))
        .route("/", get(crud_ops::dashboard))
        .route("/todos", post(crud_ops::create_todo))
        .route("/todos/refresh", post(crud_ops::refresh_todos))
        .route("/favorites/{id}", post(crud_ops::toggle_favorite))
        .route(
            "/filters",
            delete(crud_ops::clear_filters).patch(crud_ops::update_filters),
        )
        .fallback(crud_ops::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), ServerError> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let storage = Arc::new(SqliteStorage::connect(&config.database_url).await?);
    let client = Arc::new(RemoteClient::new(
        &config.api_base_url,
        config.request_timeout(),
    )?);
    let state = AppState::new(client.clone(), client, storage).await;

    let listener = TcpListener::bind(&config.bind).await?;
    serve(listener, state).await
}
