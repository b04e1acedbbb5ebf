use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    app::AppState,
    entities::{CreateTodoRequest, FilterSpec, FilterUpdate, Todo, User},
    error::AppError,
    routes::{self, Navigation, LOGIN_PATH},
    todo_store::TodoSnapshot,
    validation::FieldErrors,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub title: &'static str,
    pub display_name: String,
    pub user: User,
    #[serde(flatten)]
    pub todos: TodoSnapshot,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteView {
    pub id: i64,
    pub favorite: bool,
}

async fn require_user(state: &AppState) -> Result<User, AppError> {
    state.auth.current_user().await.ok_or(AppError::Unauthorized)
}

async fn dashboard_view(state: &AppState, user: User) -> DashboardView {
    DashboardView {
        title: routes::Route::Dashboard.title(),
        display_name: user.display_name().to_owned(),
        user,
        todos: state.todos.snapshot().await,
    }
}

pub async fn dashboard(
    Extension(state): Extension<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let user = state.auth.current_user().await;
    let user = match (routes::resolve(routes::HOME_PATH, user.is_some()), user) {
        (Navigation::Render(_), Some(user)) => user,
        (Navigation::Redirect(to), _) => return Redirect::to(to).into_response(),
        (Navigation::Render(_), None) => return Redirect::to(LOGIN_PATH).into_response(),
    };

    // the first visit loads the list, later visits show what is there
    let first_visit = !state.todos.is_loaded().await && !state.todos.is_loading().await;
    if query.refresh || first_visit {
        // failures are part of the rendered view
        if let Err(err) = state.todos.fetch_todos().await {
            debug!(%err, "dashboard rendered without fresh todos");
        }
    }

    Json(dashboard_view(&state, user).await).into_response()
}

pub async fn refresh_todos(
    Extension(state): Extension<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    let user = require_user(&state).await?;
    state.todos.fetch_todos().await?;

    Ok(Json(dashboard_view(&state, user).await))
}

pub async fn create_todo(
    Extension(state): Extension<AppState>,
    Json(new_todo): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let user = require_user(&state).await?;

    let title = new_todo.title.trim();
    if title.is_empty() {
        let mut errors = FieldErrors::default();
        errors.insert("title", crate::validation::required_message("title"));
        return Err(AppError::Validation(errors));
    }

    let request = CreateTodoRequest {
        user_id: new_todo.user_id.unwrap_or(user.id),
        title: title.to_owned(),
    };
    let todo = state.todos.create_todo(&request).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn toggle_favorite(
    Extension(state): Extension<AppState>,
    Path(todo_id): Path<i64>,
) -> Result<Json<FavoriteView>, AppError> {
    require_user(&state).await?;

    let favorite = state.todos.toggle_favorite(todo_id).await;
    Ok(Json(FavoriteView {
        id: todo_id,
        favorite,
    }))
}

pub async fn update_filters(
    Extension(state): Extension<AppState>,
    Json(update): Json<FilterUpdate>,
) -> Result<Json<FilterSpec>, AppError> {
    require_user(&state).await?;

    Ok(Json(state.todos.update_filters(update).await))
}

pub async fn clear_filters(
    Extension(state): Extension<AppState>,
) -> Result<Json<FilterSpec>, AppError> {
    require_user(&state).await?;

    Ok(Json(state.todos.clear_filters().await))
}

pub async fn not_found() -> Redirect {
    Redirect::to(LOGIN_PATH)
}
