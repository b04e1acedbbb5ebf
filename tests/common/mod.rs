#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use todo_dashboard::entities::{Todo, User};

/// Stand-in for the public users/todos API.
pub struct Upstream {
    pub users: Vec<User>,
    pub todos: Vec<Todo>,
    pub fail: AtomicBool,
}

impl Upstream {
    pub fn failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

async fn list_users(Extension(upstream): Extension<Arc<Upstream>>) -> impl IntoResponse {
    if upstream.fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(upstream.users.clone()).into_response()
}

async fn list_todos(Extension(upstream): Extension<Arc<Upstream>>) -> impl IntoResponse {
    if upstream.fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(upstream.todos.clone()).into_response()
}

// echoes the body with a fresh id and no `completed`, like the real API
async fn create_todo(
    Extension(upstream): Extension<Arc<Upstream>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if upstream.fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let echo = json!({
        "userId": body["userId"],
        "title": body["title"],
        "id": 201,
    });
    (StatusCode::CREATED, Json(echo)).into_response()
}

pub fn bret() -> User {
    serde_json::from_value(json!({
        "id": 1,
        "name": "Leanne Graham",
        "username": "Bret",
        "email": "Sincere@april.biz",
        "phone": "1-770-736-8031 x56442",
        "website": "hildegard.org",
        "address": {
            "street": "Kulas Light",
            "suite": "Apt. 556",
            "city": "Gwenborough",
            "zipcode": "92998-3874",
            "geo": { "lat": "-37.3159", "lng": "81.1496" }
        },
        "company": {
            "name": "Romaguera-Crona",
            "catchPhrase": "Multi-layered client-server neural-net",
            "bs": "harness real-time e-markets"
        }
    }))
    .expect("user fixture is valid")
}

pub fn antonette() -> User {
    User {
        id: 2,
        name: "Ervin Howell".into(),
        username: "Antonette".into(),
        phone: "010-692-6593 x09125".into(),
        ..Default::default()
    }
}

pub fn todos() -> Vec<Todo> {
    vec![
        Todo {
            id: 1,
            user_id: 2,
            title: "delectus aut autem".into(),
            completed: false,
        },
        Todo {
            id: 2,
            user_id: 1,
            title: "quis ut nam facilis".into(),
            completed: true,
        },
        Todo {
            id: 3,
            user_id: 1,
            title: "fugiat veniam minus".into(),
            completed: false,
        },
    ]
}

/// Serves the stub on an ephemeral port and returns its base URL.
pub async fn spawn_upstream() -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream {
        users: vec![bret(), antonette()],
        todos: todos(),
        fail: AtomicBool::new(false),
    });

    let app = Router::new()
        .route("/users", get(list_users))
        .route("/todos", get(list_todos).post(create_todo))
        .layer(Extension(upstream.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), upstream)
}
