use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    app::AppState,
    client::UserDirectory,
    entities::{Credentials, User},
    error::{AppError, LoginError},
    routes::{self, Navigation, Route},
    storage::{Storage, AUTH_KEY, USER_KEY},
    validation,
};

#[derive(Debug, Default)]
struct Session {
    current_user: Option<User>,
    login_error: Option<String>,
    // logins waiting on the directory
    in_flight: usize,
    initialized: bool,
}

/// Sign-in state for one application instance.
pub struct AuthGate {
    directory: Arc<dyn UserDirectory>,
    storage: Arc<dyn Storage>,
    session: Mutex<Session>,
}

impl AuthGate {
    pub fn new(directory: Arc<dyn UserDirectory>, storage: Arc<dyn Storage>) -> Self {
        Self {
            directory,
            storage,
            session: Mutex::new(Session::default()),
        }
    }

    /// Restores the persisted session. Only the first call does anything.
    pub async fn initialize(&self) {
        let mut session = self.session.lock().await;
        if session.initialized {
            return;
        }
        session.initialized = true;

        match self.restore().await {
            Ok(Some(user)) => {
                info!(username = %user.username, "session restored");
                session.current_user = Some(user);
            }
            Ok(None) => {}
            Err(reason) => {
                warn!(%reason, "discarding persisted session");
                self.forget().await;
            }
        }
    }

    async fn restore(&self) -> Result<Option<User>, String> {
        let user = self
            .storage
            .load(USER_KEY)
            .await
            .map_err(|err| err.to_string())?;
        let flag = self
            .storage
            .load(AUTH_KEY)
            .await
            .map_err(|err| err.to_string())?;

        match (user, flag.as_deref()) {
            (None, None) => Ok(None),
            (Some(user), Some("true")) => serde_json::from_str(&user)
                .map(Some)
                .map_err(|err| err.to_string()),
            _ => Err("user and auth flag disagree".into()),
        }
    }

    async fn forget(&self) {
        for key in [USER_KEY, AUTH_KEY] {
            if let Err(err) = self.storage.clear(key).await {
                warn!(key, %err, "failed to clear storage entry");
            }
        }
    }

    async fn persist(&self, user: &User) {
        let serialized = match serde_json::to_string(user) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(%err, "failed to serialize user");
                return;
            }
        };

        let saved = match self.storage.save(USER_KEY, &serialized).await {
            Ok(()) => self.storage.save(AUTH_KEY, "true").await,
            Err(err) => Err(err),
        };
        if let Err(err) = saved {
            warn!(%err, "failed to persist session");
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, LoginError> {
        {
            let mut session = self.session.lock().await;
            session.login_error = None;
            session.in_flight += 1;
        }

        let outcome = match self.directory.fetch_users().await {
            // linear scan, the directory is tiny
            Ok(users) => users
                .into_iter()
                .find(|user| user.matches(credentials))
                .ok_or(LoginError::InvalidCredentials),
            Err(err) => Err(LoginError::Network(err)),
        };

        // storage and memory change together under one lock
        let mut session = self.session.lock().await;
        session.in_flight -= 1;
        match outcome {
            Ok(user) => {
                self.persist(&user).await;
                info!(username = %user.username, "login succeeded");
                session.current_user = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                info!(username = %credentials.username, %err, "login failed");
                session.login_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn logout(&self) {
        let mut session = self.session.lock().await;
        session.current_user = None;
        self.forget().await;
        info!("logged out");
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.lock().await.current_user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.current_user.is_some()
    }

    pub async fn display_name(&self) -> String {
        self.session
            .lock()
            .await
            .current_user
            .as_ref()
            .map(|user| user.display_name().to_owned())
            .unwrap_or_default()
    }

    pub async fn is_loading(&self) -> bool {
        self.session.lock().await.in_flight > 0
    }

    pub async fn login_error(&self) -> Option<String> {
        self.session.lock().await.login_error.clone()
    }

    pub async fn clear_error(&self) {
        self.session.lock().await.login_error = None;
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub title: &'static str,
    pub login_error: Option<String>,
    pub is_loading: bool,
}

pub async fn login_page(Extension(state): Extension<AppState>) -> Response {
    let authenticated = state.auth.is_authenticated().await;
    match routes::resolve(routes::LOGIN_PATH, authenticated) {
        Navigation::Redirect(to) => Redirect::to(to).into_response(),
        Navigation::Render(route) => Json(LoginView {
            title: route.title(),
            login_error: state.auth.login_error().await,
            is_loading: state.auth.is_loading().await,
        })
        .into_response(),
    }
}

pub async fn sign_in(
    Extension(state): Extension<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<User>, AppError> {
    validation::validate_credentials(&credentials).map_err(AppError::Validation)?;

    let user = state.auth.login(&credentials).await?;
    Ok(Json(user))
}

pub async fn clear_login_error(Extension(state): Extension<AppState>) -> StatusCode {
    state.auth.clear_error().await;
    StatusCode::NO_CONTENT
}

pub async fn sign_out(Extension(state): Extension<AppState>) -> Redirect {
    state.auth.logout().await;
    Redirect::to(Route::Login.path())
}
