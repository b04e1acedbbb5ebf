use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::{
    entities::{CreateTodoRequest, Todo, User},
    error::ClientError,
};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
const USERS: &str = "/users";
const TODOS: &str = "/todos";

/// Source of the accounts that may sign in.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, ClientError>;
}

#[async_trait::async_trait]
pub trait TodoApi: Send + Sync {
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ClientError>;

    async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, ClientError>;
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        resource: &'static str,
    ) -> Result<Vec<T>, ClientError> {
        let response = self.http.get(self.url(endpoint)).send().await?;
        let items: Vec<T> = check_status(response, resource)?.json().await?;
        debug!(resource, count = items.len(), "fetched list");
        Ok(items)
    }
}

fn check_status(
    response: reqwest::Response,
    resource: &'static str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(resource))
    } else if status.is_server_error() {
        Err(ClientError::Server(status))
    } else {
        Err(ClientError::Status(status))
    }
}

#[async_trait::async_trait]
impl UserDirectory for RemoteClient {
    async fn fetch_users(&self) -> Result<Vec<User>, ClientError> {
        self.get_list(USERS, "Users").await.inspect_err(|err| {
            error!(%err, "fetching users failed");
        })
    }
}

#[async_trait::async_trait]
impl TodoApi for RemoteClient {
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.get_list(TODOS, "Todos").await.inspect_err(|err| {
            error!(%err, "fetching todos failed");
        })
    }

    async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, ClientError> {
        let response = self.http.post(self.url(TODOS)).json(request).send().await?;
        let created: Todo = check_status(response, "Todos")?.json().await?;
        debug!(id = created.id, "created todo");
        Ok(created)
    }
}
