use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    client::TodoApi,
    entities::{CreateTodoRequest, FilterSpec, FilterUpdate, Todo},
    error::TodoError,
    filter,
    storage::{Storage, FAVORITES_KEY},
};

#[derive(Debug, Default)]
struct TodoState {
    todos: Vec<Todo>,
    favorites: Vec<i64>,
    filters: FilterSpec,
    error: Option<String>,
    in_flight: usize,
    // bumped by every fetch; older responses are dropped
    generation: u64,
    loaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied(usize),
    /// A newer fetch started before this one finished.
    Stale,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoSnapshot {
    pub todos: Vec<Todo>,
    pub total: usize,
    pub favorites: Vec<i64>,
    pub filters: FilterSpec,
    pub unique_user_ids: Vec<i64>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct TodoStore {
    api: Arc<dyn TodoApi>,
    storage: Arc<dyn Storage>,
    state: Mutex<TodoState>,
}

impl TodoStore {
    pub async fn new(api: Arc<dyn TodoApi>, storage: Arc<dyn Storage>) -> Self {
        let favorites = load_favorites(storage.as_ref()).await;

        Self {
            api,
            storage,
            state: Mutex::new(TodoState {
                favorites,
                ..Default::default()
            }),
        }
    }

    pub async fn fetch_todos(&self) -> Result<FetchOutcome, TodoError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.in_flight += 1;
            state.error = None;
            state.generation
        };

        let fetched = self.api.fetch_todos().await;

        let mut state = self.state.lock().await;
        state.in_flight -= 1;
        if ticket != state.generation {
            debug!(ticket, latest = state.generation, "dropping stale todo response");
            return Ok(FetchOutcome::Stale);
        }

        match fetched {
            Ok(todos) => {
                let count = todos.len();
                info!(count, "todos loaded");
                state.todos = todos;
                state.loaded = true;
                state.error = None;
                Ok(FetchOutcome::Applied(count))
            }
            Err(err) => {
                let err = TodoError::Fetch(err);
                warn!(%err, "fetching todos failed");
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, TodoError> {
        {
            let mut state = self.state.lock().await;
            state.in_flight += 1;
            state.error = None;
        }

        let created = self.api.create_todo(request).await;

        let mut state = self.state.lock().await;
        state.in_flight -= 1;
        match created {
            Ok(todo) => {
                info!(id = todo.id, "todo created");
                // newest first
                state.todos.insert(0, todo.clone());
                Ok(todo)
            }
            Err(err) => {
                let err = TodoError::Create(err);
                warn!(%err, "creating todo failed");
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Returns whether `id` is a favorite afterwards.
    pub async fn toggle_favorite(&self, id: i64) -> bool {
        let (favorite, favorites) = {
            let mut state = self.state.lock().await;
            let favorite = match state.favorites.iter().position(|&fav| fav == id) {
                Some(index) => {
                    state.favorites.remove(index);
                    false
                }
                None => {
                    state.favorites.push(id);
                    true
                }
            };
            (favorite, state.favorites.clone())
        };

        save_favorites(self.storage.as_ref(), &favorites).await;
        info!(id, favorite, "favorites updated");
        favorite
    }

    pub async fn is_favorite(&self, id: i64) -> bool {
        self.state.lock().await.favorites.contains(&id)
    }

    pub async fn update_filters(&self, update: FilterUpdate) -> FilterSpec {
        let mut state = self.state.lock().await;
        state.filters.merge(update);
        debug!(filters = ?state.filters, "filters updated");
        state.filters.clone()
    }

    pub async fn clear_filters(&self) -> FilterSpec {
        let mut state = self.state.lock().await;
        state.filters = FilterSpec::default();
        debug!("filters cleared");
        state.filters.clone()
    }

    pub async fn filters(&self) -> FilterSpec {
        self.state.lock().await.filters.clone()
    }

    pub async fn todos(&self) -> Vec<Todo> {
        self.state.lock().await.todos.clone()
    }

    pub async fn favorites(&self) -> Vec<i64> {
        self.state.lock().await.favorites.clone()
    }

    pub async fn filtered_todos(&self) -> Vec<Todo> {
        let state = self.state.lock().await;
        filter::filter_todos(&state.todos, &state.filters, &state.favorites)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn unique_user_ids(&self) -> Vec<i64> {
        filter::unique_user_ids(&self.state.lock().await.todos)
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.in_flight > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Whether a fetch has ever completed successfully.
    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.loaded
    }

    pub async fn snapshot(&self) -> TodoSnapshot {
        let state = self.state.lock().await;
        let todos: Vec<Todo> = filter::filter_todos(&state.todos, &state.filters, &state.favorites)
            .into_iter()
            .cloned()
            .collect();

        TodoSnapshot {
            todos,
            total: state.todos.len(),
            favorites: state.favorites.clone(),
            filters: state.filters.clone(),
            unique_user_ids: filter::unique_user_ids(&state.todos),
            is_loading: state.in_flight > 0,
            error: state.error.clone(),
        }
    }
}

async fn load_favorites(storage: &dyn Storage) -> Vec<i64> {
    let raw = match storage.load(FAVORITES_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(%err, "failed to load favorites");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!(%err, "failed to parse favorites");
        Vec::new()
    })
}

async fn save_favorites(storage: &dyn Storage, favorites: &[i64]) {
    let saved = match serde_json::to_string(favorites) {
        Ok(serialized) => storage.save(FAVORITES_KEY, &serialized).await,
        Err(err) => Err(err.into()),
    };
    if let Err(err) = saved {
        warn!(%err, "failed to save favorites");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Notify;

    use super::*;
    use crate::{
        entities::{StatusFilter, UserFilter},
        error::{ClientError, CREATE_FAILED, FETCH_FAILED},
        storage::MemoryStorage,
    };

    fn todo(id: i64, user_id: i64, title: &str) -> Todo {
        Todo {
            id,
            user_id,
            title: title.into(),
            completed: false,
        }
    }

    struct FakeApi {
        todos: Vec<Todo>,
        fail: AtomicBool,
    }

    impl FakeApi {
        fn new(todos: Vec<Todo>) -> Arc<Self> {
            Arc::new(Self {
                todos,
                fail: AtomicBool::new(false),
            })
        }
    }

    #[async_trait::async_trait]
    impl TodoApi for FakeApi {
        async fn fetch_todos(&self) -> Result<Vec<Todo>, ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Server(reqwest::StatusCode::BAD_GATEWAY));
            }
            Ok(self.todos.clone())
        }

        async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Status(reqwest::StatusCode::BAD_REQUEST));
            }
            Ok(todo(201, request.user_id, &request.title))
        }
    }

    #[tokio::test]
    async fn fetch_replaces_list_and_clears_error() {
        let api = FakeApi::new(vec![todo(1, 1, "A"), todo(2, 2, "B")]);
        let store = TodoStore::new(api.clone(), Arc::new(MemoryStorage::new())).await;

        api.fail.store(true, Ordering::SeqCst);
        assert!(matches!(store.fetch_todos().await, Err(TodoError::Fetch(_))));
        assert_eq!(store.error().await.as_deref(), Some(FETCH_FAILED));
        assert!(!store.is_loaded().await);

        api.fail.store(false, Ordering::SeqCst);
        assert_eq!(store.fetch_todos().await.unwrap(), FetchOutcome::Applied(2));
        assert_eq!(store.error().await, None);
        assert_eq!(store.todos().await.len(), 2);
        assert!(!store.is_loading().await);
        assert!(store.is_loaded().await);
    }

    #[tokio::test]
    async fn create_prepends() {
        let api = FakeApi::new(vec![todo(1, 1, "A"), todo(2, 1, "B")]);
        let store = TodoStore::new(api, Arc::new(MemoryStorage::new())).await;
        store.fetch_todos().await.unwrap();

        let created = store
            .create_todo(&CreateTodoRequest {
                user_id: 1,
                title: "C".into(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, 201);
        let titles: Vec<String> = store.todos().await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn failed_create_leaves_list_alone() {
        let api = FakeApi::new(vec![todo(1, 1, "A")]);
        let store = TodoStore::new(api.clone(), Arc::new(MemoryStorage::new())).await;
        store.fetch_todos().await.unwrap();
        api.fail.store(true, Ordering::SeqCst);

        let err = store
            .create_todo(&CreateTodoRequest {
                user_id: 1,
                title: "C".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::Create(_)));
        assert_eq!(store.error().await.as_deref(), Some(CREATE_FAILED));
        assert_eq!(store.todos().await, vec![todo(1, 1, "A")]);
    }

    #[tokio::test]
    async fn double_toggle_restores_favorites() {
        let storage = Arc::new(MemoryStorage::with_entries([(FAVORITES_KEY, "[3]")]));
        let store = TodoStore::new(FakeApi::new(vec![]), storage.clone()).await;

        assert!(store.is_favorite(3).await);
        assert!(store.toggle_favorite(5).await);
        assert_eq!(
            storage.load(FAVORITES_KEY).await.unwrap().as_deref(),
            Some("[3,5]")
        );

        assert!(!store.toggle_favorite(5).await);
        assert_eq!(store.favorites().await, vec![3]);
        assert_eq!(
            storage.load(FAVORITES_KEY).await.unwrap().as_deref(),
            Some("[3]")
        );
    }

    #[tokio::test]
    async fn corrupt_favorites_start_empty() {
        let storage = Arc::new(MemoryStorage::with_entries([(FAVORITES_KEY, "oops")]));
        let store = TodoStore::new(FakeApi::new(vec![]), storage).await;

        assert!(store.favorites().await.is_empty());
    }

    #[tokio::test]
    async fn filtered_view_follows_filters_and_favorites() {
        let api = FakeApi::new(vec![
            todo(1, 3, "Buy milk"),
            todo(2, 1, "Walk"),
            todo(3, 2, "Buy stamps"),
            todo(4, 1, "Call"),
        ]);
        let store = TodoStore::new(api, Arc::new(MemoryStorage::new())).await;
        store.fetch_todos().await.unwrap();
        store.toggle_favorite(3).await;
        store.toggle_favorite(1).await;

        store
            .update_filters(FilterUpdate {
                status: Some(StatusFilter::Favorites),
                ..Default::default()
            })
            .await;
        let ids: Vec<i64> = store.filtered_todos().await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let filters = store
            .update_filters(FilterUpdate {
                user_id: Some(UserFilter::User(2)),
                ..Default::default()
            })
            .await;
        assert_eq!(filters.status, StatusFilter::Favorites);
        let ids: Vec<i64> = store.filtered_todos().await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3]);

        assert_eq!(store.clear_filters().await, FilterSpec::default());
        assert_eq!(store.filtered_todos().await.len(), 4);
        assert_eq!(store.unique_user_ids().await, vec![1, 2, 3]);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.favorites, vec![3, 1]);
    }

    /// Holds the first fetch until told to continue.
    struct GatedApi {
        gate: Notify,
        first: AtomicBool,
    }

    #[async_trait::async_trait]
    impl TodoApi for GatedApi {
        async fn fetch_todos(&self) -> Result<Vec<Todo>, ClientError> {
            if self.first.swap(false, Ordering::SeqCst) {
                self.gate.notified().await;
                return Ok(vec![todo(1, 1, "old")]);
            }
            Ok(vec![todo(2, 1, "new")])
        }

        async fn create_todo(&self, _: &CreateTodoRequest) -> Result<Todo, ClientError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn stale_fetch_is_discarded() {
        let api = Arc::new(GatedApi {
            gate: Notify::new(),
            first: AtomicBool::new(true),
        });
        let store = Arc::new(TodoStore::new(api.clone(), Arc::new(MemoryStorage::new())).await);

        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_todos().await }
        });
        // let the slow fetch take its ticket
        while !store.is_loading().await {
            tokio::task::yield_now().await;
        }

        assert_eq!(store.fetch_todos().await.unwrap(), FetchOutcome::Applied(1));
        api.gate.notify_one();

        assert_eq!(slow.await.unwrap().unwrap(), FetchOutcome::Stale);
        assert_eq!(store.todos().await, vec![todo(2, 1, "new")]);
        assert!(!store.is_loading().await);
    }
}
