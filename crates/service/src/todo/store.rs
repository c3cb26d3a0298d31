use std::{collections::HashSet, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;
use crate::todo::domain::{CreateTodoInput, NameMatch, Todo, UpdateTodoInput};
use crate::todo::repository::TodoRepository;

#[derive(Clone, Debug)]
struct State {
    todos: Vec<Todo>,
    /// Next id to hand out. Only ever grows, so deleted ids are never reused.
    next_id: i64,
}

impl State {
    fn empty() -> Self {
        Self { todos: Vec::new(), next_id: 1 }
    }

    /// Build state from persisted records, rejecting anything that breaks the
    /// collection invariants: ids unique and positive, names non-blank.
    fn from_todos(todos: Vec<Todo>) -> Result<Self, ServiceError> {
        let mut seen = HashSet::with_capacity(todos.len());
        for todo in &todos {
            if todo.id <= 0 {
                return Err(ServiceError::storage(format!("todo id {} is not positive", todo.id)));
            }
            if !seen.insert(todo.id) {
                return Err(ServiceError::storage(format!("duplicate todo id {}", todo.id)));
            }
            if todo.name.trim().is_empty() {
                return Err(ServiceError::storage(format!("todo {} has a blank name", todo.id)));
            }
        }
        let max = todos.iter().map(|t| t.id).max().unwrap_or(0);
        let next_id = max
            .checked_add(1)
            .ok_or_else(|| ServiceError::storage(format!("todo id {max} leaves no room for new ids")))?;
        Ok(Self { todos, next_id })
    }

    /// Hand out the next id; fails instead of wrapping once the id space is used up.
    fn issue_id(&mut self) -> Result<i64, ServiceError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| ServiceError::storage("todo id space exhausted"))?;
        Ok(id)
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }
}

/// Ordered, in-memory todo collection with optional JSON write-through.
///
/// Every mutation is applied to a staged copy, written to disk when persistence is
/// enabled, and only then committed. A failed write leaves the collection untouched.
pub struct TodoStore {
    inner: RwLock<State>,
    file: Option<JsonListStore<Todo>>,
}

impl TodoStore {
    /// Store that lives only in process memory.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: RwLock::new(State::empty()), file: None })
    }

    /// Open a file-backed store. A missing, unreadable or invalid file is logged and
    /// the store starts empty; the file is (re)written on the first mutation.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        let file = JsonListStore::<Todo>::new(path);
        // unreadable JSON and invariant violations are handled the same way
        let state = match file.load().await.and_then(|todos| todos.map(State::from_todos).transpose()) {
            Ok(Some(state)) => {
                info!(event = "todos_loaded", path = %file.path().display(), count = state.todos.len(), next_id = state.next_id, "loaded persisted todos");
                state
            }
            Ok(None) => {
                info!(event = "todos_file_missing", path = %file.path().display(), "no persisted todos; starting empty");
                State::empty()
            }
            Err(e) => {
                warn!(event = "todos_load_failed", path = %file.path().display(), error = %e, "ignoring persisted todos; starting empty");
                State::empty()
            }
        };
        Arc::new(Self { inner: RwLock::new(state), file: Some(file) })
    }

    pub fn is_persistent(&self) -> bool {
        self.file.is_some()
    }

    /// Seed the given `(name, user_id)` pairs when the collection is empty.
    /// Returns how many records were added.
    pub async fn seed_if_empty(&self, seed: &[(&str, i64)]) -> Result<usize, ServiceError> {
        self.commit(|state| {
            if !state.todos.is_empty() {
                return Ok(0);
            }
            for (name, user_id) in seed {
                let id = state.issue_id()?;
                state.todos.push(Todo { id, name: (*name).to_string(), user_id: *user_id });
            }
            Ok(seed.len())
        })
        .await
    }

    /// Stage `f` on a copy, persist it if enabled, then swap it in.
    /// The write lock is held throughout so mutations never interleave.
    async fn commit<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut State) -> Result<R, ServiceError>,
    {
        let mut guard = self.inner.write().await;
        // `f` only ever sees the copy; an early `Err` drops it with nothing applied
        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        // save before swapping so memory never runs ahead of the file
        if let Some(file) = &self.file {
            if let Err(e) = file.save(&staged.todos).await {
                error!(event = "todos_persist_failed", path = %file.path().display(), error = %e, "mutation rolled back");
                return Err(e);
            }
        }
        *guard = staged;
        Ok(out)
    }
}

#[async_trait]
impl TodoRepository for TodoStore {
    async fn list_all(&self) -> Vec<Todo> {
        self.inner.read().await.todos.clone()
    }

    async fn get_by_id(&self, id: i64) -> Result<Todo, ServiceError> {
        let state = self.inner.read().await;
        state
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("todo"))
    }

    async fn list_by_user(&self, user_id: i64) -> Vec<Todo> {
        let state = self.inner.read().await;
        state.todos.iter().filter(|t| t.user_id == user_id).cloned().collect()
    }

    async fn list_by_name(&self, name: &str, mode: NameMatch) -> Result<Vec<Todo>, ServiceError> {
        if name.is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        let needle = name.to_lowercase();
        let state = self.inner.read().await;
        Ok(state.todos.iter().filter(|t| mode.matches(&t.name, &needle)).cloned().collect())
    }

    async fn create(&self, input: CreateTodoInput) -> Result<Todo, ServiceError> {
        let (name, user_id) = input.validate()?;
        let todo = self
            .commit(|state| {
                let todo = Todo { id: state.issue_id()?, name, user_id };
                state.todos.push(todo.clone());
                Ok(todo)
            })
            .await?;
        info!(event = "todo_created", id = todo.id, user_id = todo.user_id);
        Ok(todo)
    }

    async fn update(&self, id: i64, input: UpdateTodoInput) -> Result<Todo, ServiceError> {
        let (name, user_id) = input.validate()?;
        let todo = self
            .commit(|state| {
                let idx = state.position(id).ok_or_else(|| ServiceError::not_found("todo"))?;
                let existing = &mut state.todos[idx];
                existing.name = name;
                if let Some(user_id) = user_id {
                    existing.user_id = user_id;
                }
                Ok(existing.clone())
            })
            .await?;
        info!(event = "todo_updated", id = todo.id);
        Ok(todo)
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<usize, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Validation("todoId is required".into()));
        }
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let removed = self
            .commit(|state| {
                let before = state.todos.len();
                state.todos.retain(|t| !wanted.contains(&t.id));
                match before - state.todos.len() {
                    0 => Err(ServiceError::NotFound("none of the specified todos were found".into())),
                    n => Ok(n),
                }
            })
            .await?;
        info!(event = "todos_deleted", requested = wanted.len(), removed);
        Ok(removed)
    }

    async fn delete_by_id(&self, id: i64) -> Result<Todo, ServiceError> {
        let todo = self
            .commit(|state| {
                let idx = state.position(id).ok_or_else(|| ServiceError::not_found("todo"))?;
                Ok(state.todos.remove(idx))
            })
            .await?;
        info!(event = "todo_deleted", id);
        Ok(todo)
    }

    async fn delete_all(&self) -> Result<usize, ServiceError> {
        let removed = self
            .commit(|state| {
                let n = state.todos.len();
                state.todos.clear();
                Ok(n)
            })
            .await?;
        info!(event = "todos_cleared", removed);
        Ok(removed)
    }
}
