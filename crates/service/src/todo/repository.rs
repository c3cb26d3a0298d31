use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::todo::domain::{CreateTodoInput, NameMatch, Todo, UpdateTodoInput};

/// Trait abstraction over the todo collection, used by the HTTP layer.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Every record, in insertion order.
    async fn list_all(&self) -> Vec<Todo>;
    async fn get_by_id(&self, id: i64) -> Result<Todo, ServiceError>;
    async fn list_by_user(&self, user_id: i64) -> Vec<Todo>;
    /// Case-insensitive name search; an empty result is not an error.
    async fn list_by_name(&self, name: &str, mode: NameMatch) -> Result<Vec<Todo>, ServiceError>;
    async fn create(&self, input: CreateTodoInput) -> Result<Todo, ServiceError>;
    async fn update(&self, id: i64, input: UpdateTodoInput) -> Result<Todo, ServiceError>;
    /// Remove every record whose id is listed; returns how many were removed.
    /// Fails with `NotFound` only when none matched.
    async fn delete_by_ids(&self, ids: &[i64]) -> Result<usize, ServiceError>;
    async fn delete_by_id(&self, id: i64) -> Result<Todo, ServiceError>;
    /// Clear the collection; returns how many records were removed.
    async fn delete_all(&self) -> Result<usize, ServiceError>;
}
