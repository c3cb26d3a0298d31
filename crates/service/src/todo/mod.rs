//! Todo records, their inputs, and the store that owns them.

pub mod domain;
pub mod repository;
pub mod store;

pub use domain::{parse_id, CreateTodoInput, IdValue, NameMatch, Todo, UpdateTodoInput};
pub use repository::TodoRepository;
pub use store::TodoStore;
