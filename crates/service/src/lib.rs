//! Service layer for the todo collection.
//! - `todo` holds the domain types, the repository trait and the in-memory store.
//! - `storage` holds the JSON file mirror used for write-through persistence.

pub mod errors;
pub mod storage;
pub mod todo;
