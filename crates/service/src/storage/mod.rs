//! Storage abstractions for service layer
//!
//! Contains the file-backed JSON list used to mirror a collection on disk.

pub mod json_list_store;
