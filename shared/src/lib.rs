pub mod codec;
pub mod config;
pub mod expression;
pub mod models;
pub mod storage;
pub mod value;

pub use storage::{Attributes, ItemStore, StorageError};
pub use value::{ArrayKind, Fields, Set, Value, ValueError};
