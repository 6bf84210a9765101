pub mod query;
pub mod store;

pub use store::{SqliteTodoStore, TodoStore};
