pub mod fields;
pub mod todo;

pub use fields::{Category, Priority, Status};
pub use todo::{NewTodo, Todo, TodoChange, TodoFilter, TodoPayload};
