use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{Category, Priority, Status};

/// Storage and wire format of `due_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub todo: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    #[serde(rename = "dueDate")]
    pub due_date: NaiveDate,
}

/// Raw JSON body of `POST /todos/` and `PUT /todos/{id}/`, before validation.
///
/// Checked fields keep their raw JSON value: an explicit `null` or a non-string
/// is `Some` and gets rejected by validation, only a missing key is `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPayload {
    pub id: Option<i64>,
    pub todo: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Value>,
    #[serde(rename = "dueDate", default, deserialize_with = "present")]
    pub due_date: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A fully specified row, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub id: i64,
    pub todo: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub due_date: NaiveDate,
}

/// The single column a `PUT` writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoChange {
    Status(Status),
    Priority(Priority),
    Todo(String),
    Category(Category),
    DueDate(NaiveDate),
}

impl TodoChange {
    pub fn column(&self) -> &'static str {
        match self {
            TodoChange::Status(_) => "status",
            TodoChange::Priority(_) => "priority",
            TodoChange::Todo(_) => "todo",
            TodoChange::Category(_) => "category",
            TodoChange::DueDate(_) => "due_date",
        }
    }

    /// Plain-text body sent back after the update.
    pub fn confirmation(&self) -> &'static str {
        match self {
            TodoChange::Status(_) => "Status Updated",
            TodoChange::Priority(_) => "Priority Updated",
            TodoChange::Todo(_) => "Todo Updated",
            TodoChange::Category(_) => "Category Updated",
            TodoChange::DueDate(_) => "Due Date Updated",
        }
    }

    /// The value as it is stored in the column.
    pub fn value(&self) -> String {
        match self {
            TodoChange::Status(status) => status.as_str().to_string(),
            TodoChange::Priority(priority) => priority.as_str().to_string(),
            TodoChange::Todo(text) => text.clone(),
            TodoChange::Category(category) => category.as_str().to_string(),
            TodoChange::DueDate(date) => date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Conjunction of optional read filters; `None` matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub search_q: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<NaiveDate>,
}
