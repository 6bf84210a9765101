//! Parameterized statement assembly for the `todo` table.
//!
//! Column names only ever come from fixed strings; every client-supplied value
//! goes through `push_bind`.

use sqlx::{QueryBuilder, Sqlite};

use crate::models::todo::DATE_FORMAT;
use crate::models::{NewTodo, TodoChange, TodoFilter};

pub const SELECT_TODOS: &str =
    "SELECT id, todo, category, priority, status, due_date FROM todo";

/// Wraps a search term for `LIKE ... ESCAPE '\'`, so `%` and `_` typed by the
/// client match literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn select_todos(filter: &TodoFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(SELECT_TODOS);

    builder.push(" WHERE todo LIKE ");
    builder.push_bind(like_pattern(filter.search_q.as_deref().unwrap_or("")));
    builder.push(" ESCAPE '\\'");

    if let Some(date) = filter.due_date {
        builder.push(" AND due_date = ");
        builder.push_bind(date.format(DATE_FORMAT).to_string());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ");
        builder.push_bind(priority.as_str());
    }
    if let Some(category) = filter.category {
        builder.push(" AND category = ");
        builder.push_bind(category.as_str());
    }

    builder
}

pub fn insert_todo(todo: &NewTodo) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(
        "INSERT INTO todo (id, todo, priority, status, category, due_date) VALUES (",
    );
    let mut values = builder.separated(", ");
    values.push_bind(todo.id);
    values.push_bind(todo.todo.clone());
    values.push_bind(todo.priority.as_str());
    values.push_bind(todo.status.as_str());
    values.push_bind(todo.category.as_str());
    values.push_bind(todo.due_date.format(DATE_FORMAT).to_string());
    values.push_unseparated(")");
    builder
}

pub fn update_todo(id: i64, change: &TodoChange) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("UPDATE todo SET ");
    builder.push(change.column());
    builder.push(" = ");
    builder.push_bind(change.value());
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Category, Priority, Status};

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("milk"), "%milk%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn unfiltered_select_only_has_search_clause() {
        let builder = select_todos(&TodoFilter::default());
        assert_eq!(
            builder.sql(),
            "SELECT id, todo, category, priority, status, due_date FROM todo \
             WHERE todo LIKE ? ESCAPE '\\'"
        );
    }

    #[test]
    fn filters_are_anded_with_placeholders() {
        let filter = TodoFilter {
            search_q: Some("x'; DROP TABLE todo; --".into()),
            status: Some(Status::Done),
            priority: Some(Priority::High),
            category: Some(Category::Work),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        };
        let builder = select_todos(&filter);
        let sql = builder.sql();
        assert!(sql.ends_with(
            "AND due_date = ? AND status = ? AND priority = ? AND category = ?"
        ));
        assert!(!sql.contains("DROP"));
    }

    #[test]
    fn update_writes_one_column() {
        let builder = update_todo(7, &TodoChange::Todo("Read".into()));
        assert_eq!(builder.sql(), "UPDATE todo SET todo = ? WHERE id = ?");

        let due = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let builder = update_todo(7, &TodoChange::DueDate(due));
        assert_eq!(builder.sql(), "UPDATE todo SET due_date = ? WHERE id = ?");
    }

    #[test]
    fn insert_binds_all_six_columns() {
        let todo = NewTodo {
            id: 1,
            todo: "Buy milk".into(),
            category: Category::Home,
            priority: Priority::High,
            status: Status::ToDo,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        assert_eq!(
            insert_todo(&todo).sql(),
            "INSERT INTO todo (id, todo, priority, status, category, due_date) \
             VALUES (?, ?, ?, ?, ?, ?)"
        );
    }
}
