//! Request validation.
//!
//! Raw query-string and JSON-body fields are checked against the fixed
//! allow-lists and turned into typed values before a handler touches the
//! store. Checks run in a fixed order (priority, status, category, date) and
//! the first failure is the one reported.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Category, NewTodo, Priority, Status, TodoChange, TodoFilter, TodoPayload};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Todo Priority")]
    InvalidPriority,

    #[error("Invalid Todo Status")]
    InvalidStatus,

    #[error("Invalid Todo Category")]
    InvalidCategory,

    #[error("Invalid Due Date")]
    InvalidDueDate,

    #[error("Missing Todo Field: {0}")]
    MissingField(&'static str),
}

/// Query parameters accepted by `GET /todos/` and `GET /agenda/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoQueryParams {
    pub search_q: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// Body fields that passed validation. Absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedBody {
    pub id: Option<i64>,
    pub todo: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub due_date: Option<NaiveDate>,
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a client-supplied date into a calendar date.
///
/// Impossible dates such as `2021-02-30` are rejected rather than rolled over.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
        .ok_or(ValidationError::InvalidDueDate)
}

fn check_priority(raw: Option<&str>) -> Result<Option<Priority>, ValidationError> {
    raw.map(|p| p.parse().map_err(|_| ValidationError::InvalidPriority))
        .transpose()
}

fn check_status(raw: Option<&str>) -> Result<Option<Status>, ValidationError> {
    raw.map(|s| s.parse().map_err(|_| ValidationError::InvalidStatus))
        .transpose()
}

fn check_category(raw: Option<&str>) -> Result<Option<Category>, ValidationError> {
    raw.map(|c| c.parse().map_err(|_| ValidationError::InvalidCategory))
        .transpose()
}

fn check_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    raw.map(parse_due_date).transpose()
}

/// Body fields must be strings when present; `null` counts as present.
fn body_text(
    raw: Option<&Value>,
    err: ValidationError,
) -> Result<Option<&str>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(err),
    }
}

/// Validates list filters. A `date` parameter is checked but not used for
/// filtering here; only the agenda filters on it.
pub fn validate_query(params: &TodoQueryParams) -> Result<TodoFilter, ValidationError> {
    let priority = check_priority(params.priority.as_deref())?;
    let status = check_status(params.status.as_deref())?;
    let category = check_category(params.category.as_deref())?;
    check_date(params.date.as_deref())?;

    Ok(TodoFilter {
        search_q: params.search_q.clone(),
        status,
        priority,
        category,
        due_date: None,
    })
}

/// Validates agenda filters; the date is required.
pub fn validate_agenda_query(params: &TodoQueryParams) -> Result<TodoFilter, ValidationError> {
    let mut filter = validate_query(params)?;
    let date = params
        .date
        .as_deref()
        .ok_or(ValidationError::InvalidDueDate)?;
    filter.due_date = Some(parse_due_date(date)?);
    Ok(filter)
}

pub fn validate_body(payload: &TodoPayload) -> Result<ValidatedBody, ValidationError> {
    let priority = body_text(payload.priority.as_ref(), ValidationError::InvalidPriority)?;
    let priority = check_priority(priority)?;
    let status = body_text(payload.status.as_ref(), ValidationError::InvalidStatus)?;
    let status = check_status(status)?;
    let category = body_text(payload.category.as_ref(), ValidationError::InvalidCategory)?;
    let category = check_category(category)?;
    let due_date = body_text(payload.due_date.as_ref(), ValidationError::InvalidDueDate)?;
    let due_date = check_date(due_date)?;

    Ok(ValidatedBody {
        id: payload.id,
        todo: payload.todo.clone(),
        priority,
        status,
        category,
        due_date,
    })
}

impl ValidatedBody {
    /// Requires every column of the row.
    pub fn into_new_todo(self) -> Result<NewTodo, ValidationError> {
        Ok(NewTodo {
            id: self.id.ok_or(ValidationError::MissingField("id"))?,
            todo: self.todo.ok_or(ValidationError::MissingField("todo"))?,
            category: self
                .category
                .ok_or(ValidationError::MissingField("category"))?,
            priority: self
                .priority
                .ok_or(ValidationError::MissingField("priority"))?,
            status: self.status.ok_or(ValidationError::MissingField("status"))?,
            due_date: self
                .due_date
                .ok_or(ValidationError::MissingField("dueDate"))?,
        })
    }

    /// Picks the one field an update writes: status, then priority, then
    /// todo text, then category, then due date. Everything else is ignored.
    pub fn into_change(self) -> Option<TodoChange> {
        if let Some(status) = self.status {
            Some(TodoChange::Status(status))
        } else if let Some(priority) = self.priority {
            Some(TodoChange::Priority(priority))
        } else if let Some(todo) = self.todo {
            Some(TodoChange::Todo(todo))
        } else if let Some(category) = self.category {
            Some(TodoChange::Category(category))
        } else {
            self.due_date.map(TodoChange::DueDate)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_date_shapes() {
        assert_eq!(parse_due_date("2024-05-01"), Ok(date(2024, 5, 1)));
        assert_eq!(parse_due_date("2021-2-2"), Ok(date(2021, 2, 2)));
        assert_eq!(parse_due_date("2024/12/31"), Ok(date(2024, 12, 31)));
        assert_eq!(parse_due_date("05/01/2024"), Ok(date(2024, 5, 1)));
        assert_eq!(parse_due_date("May 1, 2024"), Ok(date(2024, 5, 1)));
        assert_eq!(parse_due_date("1 May 2024"), Ok(date(2024, 5, 1)));
        assert_eq!(parse_due_date("2024-05-01T10:30:00Z"), Ok(date(2024, 5, 1)));
        assert_eq!(parse_due_date("2024-05-01T10:30:00"), Ok(date(2024, 5, 1)));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        for raw in ["", "tomorrow", "2021-02-30", "2021-13-01", "2024-05-01x"] {
            assert_eq!(
                parse_due_date(raw),
                Err(ValidationError::InvalidDueDate),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn query_checks_priority_before_status() {
        let params = TodoQueryParams {
            status: Some("SOON".into()),
            priority: Some("URGENT".into()),
            ..Default::default()
        };
        assert_eq!(
            validate_query(&params),
            Err(ValidationError::InvalidPriority)
        );
    }

    #[test]
    fn query_rejects_bad_date_even_without_agenda() {
        let params = TodoQueryParams {
            date: Some("2021-02-30".into()),
            ..Default::default()
        };
        assert_eq!(validate_query(&params), Err(ValidationError::InvalidDueDate));
    }

    #[test]
    fn agenda_requires_a_date() {
        let params = TodoQueryParams::default();
        assert_eq!(
            validate_agenda_query(&params),
            Err(ValidationError::InvalidDueDate)
        );

        let params = TodoQueryParams {
            date: Some("2021-4-2".into()),
            category: Some("WORK".into()),
            ..Default::default()
        };
        let filter = validate_agenda_query(&params).unwrap();
        assert_eq!(filter.due_date, Some(date(2021, 4, 2)));
        assert_eq!(filter.category, Some(Category::Work));
    }

    #[test]
    fn empty_enum_value_is_not_absent() {
        let params = TodoQueryParams {
            status: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(validate_query(&params), Err(ValidationError::InvalidStatus));
    }

    #[test]
    fn update_precedence_picks_a_single_field() {
        let payload = TodoPayload {
            todo: Some("Walk".into()),
            category: Some(json!("HOME")),
            priority: Some(json!("LOW")),
            due_date: Some(json!("2024-01-02")),
            ..Default::default()
        };
        let change = validate_body(&payload).unwrap().into_change();
        assert_eq!(change, Some(TodoChange::Priority(Priority::Low)));

        let payload = TodoPayload {
            category: Some(json!("HOME")),
            due_date: Some(json!("2024-01-02")),
            ..Default::default()
        };
        let change = validate_body(&payload).unwrap().into_change();
        assert_eq!(change, Some(TodoChange::Category(Category::Home)));

        assert_eq!(ValidatedBody::default().into_change(), None);
    }

    #[test]
    fn unused_fields_are_still_validated() {
        let payload = TodoPayload {
            status: Some(json!("DONE")),
            category: Some(json!("GARDEN")),
            ..Default::default()
        };
        assert_eq!(
            validate_body(&payload),
            Err(ValidationError::InvalidCategory)
        );
    }

    #[test]
    fn non_string_and_null_body_fields_are_rejected() {
        let payload = TodoPayload {
            priority: Some(json!(5)),
            ..Default::default()
        };
        assert_eq!(validate_body(&payload), Err(ValidationError::InvalidPriority));

        let payload = TodoPayload {
            todo: Some("x".into()),
            priority: Some(Value::Null),
            ..Default::default()
        };
        assert_eq!(validate_body(&payload), Err(ValidationError::InvalidPriority));

        let payload = TodoPayload {
            status: Some(json!(["DONE"])),
            ..Default::default()
        };
        assert_eq!(validate_body(&payload), Err(ValidationError::InvalidStatus));

        let payload = TodoPayload {
            category: Some(json!(1)),
            ..Default::default()
        };
        assert_eq!(validate_body(&payload), Err(ValidationError::InvalidCategory));

        let payload = TodoPayload {
            due_date: Some(json!(20240501)),
            ..Default::default()
        };
        assert_eq!(validate_body(&payload), Err(ValidationError::InvalidDueDate));
    }

    #[test]
    fn null_is_present_but_missing_key_is_absent() {
        let payload: TodoPayload =
            serde_json::from_str(r#"{"priority": null, "todo": "x"}"#).unwrap();
        assert_eq!(payload.priority, Some(Value::Null));
        assert_eq!(payload.status, None);
    }

    #[test]
    fn create_needs_every_field() {
        let payload = TodoPayload {
            id: Some(1),
            todo: Some("Buy milk".into()),
            category: Some(json!("HOME")),
            priority: Some(json!("HIGH")),
            status: Some(json!("TO DO")),
            due_date: None,
        };
        assert_eq!(
            validate_body(&payload).unwrap().into_new_todo(),
            Err(ValidationError::MissingField("dueDate"))
        );
    }
}
