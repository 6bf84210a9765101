use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

use crate::db::query;
use crate::error::AppError;
use crate::models::{NewTodo, Todo, TodoChange, TodoFilter};

/// Persistence seam for the `todo` table. Handlers only see this trait.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, AppError>;
    async fn find_todo(&self, id: i64) -> Result<Option<Todo>, AppError>;
    async fn insert_todo(&self, todo: &NewTodo) -> Result<(), AppError>;
    /// Returns the number of rows touched; zero when the id does not exist.
    async fn update_todo(&self, id: i64, change: &TodoChange) -> Result<u64, AppError>;
    async fn delete_todo(&self, id: i64) -> Result<u64, AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, AppError> {
        let mut builder = query::select_todos(filter);
        debug!("{}", builder.sql());
        let todos = builder.build_query_as::<Todo>().fetch_all(&self.pool).await?;
        Ok(todos)
    }

    async fn find_todo(&self, id: i64) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(&format!("{} WHERE id = ?", query::SELECT_TODOS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn insert_todo(&self, todo: &NewTodo) -> Result<(), AppError> {
        query::insert_todo(todo).build().execute(&self.pool).await?;
        Ok(())
    }

    async fn update_todo(&self, id: i64, change: &TodoChange) -> Result<u64, AppError> {
        let result = query::update_todo(id, change)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_todo(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }
}
