//! PostgreSQL director repository implementation

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{Director, DomainError, EntityStream, NewDirector, Repository, RequestContext};
use crate::infrastructure::storage::map_sqlx_error;

const INSERT_DIRECTOR: &str = "INSERT INTO directors (name) VALUES ($1) RETURNING id, name";

const SELECT_DIRECTOR: &str = "SELECT id, name FROM directors WHERE id = $1";

const SELECT_ALL_DIRECTORS: &str = "SELECT id, name FROM directors";

const DELETE_DIRECTOR: &str = "DELETE FROM directors WHERE id = $1";

const COUNT_DIRECTORS: &str = "SELECT COUNT(*) FROM directors";

/// PostgreSQL implementation of `Repository<Director>`
#[derive(Debug, Clone)]
pub struct PostgresDirectorRepository {
    pool: PgPool,
}

impl PostgresDirectorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Director> for PostgresDirectorRepository {
    async fn create(
        &self,
        ctx: &RequestContext,
        draft: NewDirector,
    ) -> Result<Director, DomainError> {
        let row = ctx
            .run("insert director", async {
                sqlx::query(INSERT_DIRECTOR)
                    .bind(&draft.name)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to create director", e))
            })
            .await?;

        row_to_director(&row)
    }

    async fn get_by_id(&self, ctx: &RequestContext, id: &i64) -> Result<Director, DomainError> {
        let row = ctx
            .run("select director", async {
                sqlx::query(SELECT_DIRECTOR)
                    .bind(*id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to get director", e))
            })
            .await?
            .ok_or_else(|| DomainError::not_found(format!("director '{}' not found", id)))?;

        row_to_director(&row)
    }

    async fn get_all<'a>(
        &'a self,
        ctx: &'a RequestContext,
    ) -> Result<EntityStream<'a, Director>, DomainError> {
        ctx.ensure_active()?;

        let rows = sqlx::query(SELECT_ALL_DIRECTORS)
            .fetch(&self.pool)
            .map(|row| {
                row.map_err(|e| map_sqlx_error("Failed to list directors", e))
                    .and_then(|row| row_to_director(&row))
            })
            .boxed();

        Ok(ctx.guard_stream(rows))
    }

    async fn delete_by_id(&self, ctx: &RequestContext, id: &i64) -> Result<(), DomainError> {
        let result = ctx
            .run("delete director", async {
                sqlx::query(DELETE_DIRECTOR)
                    .bind(*id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| match map_sqlx_error("Failed to delete director", e) {
                        DomainError::Conflict { .. } => DomainError::conflict(format!(
                            "director '{}' is still referenced by movies",
                            id
                        )),
                        other => other,
                    })
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("director '{}' not found", id)));
        }

        Ok(())
    }

    async fn count(&self, ctx: &RequestContext) -> Result<u64, DomainError> {
        let count: i64 = ctx
            .run("count directors", async {
                sqlx::query_scalar(COUNT_DIRECTORS)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to count directors", e))
            })
            .await?;

        Ok(count.max(0) as u64)
    }
}

fn row_to_director(row: &PgRow) -> Result<Director, DomainError> {
    let decode = |e| map_sqlx_error("Failed to decode director row", e);

    Ok(Director::new(
        row.try_get("id").map_err(decode)?,
        row.try_get::<String, _>("name").map_err(decode)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_parameterized() {
        for statement in [INSERT_DIRECTOR, SELECT_DIRECTOR, DELETE_DIRECTOR] {
            assert!(statement.contains("$1"), "{}", statement);
        }
        assert!(!SELECT_ALL_DIRECTORS.to_uppercase().contains("ORDER BY"));
    }
}
