//! PostgreSQL movie repository implementation

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, EntityStream, Movie, NewMovie, Repository, RequestContext};
use crate::infrastructure::storage::map_sqlx_error;

const INSERT_MOVIE: &str = r#"
    INSERT INTO movies (title, year, director_id)
    VALUES ($1, $2, $3)
    RETURNING id, title, year, director_id
"#;

const SELECT_MOVIE: &str = "SELECT id, title, year, director_id FROM movies WHERE id = $1";

const SELECT_ALL_MOVIES: &str = "SELECT id, title, year, director_id FROM movies";

const DELETE_MOVIE: &str = "DELETE FROM movies WHERE id = $1";

const COUNT_MOVIES: &str = "SELECT COUNT(*) FROM movies";

/// PostgreSQL implementation of `Repository<Movie>`
#[derive(Debug, Clone)]
pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Movie> for PostgresMovieRepository {
    async fn create(&self, ctx: &RequestContext, draft: NewMovie) -> Result<Movie, DomainError> {
        let row = ctx
            .run("insert movie", async {
                sqlx::query(INSERT_MOVIE)
                    .bind(&draft.title)
                    .bind(draft.year)
                    .bind(draft.director_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| match map_sqlx_error("Failed to create movie", e) {
                        DomainError::Conflict { .. } => DomainError::conflict(format!(
                            "Movie references unknown director {:?}",
                            draft.director_id
                        )),
                        other => other,
                    })
            })
            .await?;

        row_to_movie(&row)
    }

    async fn get_by_id(&self, ctx: &RequestContext, id: &i64) -> Result<Movie, DomainError> {
        let row = ctx
            .run("select movie", async {
                sqlx::query(SELECT_MOVIE)
                    .bind(*id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to get movie", e))
            })
            .await?
            .ok_or_else(|| DomainError::not_found(format!("movie '{}' not found", id)))?;

        row_to_movie(&row)
    }

    async fn get_all<'a>(
        &'a self,
        ctx: &'a RequestContext,
    ) -> Result<EntityStream<'a, Movie>, DomainError> {
        ctx.ensure_active()?;

        let rows = sqlx::query(SELECT_ALL_MOVIES)
            .fetch(&self.pool)
            .map(|row| {
                row.map_err(|e| map_sqlx_error("Failed to list movies", e))
                    .and_then(|row| row_to_movie(&row))
            })
            .boxed();

        Ok(ctx.guard_stream(rows))
    }

    async fn delete_by_id(&self, ctx: &RequestContext, id: &i64) -> Result<(), DomainError> {
        let result = ctx
            .run("delete movie", async {
                sqlx::query(DELETE_MOVIE)
                    .bind(*id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to delete movie", e))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("movie '{}' not found", id)));
        }

        Ok(())
    }

    async fn count(&self, ctx: &RequestContext) -> Result<u64, DomainError> {
        let count: i64 = ctx
            .run("count movies", async {
                sqlx::query_scalar(COUNT_MOVIES)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to count movies", e))
            })
            .await?;

        Ok(count.max(0) as u64)
    }
}

fn row_to_movie(row: &PgRow) -> Result<Movie, DomainError> {
    let decode = |e| map_sqlx_error("Failed to decode movie row", e);

    Ok(Movie::new(
        row.try_get("id").map_err(decode)?,
        row.try_get::<String, _>("title").map_err(decode)?,
        row.try_get("year").map_err(decode)?,
        row.try_get("director_id").map_err(decode)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_parameterized() {
        for statement in [INSERT_MOVIE, SELECT_MOVIE, DELETE_MOVIE] {
            assert!(statement.contains("$1"), "{}", statement);
        }
    }

    #[test]
    fn test_listing_keeps_storage_order() {
        assert!(!SELECT_ALL_MOVIES.to_uppercase().contains("ORDER BY"));
    }
}
