//! PostgreSQL user repository implementation

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{
    DomainError, EntityStream, HashedCredential, Login, NewUser, Repository, RequestContext, User,
};
use crate::infrastructure::storage::map_sqlx_error;

const INSERT_USER: &str = r#"
    INSERT INTO users (login, password_hash)
    VALUES ($1, $2)
    RETURNING login, password_hash
"#;

const SELECT_USER: &str = "SELECT login, password_hash FROM users WHERE login = $1";

const SELECT_ALL_USERS: &str = "SELECT login, password_hash FROM users";

const DELETE_USER: &str = "DELETE FROM users WHERE login = $1";

const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

/// PostgreSQL implementation of `Repository<User>`
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for PostgresUserRepository {
    async fn create(&self, ctx: &RequestContext, draft: NewUser) -> Result<User, DomainError> {
        let row = ctx
            .run("insert user", async {
                sqlx::query(INSERT_USER)
                    .bind(draft.login.as_str())
                    .bind(draft.password_hash.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| match map_sqlx_error("Failed to create user", e) {
                        DomainError::Conflict { .. } => DomainError::conflict(format!(
                            "Login '{}' already exists",
                            draft.login
                        )),
                        other => other,
                    })
            })
            .await?;

        row_to_user(&row)
    }

    async fn get_by_id(&self, ctx: &RequestContext, login: &Login) -> Result<User, DomainError> {
        let row = ctx
            .run("select user", async {
                sqlx::query(SELECT_USER)
                    .bind(login.as_str())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to get user", e))
            })
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user '{}' not found", login)))?;

        row_to_user(&row)
    }

    async fn get_all<'a>(
        &'a self,
        ctx: &'a RequestContext,
    ) -> Result<EntityStream<'a, User>, DomainError> {
        ctx.ensure_active()?;

        let rows = sqlx::query(SELECT_ALL_USERS)
            .fetch(&self.pool)
            .map(|row| {
                row.map_err(|e| map_sqlx_error("Failed to list users", e))
                    .and_then(|row| row_to_user(&row))
            })
            .boxed();

        Ok(ctx.guard_stream(rows))
    }

    async fn delete_by_id(&self, ctx: &RequestContext, login: &Login) -> Result<(), DomainError> {
        let result = ctx
            .run("delete user", async {
                sqlx::query(DELETE_USER)
                    .bind(login.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to delete user", e))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("user '{}' not found", login)));
        }

        Ok(())
    }

    async fn count(&self, ctx: &RequestContext) -> Result<u64, DomainError> {
        let count: i64 = ctx
            .run("count users", async {
                sqlx::query_scalar(COUNT_USERS)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("Failed to count users", e))
            })
            .await?;

        Ok(count.max(0) as u64)
    }
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let login: String = row
        .try_get("login")
        .map_err(|e| map_sqlx_error("Failed to decode user row", e))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| map_sqlx_error("Failed to decode user row", e))?;

    let login = Login::new(login)
        .map_err(|e| DomainError::internal(format!("Invalid login in database: {}", e)))?;

    Ok(User::new(login, HashedCredential::new(password_hash)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_parameterized() {
        for statement in [INSERT_USER, SELECT_USER, DELETE_USER] {
            assert!(statement.contains("$1"), "{}", statement);
        }
        assert!(INSERT_USER.contains("$2"));
    }

    #[test]
    fn test_password_column_only_carries_hash() {
        assert!(INSERT_USER.contains("password_hash"));
        assert!(!INSERT_USER.contains("password,"));
    }
}
