//! In-memory repository implementation

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use crate::domain::{
    Director, DomainError, Entity, EntityStream, Movie, Repository, RequestContext, User,
};

/// Entities the in-memory store knows how to materialize from a draft
pub trait InMemoryRecord: Entity {
    /// Build the stored record. `sequence` is the next generated key.
    fn materialize(draft: Self::Draft, sequence: i64) -> Self;
}

impl InMemoryRecord for Movie {
    fn materialize(draft: Self::Draft, sequence: i64) -> Self {
        Movie::from_draft(sequence, draft)
    }
}

impl InMemoryRecord for Director {
    fn materialize(draft: Self::Draft, sequence: i64) -> Self {
        Director::from_draft(sequence, draft)
    }
}

impl InMemoryRecord for User {
    fn materialize(draft: Self::Draft, _sequence: i64) -> Self {
        User::from_draft(draft)
    }
}

#[derive(Debug)]
struct Table<E> {
    rows: Vec<E>,
    next_id: i64,
}

/// Thread-safe in-memory repository
///
/// Keeps insertion order, assigns sequential keys starting at 1 and enforces
/// primary-key uniqueness. Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryRepository<E: InMemoryRecord> {
    table: RwLock<Table<E>>,
    unavailable: AtomicBool,
}

impl<E: InMemoryRecord> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: InMemoryRecord> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::store_unavailable(format!(
                "In-memory {} store is marked unavailable",
                E::KIND
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: InMemoryRecord> Repository<E> for InMemoryRepository<E> {
    async fn create(&self, ctx: &RequestContext, draft: E::Draft) -> Result<E, DomainError> {
        ctx.run("create", async {
            self.check_available()?;
            let mut table = self.table.write().await;

            let record = E::materialize(draft, table.next_id);
            if table.rows.iter().any(|row| row.id() == record.id()) {
                return Err(DomainError::conflict(format!(
                    "{} '{}' already exists",
                    E::KIND,
                    record.id()
                )));
            }

            table.next_id += 1;
            table.rows.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn get_by_id(&self, ctx: &RequestContext, id: &E::Id) -> Result<E, DomainError> {
        ctx.run("get_by_id", async {
            self.check_available()?;
            let table = self.table.read().await;

            table
                .rows
                .iter()
                .find(|row| row.id() == id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("{} '{}' not found", E::KIND, id)))
        })
        .await
    }

    async fn get_all<'a>(
        &'a self,
        ctx: &'a RequestContext,
    ) -> Result<EntityStream<'a, E>, DomainError> {
        let snapshot = ctx
            .run("get_all", async {
                self.check_available()?;
                Ok(self.table.read().await.rows.clone())
            })
            .await?;

        Ok(ctx.guard_stream(stream::iter(snapshot.into_iter().map(Ok)).boxed()))
    }

    async fn delete_by_id(&self, ctx: &RequestContext, id: &E::Id) -> Result<(), DomainError> {
        ctx.run("delete_by_id", async {
            self.check_available()?;
            let mut table = self.table.write().await;

            let position = table
                .rows
                .iter()
                .position(|row| row.id() == id)
                .ok_or_else(|| {
                    DomainError::not_found(format!("{} '{}' not found", E::KIND, id))
                })?;

            table.rows.remove(position);
            Ok(())
        })
        .await
    }

    async fn count(&self, ctx: &RequestContext) -> Result<u64, DomainError> {
        ctx.run("count", async {
            self.check_available()?;
            Ok(self.table.read().await.rows.len() as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::time::Duration;

    use crate::domain::{HashedCredential, Login, NewMovie, NewUser};

    fn ctx() -> RequestContext {
        RequestContext::with_timeout(Duration::from_secs(5))
    }

    fn movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: 1979,
            director_id: None,
        }
    }

    fn new_user(login: &str) -> NewUser {
        NewUser {
            login: Login::new(login).unwrap(),
            password_hash: HashedCredential::new("$argon2id$stub"),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryRepository::<Movie>::new();

        let first = repo.create(&ctx(), movie("Stalker")).await.unwrap();
        let second = repo.create(&ctx(), movie("Solaris")).await.unwrap();

        assert_eq!(*first.id(), 1);
        assert_eq!(*second.id(), 2);
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryRepository::<Movie>::new();
        let created = repo.create(&ctx(), movie("Stalker")).await.unwrap();

        let fetched = repo.get_by_id(&ctx(), created.id()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = InMemoryRepository::<Movie>::new();

        let result = repo.get_by_id(&ctx(), &999).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_all_preserves_insertion_order() {
        let repo = InMemoryRepository::<Movie>::new();
        for title in ["Mirror", "Stalker", "Nostalghia"] {
            repo.create(&ctx(), movie(title)).await.unwrap();
        }

        let context = ctx();
        let all: Vec<Movie> = repo
            .get_all(&context)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let titles: Vec<&str> = all.iter().map(Movie::title).collect();
        assert_eq!(titles, vec!["Mirror", "Stalker", "Nostalghia"]);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let repo = InMemoryRepository::<Movie>::new();
        let created = repo.create(&ctx(), movie("Stalker")).await.unwrap();

        repo.delete_by_id(&ctx(), created.id()).await.unwrap();

        let result = repo.get_by_id(&ctx(), created.id()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryRepository::<Movie>::new();

        let result = repo.delete_by_id(&ctx(), &42).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_login_is_conflict() {
        let repo = InMemoryRepository::<User>::new();
        repo.create(&ctx(), new_user("alice")).await.unwrap();

        let result = repo.create(&ctx(), new_user("alice")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.count(&ctx()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_context_does_not_touch_store() {
        let repo = InMemoryRepository::<Movie>::new();
        let expired = RequestContext::with_timeout(Duration::ZERO);

        let result = repo.create(&expired, movie("Stalker")).await;
        assert!(matches!(result, Err(DomainError::Canceled { .. })));

        let result = repo.get_all(&expired).await;
        assert!(matches!(result, Err(DomainError::Canceled { .. })));

        assert_eq!(repo.count(&ctx()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = InMemoryRepository::<Movie>::new();
        repo.set_unavailable(true);

        let result = repo.count(&ctx()).await;
        assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));

        repo.set_unavailable(false);
        assert_eq!(repo.count(&ctx()).await.unwrap(), 0);
    }
}
