//! Catalog service - CRUD operations for movies and directors

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::info;
use validator::Validate;

use crate::domain::{DomainError, Entity, Repository, RequestContext};

/// CRUD service over a single catalog collection
#[derive(Debug)]
pub struct CatalogService<E: Entity> {
    repository: Arc<dyn Repository<E>>,
}

impl<E> CatalogService<E>
where
    E: Entity,
    E::Draft: Validate,
{
    pub fn new(repository: Arc<dyn Repository<E>>) -> Self {
        Self { repository }
    }

    /// Validate and store a new record
    pub async fn create(&self, ctx: &RequestContext, draft: E::Draft) -> Result<E, DomainError> {
        draft.validate()?;

        let created = self.repository.create(ctx, draft).await?;
        info!(kind = E::KIND, id = %created.id(), "Created record");

        Ok(created)
    }

    /// Drain the repository stream. Fails on the first bad row.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<E>, DomainError> {
        self.repository.get_all(ctx).await?.try_collect().await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &E::Id) -> Result<(), DomainError> {
        self.repository.delete_by_id(ctx, id).await?;
        info!(kind = E::KIND, id = %id, "Deleted record");

        Ok(())
    }
}
