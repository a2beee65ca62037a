use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::{Debug, Display};

use crate::domain::{DomainError, RequestContext};

/// Lazily read result set. Finite and not restartable.
pub type EntityStream<'a, E> = BoxStream<'a, Result<E, DomainError>>;

/// A record type owned by a [`Repository`]
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Primary key
    type Id: Clone + Debug + Display + PartialEq + Send + Sync + 'static;

    /// Caller-supplied fields before the store assigns identity
    type Draft: Debug + Send + Sync + 'static;

    /// Lowercase singular name used in messages and logs
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// Parse a path segment into a primary key
    fn parse_id(raw: &str) -> Result<Self::Id, DomainError>;
}

/// CRUD contract between services and the store.
///
/// Every call is bounded by the caller's [`RequestContext`]: an expired
/// context yields `Canceled` before any query is issued, and a deadline
/// passing mid-query abandons the query with `Canceled`. Implementations
/// never retry.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync + Debug {
    /// Insert a record; the store assigns any generated keys
    async fn create(&self, ctx: &RequestContext, draft: E::Draft) -> Result<E, DomainError>;

    async fn get_by_id(&self, ctx: &RequestContext, id: &E::Id) -> Result<E, DomainError>;

    /// Every record in storage order
    async fn get_all<'a>(&'a self, ctx: &'a RequestContext)
        -> Result<EntityStream<'a, E>, DomainError>;

    async fn delete_by_id(&self, ctx: &RequestContext, id: &E::Id) -> Result<(), DomainError>;

    async fn count(&self, ctx: &RequestContext) -> Result<u64, DomainError>;
}

/// Parse a positive integer key
pub fn parse_numeric_id(kind: &str, raw: &str) -> Result<i64, DomainError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| DomainError::invalid_id(format!("'{}' is not a valid {} id", raw, kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(parse_numeric_id("movie", "42").unwrap(), 42);
    }

    #[test]
    fn test_parse_numeric_id_rejects_garbage() {
        for raw in ["", "abc", "0", "-3", "1.5", "99999999999999999999"] {
            let result = parse_numeric_id("movie", raw);
            assert!(
                matches!(result, Err(DomainError::InvalidId { .. })),
                "accepted {:?}",
                raw
            );
        }
    }
}
