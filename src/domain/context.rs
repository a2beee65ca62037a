//! Request-scoped deadline shared by every repository call

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::time::{Instant, Sleep};

use super::DomainError;

/// Deadline carried through a single request's pipeline.
///
/// Repositories consult it before issuing work and race in-flight work
/// against it. Dropping the raced future abandons the underlying query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Instant,
}

impl RequestContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Fail fast when the deadline has already passed
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_expired() {
            return Err(DomainError::canceled("Request deadline exceeded"));
        }
        Ok(())
    }

    /// Run `operation` under this deadline.
    ///
    /// An expired context returns `Canceled` without polling the future.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        self.ensure_active()?;

        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(operation, "Deadline elapsed during operation");
                Err(DomainError::canceled(format!(
                    "Deadline exceeded during {}",
                    operation
                )))
            }
        }
    }

    /// Bound a result stream by this deadline.
    ///
    /// Once the deadline passes the stream yields a single `Canceled` item and ends.
    pub fn guard_stream<'a, T>(
        &self,
        inner: BoxStream<'a, Result<T, DomainError>>,
    ) -> BoxStream<'a, Result<T, DomainError>>
    where
        T: Send + 'a,
    {
        let timer: Pin<Box<Sleep>> = Box::pin(tokio::time::sleep_until(self.deadline));

        stream::unfold(Some((inner, timer)), |state| async move {
            let (mut inner, mut timer) = state?;

            let polled = tokio::select! {
                biased;
                _ = timer.as_mut() => None,
                item = inner.next() => Some(item),
            };

            match polled {
                None => Some((
                    Err(DomainError::canceled("Deadline exceeded while reading rows")),
                    None,
                )),
                Some(item) => item.map(|item| (item, Some((inner, timer)))),
            }
        })
        .boxed()
    }
}
