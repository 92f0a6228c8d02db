//! Per-request state: the caller's session and the deadline every store
//! call issued for the request runs under.

use std::future::Future;
use std::time::Duration;

use runm_store::{Deadline, StoreResult};
use runm_types::Session;

use crate::error::{MetadataError, MetadataResult};

/// Per-request state: who is calling and how long they are willing to wait.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session: Session,
    pub deadline: Deadline,
}

impl RequestContext {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            deadline: Deadline::none(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Deadline::after(timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Rejects sessions without a user or partition.
    pub fn check_session(&self) -> MetadataResult<()> {
        if self.session.user.is_empty() {
            return Err(MetadataError::PreconditionFailed(
                "user is required in session".into(),
            ));
        }
        if self.session.partition.is_empty() {
            return Err(MetadataError::PreconditionFailed(
                "partition is required in session".into(),
            ));
        }
        Ok(())
    }

    /// Runs a store call under this request's deadline.
    pub async fn store<F, T>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.deadline.run(fut).await
    }

    /// Runs a store call under this request's deadline and maps any error
    /// through [`MetadataError::from_store`].
    pub async fn call<F, T>(&self, context: &str, fut: F) -> MetadataResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.deadline
            .run(fut)
            .await
            .map_err(|e| MetadataError::from_store(context, e))
    }
}
