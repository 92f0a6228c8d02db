use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{StoreError, StoreResult};

/// An optional point in time after which store calls are abandoned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; calls run to completion.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Runs a store future, cancelling it with
    /// [`StoreError::DeadlineExceeded`] once the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match self.0 {
            None => fut.await,
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| StoreError::DeadlineExceeded)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_deadline_runs_to_completion() {
        let out = Deadline::none().run(async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(out, Ok(7));
        assert!(!Deadline::none().is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_are_cancelled() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let out = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert_eq!(out, Err(StoreError::DeadlineExceeded));
        assert!(deadline.is_expired());
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let out: StoreResult<()> = deadline
            .run(async { Err(StoreError::Backend("down".into())) })
            .await;
        assert_eq!(out, Err(StoreError::Backend("down".into())));
    }
}
