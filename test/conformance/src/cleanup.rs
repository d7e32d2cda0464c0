//! Compensating actions registered by a case.

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::case::CaseError;

type Cleanup = BoxFuture<'static, Result<(), CaseError>>;

/// Cleanups run last-registered first, whatever the case outcome. A failing
/// cleanup does not stop the ones registered before it.
#[derive(Default)]
pub struct CleanupStack {
    actions: Vec<(String, Cleanup)>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, description: impl Into<String>, action: F)
    where
        F: std::future::Future<Output = Result<(), CaseError>> + Send + 'static,
    {
        self.actions.push((description.into(), Box::pin(action)));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every action and returns the failures, described.
    pub async fn run(&mut self) -> Vec<String> {
        let mut errors = Vec::new();
        while let Some((description, action)) = self.actions.pop() {
            debug!(cleanup = %description, "running cleanup");
            if let Err(e) = action.await {
                warn!(cleanup = %description, error = %e, "cleanup failed");
                errors.push(format!("cleanup '{description}' failed: {e}"));
            }
        }
        errors
    }
}

impl std::fmt::Debug for CleanupStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|(d, _)| d))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_runs_lifo_and_continues_after_failure() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut stack = CleanupStack::new();

        for step in ["first", "second", "third"] {
            let order = order.clone();
            stack.push(step, async move {
                order.lock().unwrap().push(step);
                if step == "second" {
                    Err(CaseError::Assertion("boom".to_string()))
                } else {
                    Ok(())
                }
            });
        }
        assert_eq!(stack.len(), 3);

        let errors = stack.run().await;
        assert_eq!(*order.lock().unwrap(), vec!["third", "second", "first"]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'second'"));
        assert!(stack.is_empty());
    }
}
