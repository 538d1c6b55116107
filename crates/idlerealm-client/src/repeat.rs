//! Hold-to-repeat actions
//!
//! A press starts a [`RepeatingTask`]; releasing stops it. The task is tied
//! to its handle, so a forgotten stop on some code path still ends it when
//! the handle is dropped.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs an action after `delay`, then every `interval`, until stopped
#[derive(Debug)]
pub struct RepeatingTask {
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Start repeating; the caller performs the initial press action itself
    pub fn start<F, Fut>(delay: Duration, interval: Duration, mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            loop {
                action().await;
                tokio::time::sleep(interval).await;
            }
        });
        Self { handle: Some(handle) }
    }

    /// Stop repeating; an action in progress is abandoned at its next await
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.stop();
    }
}
