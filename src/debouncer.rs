use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Single-timer debounce: at most one pending fire at a time.
pub struct Debouncer {
    handle: Handle,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(handle: Handle) -> Debouncer {
        Debouncer {
            handle,
            pending: None,
        }
    }

    /// Run `on_fire(query)` once `delay` passes without another `schedule`.
    /// Replaces any timer that is still pending.
    pub fn schedule<F>(&mut self, query: String, delay: Duration, on_fire: F)
    where
        F: FnOnce(String) + Send + 'static,
    {
        self.cancel();
        self.pending = Some(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(query);
        }));
    }

    /// Drop the pending timer without firing it. No-op when nothing is pending.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
