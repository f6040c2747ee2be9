use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serialframe_frame::Termination;

/// Handle to one reader session.
///
/// Cloning is cheap; all clones observe the same session. The run flag is the
/// only state shared with the reader loop: stores use `Release`, loads use
/// `Acquire`.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionState>,
}

struct SessionState {
    id: u64,
    device: String,
    running: AtomicBool,
    termination: Mutex<Option<Termination>>,
    finished: Condvar,
}

impl SessionHandle {
    pub(crate) fn new(id: u64, device: String) -> Self {
        Self {
            inner: Arc::new(SessionState {
                id,
                device,
                running: AtomicBool::new(true),
                termination: Mutex::new(None),
                finished: Condvar::new(),
            }),
        }
    }

    /// Controller-assigned session id, starting at 1.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Device path or stream name this session reads from.
    pub fn device(&self) -> &str {
        &self.inner.device
    }

    /// True while the run flag is set and the loop has not terminated.
    pub fn is_active(&self) -> bool {
        self.should_run() && !self.is_finished()
    }

    /// True once the loop has terminated and released the device.
    pub fn is_finished(&self) -> bool {
        self.lock_termination().is_some()
    }

    /// How the loop terminated, if it has.
    pub fn termination(&self) -> Option<Termination> {
        self.lock_termination().clone()
    }

    /// Block until the loop terminates or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Termination> {
        let guard = self.lock_termination();
        let (guard, _timed_out) = self
            .inner
            .finished
            .wait_timeout_while(guard, timeout, |termination| termination.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Read side of the run flag, polled by the reader loop.
    pub(crate) fn should_run(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Clear the run flag. Returns true if it was set.
    pub(crate) fn request_stop(&self) -> bool {
        self.inner.running.swap(false, Ordering::AcqRel)
    }

    /// Record the termination reason and wake waiters. Only the first call
    /// has an effect.
    pub(crate) fn finish(&self, termination: Termination) {
        self.inner.running.store(false, Ordering::Release);
        let mut guard = self.lock_termination();
        if guard.is_none() {
            *guard = Some(termination);
        }
        drop(guard);
        self.inner.finished.notify_all();
    }

    fn lock_termination(&self) -> MutexGuard<'_, Option<Termination>> {
        self.inner
            .termination
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("device", &self.inner.device)
            .field("running", &self.should_run())
            .field("termination", &self.termination())
            .finish()
    }
}
