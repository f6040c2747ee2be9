use std::io::{ErrorKind, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use serialframe_frame::{FrameReader, ReaderConfig, Termination};
use serialframe_transport::{device_exists, DeviceStream};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SessionError};
use crate::session::SessionHandle;
use crate::sink::{DataEvent, EventSink, DATA_RECEIVED_EVENT};

/// Name of the dedicated reader thread.
pub const WORKER_THREAD_NAME: &str = "serialframe-reader";

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Starts and stops reader sessions on one dedicated background thread.
///
/// At most one session is active at a time. Starting while a session is
/// still reading fails with [`SessionError::AlreadyActive`]. Once a session
/// has been stopped a new one may be started right away; it queues behind the
/// old loop on the worker thread, so two loops never read concurrently.
///
/// `start` and `stop` take `&self` and may be called from any thread.
pub struct ReadController {
    sink: Arc<dyn EventSink>,
    config: ReaderConfig,
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
    session: Mutex<Option<SessionHandle>>,
    next_session_id: AtomicU64,
}

impl ReadController {
    /// Create a controller with default reader configuration.
    pub fn new(sink: impl EventSink + 'static) -> Result<Self> {
        Self::with_config(sink, ReaderConfig::default())
    }

    /// Create a controller with explicit reader configuration.
    pub fn with_config(sink: impl EventSink + 'static, config: ReaderConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = mpsc::channel::<Job>();
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                for job in rx {
                    job();
                }
                debug!("reader worker exiting");
            })
            .map_err(SessionError::WorkerSpawn)?;

        Ok(Self {
            sink: Arc::new(sink),
            config,
            jobs: Some(tx),
            worker: Some(worker),
            session: Mutex::new(None),
            next_session_id: AtomicU64::new(1),
        })
    }

    /// Start reading frames from a device path.
    ///
    /// Fails fast with [`SessionError::DeviceNotFound`] when the path does
    /// not exist. The device itself is opened on the worker thread; an open
    /// failure ends that session with [`Termination::IoError`].
    pub fn start(&self, path: impl AsRef<Path>) -> Result<SessionHandle> {
        let path = path.as_ref().to_path_buf();
        if !device_exists(&path) {
            warn!(?path, "device not found");
            return Err(SessionError::DeviceNotFound { path });
        }

        let config = self.config.clone();
        let device = path.display().to_string();
        self.dispatch(device, move || {
            let stream = DeviceStream::open(&path)?;
            Ok(FrameReader::with_config_device(stream, config)?)
        })
    }

    /// Start reading frames from an already-open stream.
    pub fn start_stream<R>(&self, name: impl Into<String>, stream: R) -> Result<SessionHandle>
    where
        R: Read + Send + 'static,
    {
        let config = self.config.clone();
        self.dispatch(name.into(), move || {
            Ok(FrameReader::with_config(stream, config)?)
        })
    }

    /// Ask the active session to stop and return immediately.
    ///
    /// The loop observes the request before its next read, or after the read
    /// in flight returns (bounded by the configured read timeout). Returns
    /// true if a running session was signalled; without one this is a no-op.
    pub fn stop(&self) -> bool {
        let slot = self.lock_session();
        match slot.as_ref() {
            Some(session) if session.request_stop() => {
                info!(session = session.id(), device = session.device(), "stop requested");
                true
            }
            _ => {
                debug!("stop requested with no running session");
                false
            }
        }
    }

    /// True while the current session is reading.
    pub fn is_active(&self) -> bool {
        self.lock_session()
            .as_ref()
            .is_some_and(SessionHandle::is_active)
    }

    /// The most recently started session, if any.
    pub fn session(&self) -> Option<SessionHandle> {
        self.lock_session().clone()
    }

    /// Reader configuration applied to new sessions.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Stop the active session and wait for the worker thread to exit.
    ///
    /// Blocks for as long as the read in flight takes to return.
    pub fn shutdown(mut self) {
        self.stop();
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("reader worker panicked");
            }
        }
    }

    fn dispatch<R, O>(&self, device: String, open: O) -> Result<SessionHandle>
    where
        R: Read + Send + 'static,
        O: FnOnce() -> Result<FrameReader<R>> + Send + 'static,
    {
        let mut slot = self.lock_session();
        if let Some(active) = slot.as_ref().filter(|session| session.is_active()) {
            warn!(
                session = active.id(),
                device = active.device(),
                "start rejected; session already active"
            );
            return Err(SessionError::AlreadyActive {
                device: active.device().to_string(),
            });
        }

        let jobs = self.jobs.as_ref().ok_or(SessionError::WorkerUnavailable)?;
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let handle = SessionHandle::new(id, device);
        let session = handle.clone();
        let sink = Arc::clone(&self.sink);

        let job: Job = Box::new(move || {
            let reader = match open() {
                Ok(reader) => reader,
                Err(err) => {
                    warn!(session = id, device = session.device(), error = %err, "device open failed");
                    session.finish(Termination::IoError {
                        kind: err.io_kind().unwrap_or(ErrorKind::Other),
                        message: err.to_string(),
                    });
                    return;
                }
            };

            info!(session = id, device = session.device(), "reader session started");

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                reader.run(
                    || session.should_run(),
                    |frame| sink.emit(DATA_RECEIVED_EVENT, DataEvent::from(&frame)),
                )
            }));

            let termination = result.unwrap_or_else(|_| {
                error!(session = id, "reader loop panicked");
                Termination::IoError {
                    kind: ErrorKind::Other,
                    message: "reader loop panicked".to_string(),
                }
            });
            session.finish(termination);
        });

        jobs.send(job).map_err(|_| SessionError::WorkerUnavailable)?;
        *slot = Some(handle.clone());
        Ok(handle)
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<SessionHandle>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReadController {
    fn drop(&mut self) {
        // The worker finishes the loop in flight on its own; do not join here.
        self.stop();
    }
}

impl std::fmt::Debug for ReadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadController")
            .field("config", &self.config)
            .field("session", &self.session())
            .finish()
    }
}
