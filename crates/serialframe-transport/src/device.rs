use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// An open character device. Implements `Read`.
///
/// The stream is sequential and not seekable. It is owned by exactly one
/// reader at a time and the underlying descriptor is closed when the stream
/// is dropped.
pub struct DeviceStream {
    file: File,
    path: PathBuf,
    read_timeout: Option<Duration>,
}

/// Returns true if something exists at `path`.
///
/// This is the fail-fast check performed before a device is opened.
pub fn device_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

impl DeviceStream {
    /// Open a device path for reading (blocking reads, no timeout).
    ///
    /// Returns [`TransportError::DeviceNotFound`] without touching the
    /// filesystem further when the path does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !device_exists(&path) {
            return Err(TransportError::DeviceNotFound { path });
        }

        let mut options = OpenOptions::new();
        options.read(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            // A tty must never become the controlling terminal: a hangup on
            // the port would then SIGHUP the whole process.
            options.custom_flags(libc::O_NOCTTY);
        }

        let file = options
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        debug!(?path, "opened device");

        Ok(Self {
            file,
            path,
            read_timeout: None,
        })
    }

    /// Set the read timeout applied before every read.
    ///
    /// When set, a read that sees no data within the timeout fails with
    /// `ErrorKind::TimedOut` instead of blocking. `None` blocks indefinitely.
    /// A zero duration is rejected, matching the standard socket APIs.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        if timeout == Some(Duration::ZERO) {
            return Err(TransportError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                "read timeout must be non-zero",
            )));
        }
        self.read_timeout = timeout;
        Ok(())
    }

    /// Current read timeout.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// The path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the device is a terminal (tty).
    pub fn is_tty(&self) -> bool {
        self.file.is_terminal()
    }

    #[cfg(unix)]
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        use std::os::fd::AsRawFd;

        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: `pfd` is a valid, writable pollfd for the duration of the call,
        // the count matches the single entry, and the descriptor is owned by `self.file`.
        let rc = unsafe { libc::poll(&mut pfd, 1, poll_timeout_millis(timeout)) };

        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(rc > 0)
    }

    #[cfg(not(unix))]
    fn wait_readable(&self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

/// Whole milliseconds for `poll(2)`, rounded up so a sub-millisecond timeout
/// still waits instead of returning immediately.
#[cfg(unix)]
fn poll_timeout_millis(timeout: Duration) -> libc::c_int {
    libc::c_int::try_from(timeout.as_micros().div_ceil(1000)).unwrap_or(libc::c_int::MAX)
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(timeout) = self.read_timeout {
            if !self.wait_readable(timeout)? {
                return Err(io::Error::new(
                    ErrorKind::TimedOut,
                    "no data before device read timeout",
                ));
            }
        }
        self.file.read(buf)
    }
}

impl Drop for DeviceStream {
    fn drop(&mut self) {
        debug!(path = ?self.path, "closing device");
    }
}

impl std::fmt::Debug for DeviceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceStream")
            .field("path", &self.path)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
