use std::fmt;
use std::io::{ErrorKind, Read};

use serialframe_transport::DeviceStream;
use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::scanner::Scanner;

/// Why a reader loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The device reported end-of-stream. Normal termination.
    EndOfStream,
    /// The run flag was cleared.
    Cancelled,
    /// A read failed. The session is over and is not retried.
    IoError { kind: ErrorKind, message: String },
}

impl Termination {
    fn from_io(err: &std::io::Error) -> Self {
        Termination::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// True only for [`Termination::IoError`].
    pub fn is_error(&self) -> bool {
        matches!(self, Termination::IoError { .. })
    }

    /// Short lowercase label for logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::EndOfStream => "end_of_stream",
            Termination::Cancelled => "cancelled",
            Termination::IoError { .. } => "io_error",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::IoError { message, .. } => write!(f, "io_error: {message}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Pulls fixed-size chunks from any `Read` device and scans each one for a
/// frame.
///
/// Owns the device for its whole lifetime; [`FrameReader::run`] consumes the
/// reader so the device is dropped exactly once however the loop ends.
pub struct FrameReader<T> {
    inner: T,
    buf: Vec<u8>,
    scanner: Scanner,
    config: ReaderConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        let config = ReaderConfig::default();
        Self {
            inner,
            buf: vec![0u8; config.chunk_size],
            scanner: Scanner::new(),
            config,
        }
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner,
            buf: vec![0u8; config.chunk_size],
            scanner: Scanner::new(),
            config,
        })
    }

    /// Read one chunk and scan it (blocking).
    ///
    /// Returns `Ok(None)` when the chunk held no frame or was shorter than the
    /// configured minimum, and `Err(FrameError::EndOfStream)` at EOF.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let read = loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if read == 0 {
            return Err(FrameError::EndOfStream);
        }

        if read <= self.config.min_chunk_len {
            debug!(len = read, "skipping short chunk");
            return Ok(None);
        }

        let frame = self.scanner.scan(&self.buf[..read]);
        debug!(
            len = read,
            frame_len = frame.as_ref().map(Frame::len),
            "scanned chunk"
        );
        Ok(frame)
    }

    /// Run the read loop until the device ends, a read fails, or `is_active`
    /// returns false.
    ///
    /// `is_active` is checked before every read and again before a frame is
    /// delivered, so nothing reaches `on_frame` once a stop is observed. A read
    /// already blocked in the device still has to return first.
    /// Reads that time out, would block or are interrupted count as idle
    /// cycles. Any other read error ends the loop.
    pub fn run<A, F>(mut self, is_active: A, mut on_frame: F) -> Termination
    where
        A: Fn() -> bool,
        F: FnMut(Frame),
    {
        let termination = loop {
            if !is_active() {
                break Termination::Cancelled;
            }

            match self.read_frame() {
                Ok(Some(frame)) => {
                    if !is_active() {
                        break Termination::Cancelled;
                    }
                    on_frame(frame);
                }
                Ok(None) => {}
                Err(FrameError::EndOfStream) => break Termination::EndOfStream,
                Err(FrameError::Io(err)) if is_idle(&err) => {}
                Err(FrameError::Io(err)) => break Termination::from_io(&err),
                Err(other) => {
                    break Termination::IoError {
                        kind: ErrorKind::Other,
                        message: other.to_string(),
                    }
                }
            }
        };

        // Release the device before reporting.
        drop(self.inner);

        if termination.is_error() {
            warn!(%termination, "reader loop terminated");
        } else {
            info!(%termination, "reader loop terminated");
        }
        termination
    }

    /// Borrow the underlying device.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl FrameReader<DeviceStream> {
    /// Create a frame reader for a device and apply the read timeout from
    /// config.
    pub fn with_config_device(mut inner: DeviceStream, config: ReaderConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Self::with_config(inner, config)
    }
}

fn is_idle(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

fn transport_to_frame_error(err: serialframe_transport::TransportError) -> FrameError {
    match err {
        serialframe_transport::TransportError::Io(io)
        | serialframe_transport::TransportError::Open { source: io, .. } => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::new(ErrorKind::NotFound, other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Replays scripted read results and counts how often it is dropped.
    struct ScriptedDevice {
        script: VecDeque<std::io::Result<Vec<u8>>>,
        drops: Arc<AtomicUsize>,
        requested: Vec<usize>,
    }

    impl ScriptedDevice {
        fn new(script: Vec<std::io::Result<Vec<u8>>>) -> (Self, Arc<AtomicUsize>) {
            let drops = Arc::new(AtomicUsize::new(0));
            let device = Self {
                script: script.into(),
                drops: Arc::clone(&drops),
                requested: Vec::new(),
            };
            (device, drops)
        }
    }

    impl Read for ScriptedDevice {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.requested.push(buf.len());
            match self.script.pop_front() {
                None => Ok(0),
                Some(Err(err)) => Err(err),
                Some(Ok(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
            }
        }
    }

    impl Drop for ScriptedDevice {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn chunk(s: &str) -> std::io::Result<Vec<u8>> {
        Ok(s.as_bytes().to_vec())
    }

    fn collect(reader: FrameReader<ScriptedDevice>) -> (Vec<String>, Termination) {
        let mut frames = Vec::new();
        let termination = reader.run(
            || true,
            |frame| frames.push(frame.to_text().into_owned()),
        );
        (frames, termination)
    }

    #[test]
    fn delivers_last_frame_of_each_chunk_until_eof() {
        let (device, drops) = ScriptedDevice::new(vec![
            chunk("noise{\"a\":1}more{\"b\":2}tail"),
            chunk("garbage only"),
            chunk("{}{\"x\":5}"),
        ]);

        let (frames, termination) = collect(FrameReader::new(device));

        assert_eq!(frames, vec!["{\"b\":2}", "{\"x\":5}"]);
        assert_eq!(termination, Termination::EndOfStream);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn message_split_across_chunks_is_not_recovered() {
        let (device, _drops) =
            ScriptedDevice::new(vec![chunk("{\"temp\":"), chunk("21}"), chunk("{\"temp\":22}")]);

        let (frames, _) = collect(FrameReader::new(device));
        assert_eq!(frames, vec!["{\"temp\":22}"]);
    }

    #[test]
    fn read_error_terminates_and_closes_once() {
        let (device, drops) = ScriptedDevice::new(vec![
            chunk("{\"a\":1}"),
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "unplugged")),
            chunk("{\"never\":1}"),
        ]);

        let (frames, termination) = collect(FrameReader::new(device));

        assert_eq!(frames, vec!["{\"a\":1}"]);
        assert!(termination.is_error());
        assert!(matches!(
            termination,
            Termination::IoError { kind: ErrorKind::BrokenPipe, ref message } if message.contains("unplugged")
        ));
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn idle_errors_keep_the_loop_alive() {
        let (device, _drops) = ScriptedDevice::new(vec![
            Err(std::io::Error::from(ErrorKind::TimedOut)),
            Err(std::io::Error::from(ErrorKind::WouldBlock)),
            Err(std::io::Error::from(ErrorKind::Interrupted)),
            chunk("{\"ok\":1}"),
        ]);

        let (frames, termination) = collect(FrameReader::new(device));
        assert_eq!(frames, vec!["{\"ok\":1}"]);
        assert_eq!(termination, Termination::EndOfStream);
    }

    #[test]
    fn inactive_before_first_read_cancels_without_reading() {
        let (device, drops) = ScriptedDevice::new(vec![chunk("{\"a\":1}")]);
        let mut delivered = 0;

        let termination = FrameReader::new(device).run(|| false, |_| delivered += 1);

        assert_eq!(termination, Termination::Cancelled);
        assert_eq!(delivered, 0);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_observed_after_in_flight_read_drops_its_frame() {
        let (device, drops) = ScriptedDevice::new(vec![
            chunk("{\"n\":1}"),
            chunk("{\"n\":2}"),
            chunk("{\"n\":3}"),
        ]);

        // Active for the first read + delivery, then flips during the second read.
        let checks = Cell::new(0);
        let is_active = || {
            checks.set(checks.get() + 1);
            checks.get() <= 3
        };

        let mut frames = Vec::new();
        let termination =
            FrameReader::new(device).run(is_active, |f| frames.push(f.to_text().into_owned()));

        assert_eq!(frames, vec!["{\"n\":1}"]);
        assert_eq!(termination, Termination::Cancelled);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn short_chunks_skipped_when_configured() {
        let (device, _drops) =
            ScriptedDevice::new(vec![chunk("{\"a\":1}"), chunk("{\"long\":12345}")]);
        let cfg = ReaderConfig {
            min_chunk_len: crate::config::NOISE_CHUNK_LEN,
            ..ReaderConfig::default()
        };

        let (frames, _) = collect(FrameReader::with_config(device, cfg).unwrap());
        assert_eq!(frames, vec!["{\"long\":12345}"]);
    }

    #[test]
    fn reads_are_bounded_by_chunk_size() {
        let (device, _drops) = ScriptedDevice::new(vec![chunk("{\"a\":1}{\"b\":2}")]);
        let cfg = ReaderConfig {
            chunk_size: 7,
            ..ReaderConfig::default()
        };
        let mut reader = FrameReader::with_config(device, cfg).unwrap();

        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.as_bytes(), b"{\"a\":1}");
        assert_eq!(reader.get_ref().requested, vec![7]);
        assert_eq!(reader.config().chunk_size, 7);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let cfg = ReaderConfig {
            chunk_size: 0,
            ..ReaderConfig::default()
        };
        let result = FrameReader::with_config(Cursor::new(Vec::<u8>::new()), cfg);
        assert!(matches!(result, Err(FrameError::InvalidChunkSize(0))));
    }

    #[test]
    fn read_frame_reports_end_of_stream() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(matches!(reader.read_frame(), Err(FrameError::EndOfStream)));
    }

    #[test]
    fn read_frame_without_frame_is_none() {
        let mut reader = FrameReader::new(Cursor::new(b"{}{{}}noise".to_vec()));
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn termination_labels() {
        assert_eq!(Termination::EndOfStream.to_string(), "end_of_stream");
        assert_eq!(Termination::Cancelled.to_string(), "cancelled");
        let err = Termination::IoError {
            kind: ErrorKind::Other,
            message: "boom".to_string(),
        };
        assert_eq!(err.as_str(), "io_error");
        assert_eq!(err.to_string(), "io_error: boom");
    }

    #[test]
    #[cfg(unix)]
    fn device_reader_applies_read_timeout() {
        let dir = std::env::temp_dir().join(format!(
            "serialframe-frame-device-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("capture.txt");
        std::fs::write(&path, b"xx{\"id\":7}yy").unwrap();

        let device = DeviceStream::open(&path).unwrap();
        let cfg = ReaderConfig {
            read_timeout: Some(std::time::Duration::from_millis(50)),
            ..ReaderConfig::default()
        };
        let reader = FrameReader::with_config_device(device, cfg).unwrap();
        assert_eq!(
            reader.get_ref().read_timeout(),
            Some(std::time::Duration::from_millis(50))
        );

        let mut frames = Vec::new();
        let termination = reader.run(|| true, |f| frames.push(f));
        assert_eq!(termination, Termination::EndOfStream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), b"{\"id\":7}");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
