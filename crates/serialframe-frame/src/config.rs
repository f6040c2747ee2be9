use std::time::Duration;

use crate::error::{FrameError, Result};

/// Default read size per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default device read timeout. Bounds how long a stop request waits for an
/// idle device.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Reads of this many bytes or fewer carry no useful status message on the
/// boards this bridge targets. Pass as `min_chunk_len` to drop them unscanned.
pub const NOISE_CHUNK_LEN: usize = 10;

/// Configuration for the stream reader loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum bytes pulled from the device per read. Default: 1024.
    pub chunk_size: usize,
    /// Device read timeout; `None` blocks until data or EOF. Default: 250 ms.
    pub read_timeout: Option<Duration>,
    /// Chunks of `min_chunk_len` bytes or fewer are skipped. Default: 0.
    pub min_chunk_len: usize,
}

impl ReaderConfig {
    /// Check the configuration before a reader is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FrameError::InvalidChunkSize(self.chunk_size));
        }
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            min_chunk_len: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.chunk_size, 1024);
        assert_eq!(cfg.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(cfg.min_chunk_len, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let cfg = ReaderConfig {
            chunk_size: 0,
            ..ReaderConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(FrameError::InvalidChunkSize(0))
        ));
    }
}
