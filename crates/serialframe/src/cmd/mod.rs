use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod listen;
pub mod scan;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a device and print recovered frames until end-of-stream or Ctrl-C.
    Listen(ListenArgs),
    /// Recover the last frame from a file or stdin.
    Scan(ScanArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Scan(args) => scan::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Character device to read (e.g. /dev/ttyS1).
    #[arg(env = "SERIALFRAME_DEVICE")]
    pub device: PathBuf,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Bytes requested per read.
    #[arg(long, default_value_t = serialframe_frame::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// How long one read waits for data before re-checking for stop (e.g. 250ms, 1s).
    #[arg(long, default_value = "250ms", conflicts_with = "blocking")]
    pub read_timeout: String,
    /// Block in read until data arrives; stop takes effect after the next chunk.
    #[arg(long)]
    pub blocking: bool,
    /// Ignore chunks of at most this many bytes.
    #[arg(long, default_value_t = 0, conflicts_with = "skip_noise")]
    pub min_chunk_len: usize,
    /// Ignore short noise chunks (at most 10 bytes).
    #[arg(long)]
    pub skip_noise: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// File to scan. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,
    /// Print `{}` instead of failing when no frame is found.
    #[arg(long)]
    pub sentinel: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    /// Device to probe for existence and readability.
    #[arg(long, env = "SERIALFRAME_DEVICE")]
    pub device: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration(" 3 ").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0ms").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert_eq!(parse_duration("-1s").unwrap_err().code, USAGE);
    }
}
