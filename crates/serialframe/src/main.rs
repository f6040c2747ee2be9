mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "serialframe", version, about = "Serial frame extractor CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "SERIALFRAME_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "SERIALFRAME_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listen_subcommand() {
        let cli = Cli::try_parse_from([
            "serialframe",
            "listen",
            "/dev/ttyS1",
            "--count",
            "3",
            "--read-timeout",
            "100ms",
        ])
        .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.device.to_str(), Some("/dev/ttyS1"));
                assert_eq!(args.count, Some(3));
                assert_eq!(args.chunk_size, 1024);
                assert_eq!(args.read_timeout, "100ms");
            }
            other => panic!("expected listen, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blocking_with_read_timeout() {
        let err = Cli::try_parse_from([
            "serialframe",
            "listen",
            "/dev/ttyS1",
            "--blocking",
            "--read-timeout",
            "1s",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_scan_subcommand_without_file() {
        let cli = Cli::try_parse_from(["serialframe", "scan", "--sentinel"])
            .expect("scan args should parse");
        assert!(matches!(cli.command, Command::Scan(ref args) if args.file.is_none() && args.sentinel));
    }
}
