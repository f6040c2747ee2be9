use std::path::Path;

use serde::Serialize;
use serialframe_frame::ReaderConfig;
use serialframe_transport::{device_exists, DeviceStream};

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        read_timeout_check(),
        reader_defaults_check(),
        compiled_features_check(),
        device_check(args.device.as_deref()),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("serialframe doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn read_timeout_check() -> CheckResult {
    #[cfg(unix)]
    {
        CheckResult {
            name: "read_timeout".to_string(),
            status: CheckStatus::Pass,
            detail: "poll(2) available; stop is observed within one read timeout".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "read_timeout".to_string(),
            status: CheckStatus::Warn,
            detail: "no read timeout on this platform; stop waits for the next chunk"
                .to_string(),
        }
    }
}

fn reader_defaults_check() -> CheckResult {
    let config = ReaderConfig::default();
    match config.validate() {
        Ok(()) => CheckResult {
            name: "reader_defaults".to_string(),
            status: CheckStatus::Info,
            detail: format!(
                "chunk_size={} read_timeout={:?} min_chunk_len={}",
                config.chunk_size, config.read_timeout, config.min_chunk_len
            ),
        },
        Err(err) => CheckResult {
            name: "reader_defaults".to_string(),
            status: CheckStatus::Fail,
            detail: err.to_string(),
        },
    }
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "session") {
        features.push("session");
    }
    if cfg!(feature = "cli") {
        features.push("cli");
    }

    CheckResult {
        name: "compiled_features".to_string(),
        status: CheckStatus::Info,
        detail: features.join(", "),
    }
}

fn device_check(device: Option<&Path>) -> CheckResult {
    let Some(path) = device else {
        return CheckResult {
            name: "device".to_string(),
            status: CheckStatus::Skip,
            detail: "no --device given and SERIALFRAME_DEVICE not set".to_string(),
        };
    };

    if !device_exists(path) {
        return CheckResult {
            name: "device".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{} does not exist", path.display()),
        };
    }

    match DeviceStream::open(path) {
        Ok(stream) if stream.is_tty() => CheckResult {
            name: "device".to_string(),
            status: CheckStatus::Pass,
            detail: format!("{} opened (terminal device)", path.display()),
        },
        Ok(_) => CheckResult {
            name: "device".to_string(),
            status: CheckStatus::Warn,
            detail: format!("{} opened but is not a terminal device", path.display()),
        },
        Err(err) => CheckResult {
            name: "device".to_string(),
            status: CheckStatus::Fail,
            detail: err.to_string(),
        },
    }
}
