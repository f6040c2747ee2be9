use std::io::Read;
use std::path::Path;

use serialframe_frame::{scan, scan_or_sentinel};
use tracing::debug;

use crate::cmd::ScanArgs;
use crate::exit::{io_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_frame, FrameOutput, OutputFormat};

pub fn run(args: ScanArgs, format: OutputFormat) -> CliResult<i32> {
    let (source, buf) = match args.file.as_deref() {
        Some(path) if path != Path::new("-") => {
            let buf = std::fs::read(path).map_err(|err| {
                io_error(&format!("failed to read {}", path.display()), err)
            })?;
            (path.display().to_string(), buf)
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed to read stdin", err))?;
            ("-".to_string(), buf)
        }
    };
    debug!(source = %source, len = buf.len(), "scanning input");

    let payload = if args.sentinel {
        scan_or_sentinel(&buf)
    } else {
        match scan(&buf) {
            Some(frame) => frame.payload,
            None => return Err(CliError::new(FAILURE, format!("no frame found in {source}"))),
        }
    };

    let data = String::from_utf8_lossy(&payload);
    print_frame(&FrameOutput::new("scan", &source, &data), format);
    Ok(SUCCESS)
}
