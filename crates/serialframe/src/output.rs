use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One recovered frame as printed by `listen` and `scan`.
#[derive(Debug, Serialize)]
pub struct FrameOutput<'a> {
    pub event: &'a str,
    pub source: &'a str,
    pub size: usize,
    pub data: &'a str,
    pub timestamp: String,
}

impl<'a> FrameOutput<'a> {
    pub fn new(event: &'a str, source: &'a str, data: &'a str) -> Self {
        Self {
            event,
            source,
            size: data.len(),
            data,
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_frame(frame: &FrameOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SOURCE", "SIZE", "DATA"])
                .add_row(vec![
                    frame.source.to_string(),
                    frame.size.to_string(),
                    frame.data.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "event={} source={} size={} data={}",
                frame.event, frame.source, frame.size, frame.data
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.data.as_bytes());
        }
    }
}

/// Raw frames are newline-delimited so consecutive frames stay separable.
pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(data);
    let _ = out.write_all(b"\n");
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_output_serializes_fields() {
        let out = FrameOutput {
            event: "onDataReceived",
            source: "/dev/ttyS1",
            size: 7,
            data: "{\"a\":1}",
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_string(&out).expect("frame output should serialize");
        assert_eq!(
            json,
            r#"{"event":"onDataReceived","source":"/dev/ttyS1","size":7,"data":"{\"a\":1}","timestamp":"0"}"#
        );
    }

    #[test]
    fn size_counts_bytes() {
        let out = FrameOutput::new("scan", "-", "{\"é\":1}");
        assert_eq!(out.size, 8);
    }
}
