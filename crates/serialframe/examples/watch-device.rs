//! Print frames recovered from a serial device for a few seconds.
//!
//! Usage:
//!   cargo run -p serialframe --example watch-device -- /dev/ttyUSB0 [seconds]

use std::time::Duration;

use serialframe::session::{DataEvent, ReadController};

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(device) = args.next() else {
        eprintln!("usage: watch-device <DEVICE> [seconds]");
        std::process::exit(64);
    };
    let seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);

    let controller = ReadController::new(|event: &str, payload: DataEvent| {
        println!("{event}: {}", payload.data);
    })
    .unwrap_or_else(|err| {
        eprintln!("reader setup failed: {err}");
        std::process::exit(1);
    });

    let session = match controller.start(&device) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("start failed: {err}");
            std::process::exit(3);
        }
    };

    if let Some(termination) = session.wait_timeout(Duration::from_secs(seconds)) {
        println!("session ended early: {termination}");
    }
    controller.shutdown();
}
