use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use serialframe_frame::{ReaderConfig, NOISE_CHUNK_LEN};
use serialframe_session::{ChannelSink, ReadController, SessionHandle, SinkEvent};
use tracing::{debug, info};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{session_error, termination_result, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, FrameOutput, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STOP_GRACE: Duration = Duration::from_secs(5);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let config = reader_config(&args)?;
    let (sink, events) = ChannelSink::new();
    let controller = ReadController::with_config(sink, config)
        .map_err(|err| session_error("reader setup failed", err))?;
    let controller = Arc::new(controller);
    install_ctrlc_handler(Arc::clone(&controller))?;

    let session = controller
        .start(&args.device)
        .map_err(|err| session_error("start failed", err))?;
    info!(device = session.device(), "listening");

    let printed = pump_events(&events, &session, args.count, format);
    if args.count.is_some_and(|count| printed >= count) {
        controller.stop();
    }

    match session.wait_timeout(STOP_GRACE) {
        Some(termination) => {
            debug!(%termination, printed, "listen finished");
            termination_result(&termination)
        }
        None => Ok(SUCCESS),
    }
}

fn reader_config(args: &ListenArgs) -> CliResult<ReaderConfig> {
    let read_timeout = if args.blocking {
        None
    } else {
        Some(parse_duration(&args.read_timeout)?)
    };
    let min_chunk_len = if args.skip_noise {
        NOISE_CHUNK_LEN
    } else {
        args.min_chunk_len
    };

    Ok(ReaderConfig {
        chunk_size: args.chunk_size,
        read_timeout,
        min_chunk_len,
    })
}

/// Print events until the session finishes or `count` frames were printed.
fn pump_events(
    events: &Receiver<SinkEvent>,
    session: &SessionHandle,
    count: Option<usize>,
    format: OutputFormat,
) -> usize {
    let mut printed = 0usize;
    let limit_reached = |printed: usize| count.is_some_and(|count| printed >= count);

    loop {
        if limit_reached(printed) {
            return printed;
        }
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                print_event(&event, session, format);
                printed = printed.saturating_add(1);
            }
            Err(RecvTimeoutError::Timeout) if session.is_finished() => {
                // Frames are emitted before the session finishes, so whatever
                // is queued now is the complete remainder.
                while let Ok(event) = events.try_recv() {
                    if limit_reached(printed) {
                        break;
                    }
                    print_event(&event, session, format);
                    printed = printed.saturating_add(1);
                }
                return printed;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return printed,
        }
    }
}

fn print_event(event: &SinkEvent, session: &SessionHandle, format: OutputFormat) {
    let out = FrameOutput::new(&event.name, session.device(), &event.payload.data);
    print_frame(&out, format);
}

fn install_ctrlc_handler(controller: Arc<ReadController>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        controller.stop();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
