//! JSONL front-end over the controller.
//!
//! [`serve`] reads one request per line, dispatches it and streams each
//! completion back as one response line. Completions arrive from the queue
//! worker in any order relative to later requests, so responses are handed
//! to a dedicated writer thread over a channel; every in-flight command holds
//! a sender, and the writer exits once input has ended and the last command
//! has completed.

mod errors;
mod request;
mod response;

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, warn};

use cec_core::{CecController, Command};

pub use self::errors::FrontendError;
pub use self::request::{FrontendRequest, MAX_REQUEST_BYTES};
pub use self::response::{FrontendResponse, ResponseBody, ResponseWriter};

const FRONTEND_TARGET: &str = "cecd::frontend";

/// Counters for one input session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Request lines read, excluding blank lines.
    pub requests: u64,
    /// Requests answered with `BadInput` without reaching the controller.
    pub rejected: u64,
}

/// Serves requests from `input` until end of input, writing responses to
/// `output`.
///
/// Returns once every dispatched command has completed and its response has
/// been written.
///
/// # Errors
///
/// Returns [`FrontendError`] when reading a request line fails or the writer
/// cannot serialise or write a response.
pub fn serve<R, W>(
    controller: &CecController,
    mut input: R,
    output: W,
) -> Result<SessionSummary, FrontendError>
where
    R: BufRead,
    W: Write + Send + 'static,
{
    let (sender, receiver) = mpsc::channel::<FrontendResponse>();
    let writer = thread::Builder::new()
        .name(String::from("cecd-writer"))
        .spawn(move || {
            let mut response_writer = ResponseWriter::new(output);
            for response in receiver {
                response_writer.write_response(&response)?;
            }
            Ok::<(), FrontendError>(())
        })?;

    let mut summary = SessionSummary::default();
    let mut line = Vec::new();
    let read_result = loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => break Ok(()),
            Ok(_) if line.iter().all(u8::is_ascii_whitespace) => {}
            Ok(_) => {
                summary.requests += 1;
                if !handle_line(controller, &line, &sender) {
                    summary.rejected += 1;
                }
            }
            Err(error) => break Err(FrontendError::from(error)),
        }
    };

    drop(sender);
    let write_result = writer.join().map_err(|_| FrontendError::WriterPanicked)?;
    debug!(
        target: FRONTEND_TARGET,
        requests = summary.requests,
        rejected = summary.rejected,
        "session finished"
    );
    read_result?;
    write_result?;
    Ok(summary)
}

/// Dispatches one request line. Returns `false` when the line was rejected
/// before reaching the controller.
fn handle_line(
    controller: &CecController,
    line: &[u8],
    sender: &Sender<FrontendResponse>,
) -> bool {
    let request = match FrontendRequest::parse(line) {
        Ok(request) => request,
        Err(error) => {
            warn!(target: FRONTEND_TARGET, %error, "rejecting request line");
            drop(sender.send(FrontendResponse::bad_input(None)));
            return false;
        }
    };
    let id = request.id.clone();
    let payload = match request.into_payload() {
        Ok(payload) => payload,
        Err(error) => {
            warn!(target: FRONTEND_TARGET, %error, "rejecting request");
            drop(sender.send(FrontendResponse::bad_input(id)));
            return false;
        }
    };

    let completion_sender = sender.clone();
    let command = Command::new(payload, move |result| {
        drop(completion_sender.send(FrontendResponse::from_result(id, result)));
    });
    if !controller.dispatch(command) {
        debug!(target: FRONTEND_TARGET, "no handler claimed request");
    }
    true
}
