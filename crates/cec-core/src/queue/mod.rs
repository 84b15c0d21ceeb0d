//! Single-worker command queue in front of the hardware boundary.
//!
//! Producers [`submit`](CommandQueue::submit) [`MessageData`] from any thread.
//! One worker thread pops messages in FIFO order, translates each into a
//! [`NativeCommand`], blocks on the hardware call and hands the outcome to the
//! reply callback. At most one hardware call is outstanding at any time.
//!
//! The worker owns the [`HardwareBoundary`]: it opens the adapter when it
//! starts and closes it when it exits. Dropping the queue stops the worker
//! after the message in flight, if any, and joins it; messages still queued
//! at that point are discarded.

mod native;

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

pub use self::native::{
    MAX_NAME_LEN, MAX_PARAM_NAME_LEN, MAX_PARAM_VALUE_LEN, MAX_PARAMS, NativeCommand, NativeParam,
};
use crate::command::CommandKind;
use crate::error::CecError;
use crate::hardware::{HardwareBoundary, HardwareResponse};

/// Tracing target for queue operations.
const QUEUE_TARGET: &str = "cec_core::queue";

/// A queued request: sequence id, kind and ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageData {
    /// Correlation id assigned by the submitting handler.
    pub seq: u64,
    /// Kind of the originating command.
    pub kind: CommandKind,
    /// Ordered `(name, value)` parameters; values may be empty.
    pub params: Vec<(String, String)>,
}

impl MessageData {
    /// Creates a message with no parameters.
    #[must_use]
    pub const fn new(seq: u64, kind: CommandKind) -> Self {
        Self {
            seq,
            kind,
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Value of the first parameter called `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.as_str())
    }
}

/// What the hardware produced for one message.
#[derive(Debug, Clone)]
pub enum ReplyOutcome {
    /// Reply lines in order.
    Lines(Vec<String>),
    /// The adapter does not implement the command.
    NotImplemented,
    /// The command could not be carried out.
    Failed(CecError),
}

/// Reply handed to the queue's callback.
#[derive(Debug, Clone)]
pub struct QueueReply {
    /// Sequence id of the message this answers.
    pub seq: u64,
    /// Kind of the message this answers.
    pub kind: CommandKind,
    /// Hardware outcome.
    pub outcome: ReplyOutcome,
}

/// Callback invoked on the worker thread for every processed message.
pub type ReplyCallback = Box<dyn Fn(QueueReply) + Send + 'static>;

#[derive(Default)]
struct QueueState {
    messages: VecDeque<MessageData>,
    shutdown: bool,
}

#[derive(Default)]
struct QueueShared {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl QueueShared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

/// FIFO queue served by a dedicated worker thread.
pub struct CommandQueue {
    shared: Arc<QueueShared>,
    worker: Option<JoinHandle<()>>,
}

impl CommandQueue {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`CecError::SpawnFailed`] when the worker thread cannot be
    /// created.
    pub fn start<F>(hardware: Box<dyn HardwareBoundary>, on_reply: F) -> Result<Self, CecError>
    where
        F: Fn(QueueReply) + Send + 'static,
    {
        let shared = Arc::new(QueueShared::default());
        let worker_shared = Arc::clone(&shared);
        let callback: ReplyCallback = Box::new(on_reply);
        let worker = thread::Builder::new()
            .name(String::from("cec-queue"))
            .spawn(move || run_worker(&worker_shared, hardware, &callback))
            .map_err(|err| CecError::SpawnFailed {
                command: String::from("cec-queue"),
                message: String::from("failed to spawn queue worker"),
                source: Some(Arc::new(err)),
            })?;
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Enqueues a message and wakes the worker.
    ///
    /// # Errors
    ///
    /// Returns [`CecError::QueueClosed`] once the queue has shut down.
    pub fn submit(&self, message: MessageData) -> Result<(), CecError> {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(CecError::QueueClosed);
        }
        debug!(
            target: QUEUE_TARGET,
            seq = message.seq,
            kind = %message.kind,
            depth = state.messages.len(),
            "message queued"
        );
        state.messages.push_back(message);
        drop(state);
        self.shared.ready.notify_one();
        Ok(())
    }

    /// Stops the worker and waits for it to exit. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.ready.notify_all();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!(target: QUEUE_TARGET, "queue worker panicked");
        }
    }
}

impl Drop for CommandQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    shared: &QueueShared,
    mut hardware: Box<dyn HardwareBoundary>,
    on_reply: &ReplyCallback,
) {
    let open_error = hardware.open().err();
    if let Some(error) = &open_error {
        warn!(target: QUEUE_TARGET, %error, "failed to open CEC adapter");
    }

    while let Some(message) = next_message(shared) {
        let outcome = match &open_error {
            Some(error) => ReplyOutcome::Failed(error.clone()),
            None => execute(hardware.as_mut(), &message),
        };
        on_reply(QueueReply {
            seq: message.seq,
            kind: message.kind,
            outcome,
        });
    }

    if open_error.is_none() {
        hardware.close();
    }
    debug!(target: QUEUE_TARGET, "queue worker stopped");
}

/// Blocks until a message is available or shutdown is requested.
fn next_message(shared: &QueueShared) -> Option<MessageData> {
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            return None;
        }
        if let Some(message) = state.messages.pop_front() {
            return Some(message);
        }
        state = shared
            .ready
            .wait(state)
            .unwrap_or_else(|poison| poison.into_inner());
    }
}

fn execute(hardware: &mut dyn HardwareBoundary, message: &MessageData) -> ReplyOutcome {
    let native = match NativeCommand::from_message(message) {
        Ok(native) => native,
        Err(error) => return ReplyOutcome::Failed(error),
    };
    debug!(
        target: QUEUE_TARGET,
        seq = message.seq,
        command = native.name(),
        "executing native command"
    );
    match hardware.execute(&native) {
        Ok(HardwareResponse::Lines(lines)) => ReplyOutcome::Lines(lines),
        Ok(HardwareResponse::NotImplemented) => ReplyOutcome::NotImplemented,
        Err(error) => {
            warn!(
                target: QUEUE_TARGET,
                seq = message.seq,
                %error,
                "native command failed"
            );
            ReplyOutcome::Failed(error)
        }
    }
}
