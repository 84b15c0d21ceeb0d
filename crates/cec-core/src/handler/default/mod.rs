//! The generic handler at the end of the dispatch chain.
//!
//! [`DefaultHandler`] validates every command against the live adapter and
//! device registries. Invalid commands are completed immediately with the
//! matching error and never reach the queue. Valid commands are recorded as
//! pending, translated into [`MessageData`] and submitted to the
//! [`CommandQueue`]; the queue's reply is parsed on the worker thread, the
//! registries are updated, and the pending command is completed.
//!
//! Pending commands are correlated with replies by sequence id. The pending
//! record is registered before the message is submitted so a fast reply can
//! never arrive for an unknown command.

mod registry;
pub mod validation;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use self::registry::Registry;
use super::{CecHandler, HandleOutcome, HandlerContext, HandlerFactory, HandlerRank, ScanNotifier};
use crate::command::{CecDevice, Command, CommandKind, CommandPayload, CommandResult, ResultData};
use crate::error::{CecError, ErrorKind};
use crate::hardware::HardwareBoundary;
use crate::parser;
use crate::queue::{CommandQueue, MessageData, NativeCommand, QueueReply, ReplyOutcome};

/// Tracing target for default handler operations.
const HANDLER_TARGET: &str = "cec_core::handler::default";

/// A command waiting for its queue reply.
struct PendingCommand {
    seq: u64,
    kind: CommandKind,
    command: Command,
}

/// State shared between the handler and the queue's reply callback.
struct HandlerShared {
    default_adapter: String,
    registry: Registry,
    pending: Mutex<VecDeque<PendingCommand>>,
    next_seq: AtomicU64,
    notifier: ScanNotifier,
}

impl HandlerShared {
    fn pending(&self) -> MutexGuard<'_, VecDeque<PendingCommand>> {
        self.pending
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Removes and returns the pending record for `seq`.
    fn take_pending(&self, seq: u64) -> Option<PendingCommand> {
        let mut pending = self.pending();
        let position = pending.iter().position(|record| record.seq == seq)?;
        if position != 0 {
            warn!(
                target: HANDLER_TARGET,
                seq,
                position,
                "reply arrived out of submission order"
            );
        }
        pending.remove(position)
    }

    fn check_adapter(&self, adapter: Option<&str>) -> Result<(), ErrorKind> {
        match adapter {
            Some(name) if !self.registry.has_adapter(name) => Err(ErrorKind::InvalidAdapter),
            _ => Ok(()),
        }
    }

    fn validate(&self, payload: &CommandPayload) -> Result<(), ErrorKind> {
        self.check_adapter(payload.adapter())?;
        match payload {
            CommandPayload::ListAdapters | CommandPayload::Scan(_) => {}
            CommandPayload::SendCommand(request) => {
                if self.registry.device(&request.dest_address).is_none() {
                    return Err(ErrorKind::InvalidDestination);
                }
                validation::check_sub_command(&request.command)?;
            }
            CommandPayload::GetConfig(request) => validation::check_get_key(&request.key)?,
            CommandPayload::SetConfig(request) => validation::check_set_key(&request.key)?,
        }
        NativeCommand::from_message(&to_message(0, payload, &self.default_adapter))
            .map(drop)
            .map_err(|error| error.kind())
    }

    /// Completes the pending command answered by `reply`.
    fn on_reply(&self, reply: QueueReply) {
        let Some(pending) = self.take_pending(reply.seq) else {
            warn!(
                target: HANDLER_TARGET,
                seq = reply.seq,
                kind = %reply.kind,
                "dropping reply with no pending command"
            );
            return;
        };

        let result = match reply.outcome {
            ReplyOutcome::Lines(lines) => {
                let result = parser::parse_reply(pending.command.payload(), &lines);
                self.apply(&result);
                result
            }
            ReplyOutcome::NotImplemented => {
                warn!(
                    target: HANDLER_TARGET,
                    seq = pending.seq,
                    kind = %pending.kind,
                    "adapter does not implement command"
                );
                CommandResult::failure(pending.kind, ErrorKind::HardwareUnavailable)
            }
            ReplyOutcome::Failed(error) => {
                warn!(
                    target: HANDLER_TARGET,
                    seq = pending.seq,
                    kind = %pending.kind,
                    %error,
                    "command failed at the adapter"
                );
                CommandResult::failure(pending.kind, error.kind())
            }
        };

        debug!(
            target: HANDLER_TARGET,
            seq = pending.seq,
            kind = %pending.kind,
            success = result.is_success(),
            "completing command"
        );
        pending.command.complete(result);
    }

    /// Folds a successful reply into the registries.
    fn apply(&self, result: &CommandResult) {
        match result.data() {
            Some(ResultData::Adapters { names }) => {
                self.registry.replace_adapters(names);
                info!(
                    target: HANDLER_TARGET,
                    adapters = names.len(),
                    "adapter registry replaced"
                );
            }
            Some(ResultData::Devices { devices }) => {
                self.registry.merge_devices(devices);
                info!(
                    target: HANDLER_TARGET,
                    devices = devices.len(),
                    "device registry updated from scan"
                );
                self.notifier.notify(devices);
            }
            _ => {}
        }
    }
}

/// Translates a payload into queue message parameters.
///
/// The adapter parameter falls back to `default_adapter` when the request
/// names none.
fn to_message(seq: u64, payload: &CommandPayload, default_adapter: &str) -> MessageData {
    let adapter = |requested: Option<&str>| {
        requested.map_or_else(|| default_adapter.to_owned(), str::to_owned)
    };
    let message = MessageData::new(seq, payload.kind());
    match payload {
        CommandPayload::ListAdapters => message,
        CommandPayload::Scan(request) => {
            message.with_param("adapter", adapter(request.adapter.as_deref()))
        }
        CommandPayload::SendCommand(request) => request.command.args.iter().fold(
            message
                .with_param("adapter", adapter(request.adapter.as_deref()))
                .with_param("destAddress", request.dest_address.as_str())
                .with_param("timeout", request.timeout_ms.to_string())
                .with_param("name", request.command.name.as_str()),
            |message, arg| message.with_param(arg.arg.as_str(), arg.value_or_empty()),
        ),
        CommandPayload::GetConfig(request) => message
            .with_param(request.key.as_str(), "")
            .with_param("adapter", adapter(request.adapter.as_deref())),
        CommandPayload::SetConfig(request) => message
            .with_param(request.key.as_str(), request.value.as_str())
            .with_param("adapter", adapter(request.adapter.as_deref())),
    }
}

/// Generic handler backed by the command queue.
///
/// Dropping the handler stops the queue; commands still pending at that
/// point complete with [`ErrorKind::HardwareUnavailable`].
pub struct DefaultHandler {
    shared: Arc<HandlerShared>,
    queue: CommandQueue,
}

impl DefaultHandler {
    /// Starts the handler and its queue worker.
    ///
    /// # Errors
    ///
    /// Returns [`CecError::SpawnFailed`] when the queue worker cannot start.
    pub fn start(
        hardware: Box<dyn HardwareBoundary>,
        default_adapter: impl Into<String>,
        notifier: ScanNotifier,
    ) -> Result<Self, CecError> {
        let shared = Arc::new(HandlerShared {
            default_adapter: default_adapter.into(),
            registry: Registry::default(),
            pending: Mutex::new(VecDeque::new()),
            next_seq: AtomicU64::new(1),
            notifier,
        });
        let reply_shared = Arc::clone(&shared);
        let queue = CommandQueue::start(hardware, move |reply| reply_shared.on_reply(reply))?;
        Ok(Self { shared, queue })
    }

    /// Factory registering a default handler over `hardware`.
    #[must_use]
    pub fn factory(
        hardware: Box<dyn HardwareBoundary>,
        default_adapter: impl Into<String>,
    ) -> HandlerFactory {
        let adapter = default_adapter.into();
        Box::new(move |context: &HandlerContext| {
            let handler = Self::start(hardware, adapter, context.notifier().clone())?;
            Ok(Box::new(handler) as Box<dyn CecHandler>)
        })
    }

    /// Snapshot of the adapter registry.
    #[must_use]
    pub fn adapters(&self) -> Vec<String> {
        self.shared.registry.adapters()
    }

    /// Snapshot of the device registry.
    #[must_use]
    pub fn devices(&self) -> Vec<CecDevice> {
        self.shared.registry.devices()
    }

    /// Number of commands awaiting a reply.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.shared.pending().len()
    }
}

impl CecHandler for DefaultHandler {
    fn handle_command(&self, command: Command) -> HandleOutcome {
        let kind = command.kind();
        if let Err(error) = self.validate_command(&command) {
            debug!(
                target: HANDLER_TARGET,
                %kind,
                error = %error,
                "command rejected"
            );
            command.complete(CommandResult::failure(kind, error));
            return HandleOutcome::Claimed;
        }

        let seq = self.shared.next_seq.fetch_add(1, Ordering::Relaxed);
        let message = to_message(seq, command.payload(), &self.shared.default_adapter);
        self.shared
            .pending()
            .push_back(PendingCommand { seq, kind, command });

        if let Err(error) = self.queue.submit(message) {
            warn!(
                target: HANDLER_TARGET,
                seq,
                %kind,
                %error,
                "failed to queue command"
            );
            if let Some(pending) = self.shared.take_pending(seq) {
                pending
                    .command
                    .complete(CommandResult::failure(kind, ErrorKind::HardwareUnavailable));
            }
        }
        HandleOutcome::Claimed
    }

    fn rank(&self) -> HandlerRank {
        HandlerRank::Default
    }

    fn device_info(&self, address: &str) -> Option<CecDevice> {
        self.shared.registry.device(address)
    }

    fn validate_command(&self, command: &Command) -> Result<(), ErrorKind> {
        self.shared.validate(command.payload())
    }
}

impl Drop for DefaultHandler {
    fn drop(&mut self) {
        self.queue.shutdown();
        let abandoned: Vec<PendingCommand> = self.shared.pending().drain(..).collect();
        for pending in abandoned {
            debug!(
                target: HANDLER_TARGET,
                seq = pending.seq,
                "completing command abandoned at shutdown"
            );
            pending
                .command
                .complete(CommandResult::failure(pending.kind, ErrorKind::HardwareUnavailable));
        }
    }
}

#[cfg(test)]
mod tests;
