//! Shared doubles for unit and behaviour tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use mockall::mock;

use crate::command::{Command, CommandPayload, CommandResult};
use crate::error::CecError;
use crate::hardware::{HardwareBoundary, HardwareResponse};
use crate::queue::NativeCommand;

/// Upper bound on how long a test waits for an asynchronous completion.
pub(crate) const COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);

mock! {
    pub Hardware {}
    impl HardwareBoundary for Hardware {
        fn open(&mut self) -> Result<(), CecError>;
        fn execute(&mut self, command: &NativeCommand) -> Result<HardwareResponse, CecError>;
        fn close(&mut self);
    }
}

/// Adapter double that answers each command name with canned lines and
/// records every command it receives.
#[derive(Clone, Default)]
pub(crate) struct ScriptedAdapter {
    replies: Arc<Mutex<HashMap<String, Vec<String>>>>,
    received: Arc<Mutex<Vec<NativeCommand>>>,
}

impl ScriptedAdapter {
    /// Sets the reply lines for commands called `name`.
    pub(crate) fn reply(&self, name: &str, lines: &[&str]) {
        self.replies
            .lock()
            .expect("replies lock")
            .insert(name.to_owned(), lines.iter().map(|line| (*line).to_owned()).collect());
    }

    /// Commands received so far, in order.
    pub(crate) fn received(&self) -> Vec<NativeCommand> {
        self.received.lock().expect("received lock").clone()
    }

    /// Names of the commands received so far, in order.
    pub(crate) fn received_names(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|command| command.name().to_owned())
            .collect()
    }
}

impl HardwareBoundary for ScriptedAdapter {
    fn open(&mut self) -> Result<(), CecError> {
        Ok(())
    }

    fn execute(&mut self, command: &NativeCommand) -> Result<HardwareResponse, CecError> {
        self.received
            .lock()
            .expect("received lock")
            .push(command.clone());
        let lines = self
            .replies
            .lock()
            .expect("replies lock")
            .get(command.name())
            .cloned()
            .unwrap_or_default();
        Ok(HardwareResponse::Lines(lines))
    }

    fn close(&mut self) {}
}

/// Builds a command whose result is delivered on the returned channel.
pub(crate) fn command_with_channel(
    payload: CommandPayload,
) -> (Command, mpsc::Receiver<CommandResult>) {
    let (sender, receiver) = mpsc::channel();
    let command = Command::new(payload, move |result| {
        drop(sender.send(result));
    });
    (command, receiver)
}

/// Waits for a completion delivered through [`command_with_channel`].
pub(crate) fn await_result(receiver: &mpsc::Receiver<CommandResult>) -> CommandResult {
    receiver
        .recv_timeout(COMPLETION_TIMEOUT)
        .expect("command completed in time")
}
