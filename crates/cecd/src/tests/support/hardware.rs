//! Hardware and output doubles.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use mockall::mock;
use serde_json::Value;

use cec_config::Config;
use cec_core::{CecError, HardwareBoundary, HardwareResponse, NativeCommand};

use crate::bootstrap::AdapterProvider;

mock! {
    pub AdapterProvider {}
    impl AdapterProvider for AdapterProvider {
        fn provide(&self, config: &Config) -> Box<dyn HardwareBoundary>;
    }
}

/// Adapter double answering each command name with canned lines.
#[derive(Clone, Default)]
pub(crate) struct ScriptedHardware {
    replies: Arc<Mutex<HashMap<String, Vec<String>>>>,
    received: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHardware {
    /// Sets the reply lines for commands called `name`.
    pub(crate) fn reply(&self, name: &str, lines: &[&str]) {
        self.replies.lock().expect("replies lock").insert(
            name.to_owned(),
            lines.iter().map(|line| (*line).to_owned()).collect(),
        );
    }

    /// Request lines received so far, in order.
    pub(crate) fn received(&self) -> Vec<String> {
        self.received.lock().expect("received lock").clone()
    }
}

impl HardwareBoundary for ScriptedHardware {
    fn open(&mut self) -> Result<(), CecError> {
        Ok(())
    }

    fn execute(&mut self, command: &NativeCommand) -> Result<HardwareResponse, CecError> {
        self.received
            .lock()
            .expect("received lock")
            .push(command.to_request_line());
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

/// Cloneable in-memory sink handed to the response writer thread.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Parses every line written so far as JSON.
    pub(crate) fn responses(&self) -> Vec<Value> {
        let bytes = self.bytes.lock().expect("buffer lock").clone();
        String::from_utf8(bytes)
            .expect("utf8 output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("response line is JSON"))
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
