//! Handler capability interface and the context handlers are built with.
//!
//! Handlers form a chain ordered by [`HandlerRank`]. Each handler either
//! claims a command, taking responsibility for completing it, or declines
//! and hands it, possibly rewritten, to the next handler.

pub mod default;
pub mod lg;

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::command::{CecDevice, Command};
use crate::error::{CecError, ErrorKind};

/// Position of a handler in the dispatch chain; lower ranks are asked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandlerRank {
    /// LG television profile.
    LgTv,
    /// Samsung television profile.
    Samsung,
    /// Generic handler that claims every command it can validate.
    Default,
}

impl fmt::Display for HandlerRank {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LgTv => "lg-tv",
            Self::Samsung => "samsung",
            Self::Default => "default",
        };
        formatter.write_str(label)
    }
}

/// Result of offering a command to a handler.
#[derive(Debug)]
pub enum HandleOutcome {
    /// The handler owns the command and will complete it.
    Claimed,
    /// The handler passes the command on.
    Declined(Command),
}

/// A link in the dispatch chain.
pub trait CecHandler: Send + Sync {
    /// Offers `command` to this handler.
    fn handle_command(&self, command: Command) -> HandleOutcome;

    /// Rank this handler was registered with.
    fn rank(&self) -> HandlerRank;

    /// Looks up a device by logical address.
    fn device_info(&self, _address: &str) -> Option<CecDevice> {
        None
    }

    /// Checks `command` against this handler's contract.
    ///
    /// # Errors
    ///
    /// Returns the error kind the command should fail with.
    fn validate_command(&self, _command: &Command) -> Result<(), ErrorKind> {
        Ok(())
    }
}

/// Read access to the device registry of the dispatch chain.
pub trait DeviceLookup: Send + Sync {
    /// Returns the device at `address`, if a scan has seen it.
    fn device_info(&self, address: &str) -> Option<CecDevice>;
}

/// Receives the device list of every successful scan.
pub trait ScanObserver: Send + Sync {
    /// Called after the device registry has been updated.
    fn devices_scanned(&self, devices: &[CecDevice]);
}

/// Fan-out point for scan notifications.
#[derive(Clone, Default)]
pub struct ScanNotifier {
    observers: Arc<Mutex<Vec<Arc<dyn ScanObserver>>>>,
}

impl ScanNotifier {
    /// Adds an observer.
    pub fn subscribe(&self, observer: Arc<dyn ScanObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(observer);
    }

    /// Notifies every observer. Observers run without the list lock held.
    pub fn notify(&self, devices: &[CecDevice]) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone();
        for observer in observers {
            observer.devices_scanned(devices);
        }
    }
}

impl fmt::Debug for ScanNotifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("ScanNotifier").finish_non_exhaustive()
    }
}

/// Collaborators available to handler factories.
#[derive(Clone)]
pub struct HandlerContext {
    lookup: Arc<dyn DeviceLookup>,
    notifier: ScanNotifier,
}

impl HandlerContext {
    /// Creates a context.
    #[must_use]
    pub fn new(lookup: Arc<dyn DeviceLookup>, notifier: ScanNotifier) -> Self {
        Self { lookup, notifier }
    }

    /// Looks up a device through the dispatch chain.
    #[must_use]
    pub fn device_info(&self, address: &str) -> Option<CecDevice> {
        self.lookup.device_info(address)
    }

    /// Device lookup handle.
    #[must_use]
    pub fn lookup(&self) -> Arc<dyn DeviceLookup> {
        Arc::clone(&self.lookup)
    }

    /// Scan notifier shared by the chain.
    #[must_use]
    pub fn notifier(&self) -> &ScanNotifier {
        &self.notifier
    }
}

/// Builds one handler instance when the chain is initialised.
pub type HandlerFactory =
    Box<dyn FnOnce(&HandlerContext) -> Result<Box<dyn CecHandler>, CecError> + Send>;
