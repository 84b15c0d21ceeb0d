//! Handler registry and rank-ordered dispatch.
//!
//! A [`CecController`] collects `(factory, rank)` registrations, builds the
//! handler chain once, and offers each dispatched command to the handlers in
//! ascending rank order until one claims it. The chain is published through a
//! [`OnceLock`], so concurrent callers either wait for the complete chain or
//! see it fully built; it is never observed half-constructed and never built
//! twice.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::command::{CecDevice, Command, CommandResult};
use crate::error::ErrorKind;
use crate::handler::{
    CecHandler, DeviceLookup, HandleOutcome, HandlerContext, HandlerFactory, HandlerRank,
    ScanNotifier, ScanObserver,
};

/// Tracing target for controller operations.
const CONTROLLER_TARGET: &str = "cec_core::controller";

struct Registration {
    rank: HandlerRank,
    factory: HandlerFactory,
}

struct HandlerChain {
    handlers: Vec<Box<dyn CecHandler>>,
    complete: bool,
}

struct ControllerShared {
    registrations: Mutex<Vec<Registration>>,
    chain: OnceLock<HandlerChain>,
    notifier: ScanNotifier,
}

impl ControllerShared {
    fn registrations(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn device_info(&self, address: &str) -> Option<CecDevice> {
        self.chain.get()?.handlers.last()?.device_info(address)
    }
}

/// Resolves devices through the controller without keeping it alive.
struct ControllerLookup(Weak<ControllerShared>);

impl DeviceLookup for ControllerLookup {
    fn device_info(&self, address: &str) -> Option<CecDevice> {
        self.0.upgrade()?.device_info(address)
    }
}

/// Entry point for command dispatch.
///
/// The controller is a cheap handle; clones share the same registrations and
/// handler chain.
///
/// # Example
///
/// ```ignore
/// use cec_core::{CecController, HandlerRank, LgTvHandler};
///
/// let controller = CecController::new();
/// assert!(controller.register(LgTvHandler::factory(), HandlerRank::LgTv));
/// assert!(controller.initialize());
/// ```
#[derive(Clone)]
pub struct CecController {
    shared: Arc<ControllerShared>,
}

impl Default for CecController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CecController {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CecController")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl CecController {
    /// Creates a controller with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ControllerShared {
                registrations: Mutex::new(Vec::new()),
                chain: OnceLock::new(),
                notifier: ScanNotifier::default(),
            }),
        }
    }

    /// Registers a handler factory at `rank`.
    ///
    /// Registrations stay sorted by rank; equal ranks keep registration
    /// order. Registrations made after the chain is built are ignored.
    /// Always returns `true`.
    #[must_use]
    pub fn register(&self, factory: HandlerFactory, rank: HandlerRank) -> bool {
        if self.is_initialized() {
            warn!(
                target: CONTROLLER_TARGET,
                %rank,
                "registration after initialisation has no effect"
            );
        }
        let mut registrations = self.shared.registrations();
        let position = registrations.partition_point(|existing| existing.rank <= rank);
        registrations.insert(position, Registration { rank, factory });
        debug!(target: CONTROLLER_TARGET, %rank, position, "handler registered");
        true
    }

    /// Ranks of the registrations not yet instantiated, in chain order.
    #[must_use]
    pub fn registered_ranks(&self) -> Vec<HandlerRank> {
        self.shared
            .registrations()
            .iter()
            .map(|registration| registration.rank)
            .collect()
    }

    /// Builds the handler chain if it has not been built yet.
    ///
    /// Returns `false` when any factory failed; the handlers that did build
    /// remain in the chain.
    #[must_use]
    pub fn initialize(&self) -> bool {
        self.chain().complete
    }

    /// Builds the handler chain on a background thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the thread cannot be spawned.
    pub fn initialize_in_background(&self) -> std::io::Result<JoinHandle<bool>> {
        let controller = self.clone();
        thread::Builder::new()
            .name(String::from("cec-init"))
            .spawn(move || controller.initialize())
    }

    /// Returns `true` once the handler chain has been built.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.shared.chain.get().is_some()
    }

    /// Ranks of the instantiated handlers, in chain order.
    #[must_use]
    pub fn handler_ranks(&self) -> Vec<HandlerRank> {
        self.shared
            .chain
            .get()
            .map(|chain| chain.handlers.iter().map(|handler| handler.rank()).collect())
            .unwrap_or_default()
    }

    /// Offers `command` to each handler in rank order.
    ///
    /// Returns `true` when a handler claimed the command. Otherwise the
    /// command is completed with [`ErrorKind::Unknown`] and `false` is
    /// returned.
    #[must_use]
    pub fn dispatch(&self, mut command: Command) -> bool {
        let chain = self.chain();
        let kind = command.kind();
        for handler in &chain.handlers {
            match handler.handle_command(command) {
                HandleOutcome::Claimed => {
                    debug!(
                        target: CONTROLLER_TARGET,
                        %kind,
                        rank = %handler.rank(),
                        "command claimed"
                    );
                    return true;
                }
                HandleOutcome::Declined(next) => command = next,
            }
        }
        warn!(target: CONTROLLER_TARGET, %kind, "no handler claimed command");
        command.complete(CommandResult::failure(kind, ErrorKind::Unknown));
        false
    }

    /// Looks up a device through the most generic handler.
    ///
    /// Returns `None` before the chain is built.
    #[must_use]
    pub fn device_info(&self, address: &str) -> Option<CecDevice> {
        self.shared.device_info(address)
    }

    /// Registers an observer for scan results.
    pub fn subscribe_scan(&self, observer: Arc<dyn ScanObserver>) {
        self.shared.notifier.subscribe(observer);
    }

    fn chain(&self) -> &HandlerChain {
        self.shared.chain.get_or_init(|| self.build_chain())
    }

    fn build_chain(&self) -> HandlerChain {
        let registrations = std::mem::take(&mut *self.shared.registrations());
        let lookup: Arc<dyn DeviceLookup> =
            Arc::new(ControllerLookup(Arc::downgrade(&self.shared)));
        let context = HandlerContext::new(lookup, self.shared.notifier.clone());

        let mut handlers = Vec::with_capacity(registrations.len());
        let mut complete = true;
        for Registration { rank, factory } in registrations {
            match factory(&context) {
                Ok(handler) => handlers.push(handler),
                Err(error) => {
                    warn!(
                        target: CONTROLLER_TARGET,
                        %rank,
                        %error,
                        "handler failed to initialise"
                    );
                    complete = false;
                }
            }
        }
        info!(
            target: CONTROLLER_TARGET,
            handlers = handlers.len(),
            complete,
            "handler chain initialised"
        );
        HandlerChain { handlers, complete }
    }
}
