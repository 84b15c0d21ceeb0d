//! HDMI-CEC command dispatch and device state.
//!
//! `cec-core` routes CEC requests (enumerate adapters, scan the bus, send a
//! sub-command, read or write adapter configuration) through a rank-ordered
//! chain of handlers. Vendor handlers observe or rewrite commands; the
//! [`DefaultHandler`] validates them against the live adapter and device
//! registries and forwards them to an external adapter tool through a
//! single-worker [`CommandQueue`]. Free-text replies are parsed back into
//! typed [`CommandResult`]s and delivered through each command's completion
//! closure, exactly once.
//!
//! # Architecture
//!
//! - [`controller`]: handler registration, one-time chain construction and
//!   dispatch.
//! - [`handler`]: the [`CecHandler`] capability trait, the default handler
//!   and the LG television profile.
//! - [`queue`]: the worker thread serialising calls to the hardware.
//! - [`hardware`]: the [`HardwareBoundary`] seam and the process-backed
//!   [`ProcessAdapter`].
//! - [`parser`]: pure reply parsing.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use cec_core::{
//!     CecController, Command, CommandPayload, DefaultHandler, HandlerRank, LgTvHandler,
//!     ProcessAdapter,
//! };
//!
//! let adapter = ProcessAdapter::new("/usr/bin/cec-adapter", Duration::from_secs(1));
//! let controller = CecController::new();
//! assert!(controller.register(LgTvHandler::factory(), HandlerRank::LgTv));
//! assert!(controller.register(
//!     DefaultHandler::factory(Box::new(adapter), "cec0"),
//!     HandlerRank::Default,
//! ));
//! let claimed = controller.dispatch(Command::new(CommandPayload::ListAdapters, |result| {
//!     assert!(result.is_success());
//! }));
//! assert!(claimed);
//! ```

pub mod command;
pub mod controller;
pub mod error;
pub mod handler;
pub mod hardware;
pub mod parser;
pub mod queue;

#[cfg(test)]
mod tests;

pub use self::command::{
    CecCommand, CecCommandArg, CecDevice, Command, CommandKind, CommandPayload, CommandResult,
    GetConfigRequest, PayloadEntry, ResultData, ScanRequest, SendCommandRequest,
    SetConfigRequest,
};
pub use self::controller::CecController;
pub use self::error::{CecError, ErrorInfo, ErrorKind};
pub use self::handler::default::DefaultHandler;
pub use self::handler::lg::LgTvHandler;
pub use self::handler::{
    CecHandler, DeviceLookup, HandleOutcome, HandlerContext, HandlerFactory, HandlerRank,
    ScanNotifier, ScanObserver,
};
pub use self::hardware::{HardwareBoundary, HardwareResponse, ProcessAdapter};
pub use self::queue::{CommandQueue, MessageData, NativeCommand};
