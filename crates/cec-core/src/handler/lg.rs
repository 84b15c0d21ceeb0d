//! Vendor profile for LG televisions.
//!
//! The handler recognises send-command traffic aimed at an LG television and
//! logs it. It never claims a command, so the generic handler still carries
//! out the request.

use std::sync::Arc;

use tracing::info;

use super::{CecHandler, DeviceLookup, HandleOutcome, HandlerContext, HandlerFactory, HandlerRank};
use crate::command::{CecDevice, Command, CommandPayload};

const LG_TARGET: &str = "cec_core::handler::lg";

const TV_DEVICE_NAME: &str = "TV";
const LG_VENDOR: &str = "LG";

/// Observes commands sent to LG televisions.
pub struct LgTvHandler {
    lookup: Arc<dyn DeviceLookup>,
}

impl LgTvHandler {
    /// Creates a handler that resolves destinations through `lookup`.
    #[must_use]
    pub fn new(lookup: Arc<dyn DeviceLookup>) -> Self {
        Self { lookup }
    }

    /// Factory for registering the handler with a controller.
    #[must_use]
    pub fn factory() -> HandlerFactory {
        Box::new(|context: &HandlerContext| {
            Ok(Box::new(Self::new(context.lookup())) as Box<dyn CecHandler>)
        })
    }

    /// Returns `true` for a television reporting the LG vendor.
    #[must_use]
    pub fn matches_profile(device: &CecDevice) -> bool {
        device.name == TV_DEVICE_NAME && device.vendor == LG_VENDOR
    }
}

impl CecHandler for LgTvHandler {
    fn handle_command(&self, command: Command) -> HandleOutcome {
        if let CommandPayload::SendCommand(request) = command.payload()
            && let Some(device) = self.lookup.device_info(&request.dest_address)
            && Self::matches_profile(&device)
        {
            info!(
                target: LG_TARGET,
                destination = %request.dest_address,
                sub_command = %request.command.name,
                "command addressed to LG television"
            );
        }
        HandleOutcome::Declined(command)
    }

    fn rank(&self) -> HandlerRank {
        HandlerRank::LgTv
    }
}
