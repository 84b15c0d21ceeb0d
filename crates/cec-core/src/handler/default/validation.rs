//! Argument contracts for CEC sub-commands and configuration keys.

use std::collections::HashSet;

use crate::command::CecCommand;
use crate::error::ErrorKind;

/// Keys accepted by `GetConfig`.
pub const GET_CONFIG_KEYS: [&str; 7] = [
    "vendorId",
    "version",
    "osd",
    "language",
    "powerState",
    "physicalAddress",
    "logicalAddress",
];

/// Keys accepted by `SetConfig`.
pub const SET_CONFIG_KEYS: [&str; 3] = ["vendorId", "osd", "deviceType"];

const SYSTEM_INFORMATION_ARGS: [&str; 5] = ["vendor-id", "version", "name", "language", "is-active"];

/// Arguments a sub-command accepts.
enum ArgContract {
    /// No arguments.
    Empty,
    /// Exactly one argument called `arg`; `values` restricts its value when
    /// present.
    Single {
        arg: &'static str,
        values: Option<&'static [&'static str]>,
    },
    /// One or more distinct arguments from `allowed`, all without values.
    Subset { allowed: &'static [&'static str] },
}

fn contract_for(name: &str) -> Option<ArgContract> {
    let contract = match name {
        "report-power-status" => ArgContract::Single {
            arg: "pwr-state",
            values: Some(&["", "on", "standby"]),
        },
        "report-audio-status" => ArgContract::Single {
            arg: "audio-status",
            values: Some(&[""]),
        },
        "set-volume" => ArgContract::Single {
            arg: "volume",
            values: Some(&["up", "down", "mute", "unmute"]),
        },
        "osd-display" => ArgContract::Single {
            arg: "display-text",
            values: None,
        },
        "vendor-commands" => ArgContract::Single {
            arg: "vendor-command",
            values: None,
        },
        "active" | "one-touch-play" => ArgContract::Empty,
        "system-information" => ArgContract::Subset {
            allowed: &SYSTEM_INFORMATION_ARGS,
        },
        _ => return None,
    };
    Some(contract)
}

/// Checks a sub-command against its argument contract.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidCommand`] for unknown sub-commands and
/// [`ErrorKind::InvalidParameters`] when the arguments do not fit.
pub fn check_sub_command(command: &CecCommand) -> Result<(), ErrorKind> {
    let contract = contract_for(&command.name).ok_or(ErrorKind::InvalidCommand)?;
    let fits = match contract {
        ArgContract::Empty => command.args.is_empty(),
        ArgContract::Single { arg, values } => match command.args.as_slice() {
            [only] => {
                only.arg == arg
                    && values.is_none_or(|allowed| allowed.contains(&only.value_or_empty()))
            }
            _ => false,
        },
        ArgContract::Subset { allowed } => {
            let mut seen = HashSet::new();
            !command.args.is_empty()
                && command.args.iter().all(|arg| {
                    allowed.contains(&arg.arg.as_str())
                        && arg.value_or_empty().is_empty()
                        && seen.insert(arg.arg.as_str())
                })
        }
    };
    if fits {
        Ok(())
    } else {
        Err(ErrorKind::InvalidParameters)
    }
}

/// Checks a `GetConfig` key.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidParameters`] for unsupported keys.
pub fn check_get_key(key: &str) -> Result<(), ErrorKind> {
    check_key(&GET_CONFIG_KEYS, key)
}

/// Checks a `SetConfig` key.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidParameters`] for unsupported keys.
pub fn check_set_key(key: &str) -> Result<(), ErrorKind> {
    check_key(&SET_CONFIG_KEYS, key)
}

fn check_key(allowed: &[&str], key: &str) -> Result<(), ErrorKind> {
    if allowed.contains(&key) {
        Ok(())
    } else {
        Err(ErrorKind::InvalidParameters)
    }
}
