//! Reconstructs typed results from the adapter's free-text replies.
//!
//! Every function here is pure: it takes the ordered reply lines and the
//! request that produced them and returns data without touching any registry.
//! Keyword matching is case-sensitive substring search, and fields are filled
//! on first match only.

use crate::command::{
    CecCommand, CecDevice, CommandKind, CommandPayload, CommandResult, PayloadEntry, ResultData,
};
use crate::error::ErrorKind;

const ADAPTER_MARKER: &str = "com port";
const DEVICE_MARKER: &str = "device";
const RESPONSE_MARKER: &str = "response";
const RASPBERRY_PI_PORT: &str = "RPI";
const RASPBERRY_PI_ADAPTER: &str = "cec0";

/// Returns the text after the first `:`, skipping one optional space.
///
/// Lines without a colon, or with nothing after it, yield an empty string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(extract_value("vendor: LG"), "LG");
/// assert_eq!(extract_value("no colon"), "");
/// ```
#[must_use]
pub fn extract_value(line: &str) -> &str {
    line.split_once(':').map_or("", |(_, rest)| {
        rest.strip_prefix(' ').unwrap_or(rest)
    })
}

/// Returns the text between the first and last `'` on the line, or
/// [`extract_value`] when the line is not quoted.
#[must_use]
pub fn quoted_value(line: &str) -> &str {
    match (line.find('\''), line.rfind('\'')) {
        (Some(first), Some(last)) if last > first => line.get(first + 1..last).unwrap_or(""),
        _ => extract_value(line),
    }
}

/// Returns the text following `marker`, with one optional `:` and
/// surrounding whitespace removed.
fn value_after<'a>(line: &'a str, marker: &str) -> &'a str {
    line.split_once(marker).map_or("", |(_, rest)| {
        let trimmed = rest.trim_start();
        trimmed.strip_prefix(':').unwrap_or(trimmed).trim()
    })
}

fn find_line<'a>(lines: &'a [String], marker: &str) -> Option<&'a str> {
    lines
        .iter()
        .map(String::as_str)
        .find(|line| line.contains(marker))
}

/// Parses a `ListAdapters` reply into adapter names, in line order.
#[must_use]
pub fn parse_adapters(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.contains(ADAPTER_MARKER))
        .map(|line| match extract_value(line) {
            RASPBERRY_PI_PORT => RASPBERRY_PI_ADAPTER.to_owned(),
            name => name.to_owned(),
        })
        .collect()
}

/// Parses a `Scan` dump into device records, in line order.
///
/// Lines before the first `device` marker are ignored.
#[must_use]
pub fn parse_devices(lines: &[String]) -> Vec<CecDevice> {
    let mut devices = Vec::new();
    let mut current: Option<CecDevice> = None;

    for line in lines {
        if line.contains(DEVICE_MARKER) {
            devices.extend(current.take());
            current = Some(CecDevice {
                name: extract_value(line).to_owned(),
                ..CecDevice::default()
            });
            continue;
        }
        if let Some(device) = current.as_mut() {
            fill_device_field(device, line);
        }
    }
    devices.extend(current);
    devices
}

fn fill_device_field(device: &mut CecDevice, line: &str) {
    let slots: [(&mut String, &str, bool); 7] = [
        (&mut device.address, "address", false),
        (&mut device.active_source, "active source", false),
        (&mut device.vendor, "vendor", false),
        (&mut device.osd, "osd string", true),
        (&mut device.cec_version, "CEC version", false),
        (&mut device.power_status, "power status", false),
        (&mut device.language, "language", true),
    ];
    for (slot, marker, quoted) in slots {
        if slot.is_empty() && line.contains(marker) {
            let value = if quoted {
                quoted_value(line)
            } else {
                extract_value(line)
            };
            value.clone_into(slot);
            return;
        }
    }
}

/// Parses a `SendCommand` reply according to the sub-command that was sent.
///
/// Value-reporting sub-commands always yield one entry per requested
/// argument; an argument whose keyword line is missing gets an empty value.
///
/// # Errors
///
/// Returns [`ErrorKind::HardwareUnavailable`] when a status-only sub-command
/// reports failure.
pub fn parse_send_command(
    command: &CecCommand,
    lines: &[String],
) -> Result<Vec<PayloadEntry>, ErrorKind> {
    let single = |default_key: &str, value: Option<&str>| {
        let key = command.args.first().map_or(default_key, |arg| arg.arg.as_str());
        vec![PayloadEntry::new(key, value.unwrap_or_default())]
    };

    match command.name.as_str() {
        "report-power-status" => Ok(single(
            "pwr-state",
            find_line(lines, "power status").map(extract_value),
        )),
        "report-audio-status" => Ok(single(
            "audio-status",
            find_line(lines, "mute").map(extract_value),
        )),
        "set-volume" => Ok(single("volume", find_line(lines, "volume").map(extract_value))),
        "osd-display" => Ok(single("display-text", find_line(lines, "OSD"))),
        "system-information" => Ok(parse_system_information(command, lines)),
        "active" | "one-touch-play" | "vendor-commands" => parse_status(lines),
        _ => Ok(Vec::new()),
    }
}

fn parse_system_information(command: &CecCommand, lines: &[String]) -> Vec<PayloadEntry> {
    command
        .args
        .iter()
        .map(|arg| {
            let value = match arg.arg.as_str() {
                "vendor-id" => find_line(lines, "vendor id").map(extract_value),
                "version" => find_line(lines, "CEC version").map(extract_value),
                "name" => find_line(lines, "OSD name").map(quoted_value),
                "language" => find_line(lines, "language").map(quoted_value),
                "is-active" => find_line(lines, "active")
                    .map(|line| if line.contains("not active") { "false" } else { "true" }),
                _ => None,
            };
            PayloadEntry::new(arg.arg.as_str(), value.unwrap_or_default())
        })
        .collect()
}

fn parse_status(lines: &[String]) -> Result<Vec<PayloadEntry>, ErrorKind> {
    let Some(line) = find_line(lines, RESPONSE_MARKER) else {
        return Ok(Vec::new());
    };
    match extract_value(line).trim() {
        "success" => Ok(Vec::new()),
        "failure" | "failed" | "error" => Err(ErrorKind::HardwareUnavailable),
        other => Ok(vec![PayloadEntry::new(RESPONSE_MARKER, other)]),
    }
}

/// Extracts the value of configuration `key` from a `GetConfig` reply.
///
/// Unknown keys and missing lines yield an empty string.
#[must_use]
pub fn parse_config_value(key: &str, lines: &[String]) -> String {
    let value = match key {
        "vendorId" => find_line(lines, "vendor id").map(extract_value),
        "version" => find_line(lines, "CEC version").map(extract_value),
        "osd" => find_line(lines, "OSD name").map(quoted_value),
        "language" => find_line(lines, "language").map(quoted_value),
        "powerState" => find_line(lines, "power status").map(extract_value),
        "physicalAddress" => lines
            .iter()
            .find(|line| line.contains("address") && !line.contains("logical address"))
            .map(|line| value_after(line, "address")),
        "logicalAddress" => {
            find_line(lines, "logical address").map(|line| value_after(line, "logical address"))
        }
        _ => None,
    };
    value.unwrap_or_default().to_owned()
}

/// Builds the result for a reply to `payload`.
///
/// An empty reply yields success with the default data for the kind.
#[must_use]
pub fn parse_reply(payload: &CommandPayload, lines: &[String]) -> CommandResult {
    let kind = payload.kind();
    if lines.is_empty() {
        return CommandResult::empty(kind);
    }
    match payload {
        CommandPayload::ListAdapters => CommandResult::success(
            kind,
            ResultData::Adapters {
                names: parse_adapters(lines),
            },
        ),
        CommandPayload::Scan(_) => CommandResult::success(
            kind,
            ResultData::Devices {
                devices: parse_devices(lines),
            },
        ),
        CommandPayload::SendCommand(request) => {
            match parse_send_command(&request.command, lines) {
                Ok(payload) => CommandResult::success(kind, ResultData::SendCommand { payload }),
                Err(error) => CommandResult::failure(kind, error),
            }
        }
        CommandPayload::GetConfig(request) => CommandResult::success(
            kind,
            ResultData::ConfigValue {
                key: request.key.clone(),
                value: parse_config_value(&request.key, lines),
            },
        ),
        CommandPayload::SetConfig(_) => CommandResult::empty(CommandKind::SetConfig),
    }
}
