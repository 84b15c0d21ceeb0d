use serde::Serialize;

/// A device discovered on the CEC bus.
///
/// Devices are identified by their logical [`address`](Self::address); a
/// later scan replaces the record for an address wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CecDevice {
    /// Device type reported by the adapter, e.g. `TV`.
    pub name: String,
    /// Logical CEC address as a numeric string.
    pub address: String,
    /// Active-source state.
    pub active_source: String,
    /// Vendor name or id.
    pub vendor: String,
    /// OSD name.
    pub osd: String,
    /// CEC protocol version.
    pub cec_version: String,
    /// Power status.
    pub power_status: String,
    /// Menu language.
    pub language: String,
}

impl CecDevice {
    /// Returns `true` when the address is purely numeric.
    #[must_use]
    pub fn has_logical_address(&self) -> bool {
        self.address.chars().all(|character| character.is_ascii_digit())
    }
}
