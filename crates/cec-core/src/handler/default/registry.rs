//! Adapter and device registries owned by the default handler.

use std::sync::{Mutex, MutexGuard};

use crate::command::CecDevice;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

/// Live adapter and device state. Each registry has its own lock, held only
/// for a single read or replace.
#[derive(Debug, Default)]
pub(super) struct Registry {
    adapters: Mutex<Vec<String>>,
    devices: Mutex<Vec<CecDevice>>,
}

impl Registry {
    pub(super) fn has_adapter(&self, name: &str) -> bool {
        lock(&self.adapters).iter().any(|adapter| adapter == name)
    }

    pub(super) fn adapters(&self) -> Vec<String> {
        lock(&self.adapters).clone()
    }

    /// Replaces the adapter list wholesale.
    pub(super) fn replace_adapters(&self, names: &[String]) {
        names.clone_into(&mut lock(&self.adapters));
    }

    pub(super) fn device(&self, address: &str) -> Option<CecDevice> {
        lock(&self.devices)
            .iter()
            .find(|device| device.address == address)
            .cloned()
    }

    pub(super) fn devices(&self) -> Vec<CecDevice> {
        lock(&self.devices).clone()
    }

    /// Erases any record sharing an address with a scanned device, then
    /// appends the scanned device.
    pub(super) fn merge_devices(&self, scanned: &[CecDevice]) {
        let mut devices = lock(&self.devices);
        for device in scanned {
            devices.retain(|known| known.address != device.address);
            devices.push(device.clone());
        }
    }
}
