//! Boundary between the command queue and the CEC adapter.
//!
//! [`HardwareBoundary`] is the seam the queue worker drives; tests substitute
//! a double and production code uses [`ProcessAdapter`], which talks to an
//! external adapter tool over line-based stdio.

mod process;


pub use self::process::ProcessAdapter;
use crate::error::CecError;
use crate::queue::NativeCommand;

/// Reply produced by the adapter for one native command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareResponse {
    /// Reply lines in the order the adapter produced them.
    Lines(Vec<String>),
    /// The adapter does not implement the command.
    NotImplemented,
}

/// Line-oriented access to a CEC adapter.
///
/// The queue worker calls [`open`](Self::open) once before the first command
/// and [`close`](Self::close) once after the last; calls to
/// [`execute`](Self::execute) are never concurrent.
pub trait HardwareBoundary: Send {
    /// Prepares the adapter for use.
    ///
    /// # Errors
    ///
    /// Returns an error when the adapter cannot be reached.
    fn open(&mut self) -> Result<(), CecError>;

    /// Executes one command and returns its reply.
    ///
    /// # Errors
    ///
    /// Returns an error when the command cannot be delivered or the adapter
    /// does not answer in time.
    fn execute(&mut self, command: &NativeCommand) -> Result<HardwareResponse, CecError>;

    /// Releases the adapter.
    fn close(&mut self);
}
