//! Test suites for the CEC daemon.

pub(crate) mod support;
