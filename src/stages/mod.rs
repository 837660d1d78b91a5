//! The scan pipeline stages, in the order they run.

pub mod deep_scan;
pub mod liveness;
pub mod selector;
pub mod tls_ports;

#[cfg(test)]
pub(crate) mod testing;
