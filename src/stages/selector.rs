use crate::core::models::{HostRecord, TargetSelection};
use crate::core::registry::HostRegistry;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;

pub const HTTPS_PORT: u16 = 443;
pub const HTTPS_ALT_PORT: u16 = 8443;

/// Picks the single port to assess on `host`. Never fails: hosts without
/// any usable port information fall back to 443 even if it was not seen open.
pub fn select_port<R: Rng + ?Sized>(host: &HostRecord, rng: &mut R) -> u16 {
    if !host.tls_ports.is_empty() {
        return preferred(&host.tls_ports).unwrap_or_else(|| random_port(&host.tls_ports, rng));
    }
    if !host.open_ports.is_empty() {
        return preferred(&host.open_ports).unwrap_or(HTTPS_PORT);
    }
    HTTPS_PORT
}

fn preferred(ports: &BTreeSet<u16>) -> Option<u16> {
    [HTTPS_PORT, HTTPS_ALT_PORT]
        .into_iter()
        .find(|port| ports.contains(port))
}

fn random_port<R: Rng + ?Sized>(ports: &BTreeSet<u16>, rng: &mut R) -> u16 {
    let candidates: Vec<u16> = ports.iter().copied().collect();
    candidates.choose(rng).copied().unwrap_or(HTTPS_PORT)
}

/// One port per online host, in registry order.
pub fn select_targets<R: Rng + ?Sized>(registry: &HostRegistry, rng: &mut R) -> TargetSelection {
    registry
        .iter()
        .filter(|host| host.is_online())
        .map(|host| {
            let port = select_port(host, &mut *rng);
            tracing::debug!("Selected {}:{}", host.address, port);
            (host.address.clone(), port)
        })
        .collect()
}
