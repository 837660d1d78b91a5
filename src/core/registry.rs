use super::models::{HostInput, HostRecord, Reachability};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Owned, input-ordered collection of every host taking part in a run.
/// Each pipeline stage receives it by reference and only touches the
/// fields it owns.
#[derive(Debug, Default, Serialize)]
pub struct HostRegistry {
    hosts: Vec<HostRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl HostRegistry {
    /// Builds the registry. Duplicate addresses keep their first occurrence.
    pub fn new<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = HostInput>,
    {
        let mut registry = Self::default();
        for input in inputs {
            if registry.index.contains_key(&input.ip) {
                tracing::debug!("Ignoring duplicate host {}", input.ip);
                continue;
            }
            registry.index.insert(input.ip.clone(), registry.hosts.len());
            registry.hosts.push(HostRecord::new(input));
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&HostRecord> {
        self.index.get(address).map(|&i| &self.hosts[i])
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut HostRecord> {
        match self.index.get(address) {
            Some(&i) => Some(&mut self.hosts[i]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostRecord> {
        self.hosts.iter()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.address.clone()).collect()
    }

    /// Tags every host online or offline. Nothing is left `Unknown`.
    pub fn apply_liveness(&mut self, alive: &HashSet<String>) {
        for host in &mut self.hosts {
            host.reachability = if alive.contains(&host.address) {
                Reachability::Online
            } else {
                Reachability::Offline
            };
        }
    }

    /// Online hosts in input order.
    pub fn online_addresses(&self) -> Vec<String> {
        self.hosts
            .iter()
            .filter(|h| h.is_online())
            .map(|h| h.address.clone())
            .collect()
    }

    pub fn count(&self, reachability: Reachability) -> usize {
        self.hosts
            .iter()
            .filter(|h| h.reachability == reachability)
            .count()
    }
}
