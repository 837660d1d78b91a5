//! Staged TLS reconnaissance: find live hosts, find their TLS ports, pick one
//! port per host, run a deep TLS assessment against it and keep the report.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod discovery;
pub mod executors;
pub mod pipeline;
pub mod reporters;
pub mod stages;
pub mod ui;
pub mod utils;

pub use crate::config::GlobalConfig;
pub use crate::core::errors::GrinderError;
pub use crate::core::models::{HostInput, HostRecord, Reachability, TargetSelection};
pub use crate::core::registry::HostRegistry;
pub use crate::pipeline::{Pipeline, RunSummary};
