pub mod assessor;
pub mod command;
pub mod toolchain;

pub use assessor::{TlsAssessor, TlsScannerCli};
