use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecError {
    pub tool: String,
    pub args: Vec<String>,
    pub exit_code: Option<i32>,
    pub stderr_tail: String,
    pub duration_ms: u128,
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} exited with status {}", self.tool, code)?,
            None => write!(f, "{} terminated abnormally", self.tool)?,
        }
        if !self.stderr_tail.is_empty() {
            write!(f, ": {}", self.stderr_tail)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum GrinderError {
    #[error("execution failed: {0}")]
    Exec(ExecError),

    #[error("{tool} timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("discovery failure: {0}")]
    Discovery(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid host input: {0}")]
    Input(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GrinderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GrinderError::Timeout { .. })
    }
}
