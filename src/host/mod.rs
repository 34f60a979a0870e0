//! Host provisioning helpers
//!
//! Independent, non-transactional routines that install OS packages and
//! build libbpf from source. Each assumes root privilege; a failing step
//! aborts the routine and leaves earlier steps applied.

use thiserror::Error;

use crate::exec::ExecError;

pub mod libbpf;
pub mod packages;

/// Errors that can occur during host provisioning
#[derive(Error, Debug)]
pub enum HostError {
    #[error("command failed: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported container engine '{0}'")]
    UnsupportedEngine(String),
}
