//! Errors surfaced to the host runtime
//!
//! Sentinel failures (null addresses) never reach this type. Everything here is
//! raised in the managed runtime: argument mistakes as an `ArgumentError`, OS
//! failures as an unhandled-exception error.

use crate::fault::FaultError;
use crate::library::LoadError;
use crate::peer::PeerError;
use crate::value::ArgumentError;
use crate::vmem::VmError;
use thiserror::Error;
use unsafe_config::ConfigError;

/// How the host should raise a [`BridgeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Thrown as the host's `ArgumentError(message)`
    Argument,
    /// Propagated as an unhandled-exception error
    Unhandled,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    VirtualMemory(#[from] VmError),

    #[error(transparent)]
    Fault(#[from] FaultError),

    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown native function: {0}")]
    UnknownFunction(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Argument(_) => ErrorKind::Argument,
            _ => ErrorKind::Unhandled,
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
