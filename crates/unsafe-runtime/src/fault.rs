//! Segmentation fault guard
//!
//! A process-wide SIGSEGV handler that hands the fault to an installed
//! [`FaultHandler`]. The stock [`TerminatingHandler`] reports "Segmentation fault" to
//! the host and exits with status 139. The process is never resumed: once the
//! handler returns, the default disposition is restored so a re-executed faulting
//! instruction kills the process.

use crate::host::Host;
use std::io;
use std::os::raw::c_int;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Message reported to the host for a segmentation fault
pub const SEGFAULT_MESSAGE: &str = "Segmentation fault";

pub const SIGSEGV: i32 = libc::SIGSEGV;

static HANDLER: OnceLock<Box<dyn FaultHandler>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum FaultError {
    #[error("Fault guard is already installed")]
    AlreadyInstalled,

    #[error("Failed to install SIGSEGV handler: {0}")]
    InstallFailed(#[source] io::Error),
}

/// What to do when the process receives SIGSEGV
///
/// Runs in signal context. Implementations should avoid locks and allocation where
/// they can; the process state is not guaranteed to be usable.
pub trait FaultHandler: Send + Sync + 'static {
    fn on_fault(&self, signal: i32);
}

/// Report to the host, then terminate with a fixed status
pub struct TerminatingHandler {
    host: Arc<dyn Host>,
    exit_status: i32,
}

impl TerminatingHandler {
    pub fn new(host: Arc<dyn Host>, exit_status: i32) -> Self {
        Self { host, exit_status }
    }
}

impl FaultHandler for TerminatingHandler {
    fn on_fault(&self, signal: i32) {
        self.host.report_unhandled(SEGFAULT_MESSAGE);
        restore_default(signal);
        std::process::exit(self.exit_status);
    }
}

/// Install `handler` and register it for SIGSEGV. Only the first successful call wins.
///
/// A failed OS registration leaves the guard uninstalled, so the call can be retried.
pub fn install(handler: Box<dyn FaultHandler>) -> Result<(), FaultError> {
    install_with(handler, || platform::register(on_signal))
}

fn install_with(
    handler: Box<dyn FaultHandler>,
    register: impl FnOnce() -> io::Result<()>,
) -> Result<(), FaultError> {
    if HANDLER.get().is_some() {
        return Err(FaultError::AlreadyInstalled);
    }
    // An OS handler with no installed strategy only restores the default disposition
    register().map_err(FaultError::InstallFailed)?;
    HANDLER
        .set(handler)
        .map_err(|_| FaultError::AlreadyInstalled)?;
    tracing::debug!("fault guard installed");
    Ok(())
}

pub fn is_installed() -> bool {
    HANDLER.get().is_some()
}

/// Run the installed handler for `signal` as the signal handler would
///
/// Returns `false` if no handler is installed.
pub fn dispatch(signal: i32) -> bool {
    match HANDLER.get() {
        Some(handler) => {
            handler.on_fault(signal);
            true
        }
        None => false,
    }
}

extern "C" fn on_signal(signum: c_int) {
    dispatch(signum);
    restore_default(signum);
}

fn restore_default(signal: i32) {
    unsafe {
        libc::signal(signal, libc::SIG_DFL);
    }
}

#[cfg(unix)]
mod platform {
    use super::*;

    pub(super) fn register(handler: extern "C" fn(c_int)) -> io::Result<()> {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handler as libc::sighandler_t;
            action.sa_flags = libc::SA_ONSTACK;
            libc::sigemptyset(&mut action.sa_mask);
            if libc::sigaction(libc::SIGSEGV, &action, std::ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

#[cfg(windows)]
mod platform {
    use super::*;

    pub(super) fn register(handler: extern "C" fn(c_int)) -> io::Result<()> {
        let previous = unsafe { libc::signal(libc::SIGSEGV, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR as libc::sighandler_t {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
