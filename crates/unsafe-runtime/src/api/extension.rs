//! Extension state shared by every entry point

use super::args::Args;
use super::table::FunctionId;
use crate::address::NativeAddress;
use crate::error::{BridgeError, BridgeResult};
use crate::fault::{self, FaultError, TerminatingHandler};
use crate::host::{Host, WeakHandle};
use crate::logging;
use crate::peer::{PeerBinding, PeerError, PeerRegistry, PeerToken, Releaser, ReleaseStrategy};
use crate::value::{NativeArguments, ObjectRef};
use std::sync::Arc;
use unsafe_config::{BridgeConfig, ConfigLoader};

/// The loaded extension: host services plus the finalizer registry
pub struct Extension {
    host: Arc<dyn Host>,
    peers: PeerRegistry,
}

impl Extension {
    /// Create an extension without touching process-wide state
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            peers: PeerRegistry::new(),
        }
    }

    pub fn with_releaser(host: Arc<dyn Host>, releaser: Arc<dyn Releaser>) -> Self {
        Self {
            host,
            peers: PeerRegistry::with_releaser(releaser),
        }
    }

    /// Extension load hook: set up logging and the fault guard, then build the extension
    ///
    /// Both are process-wide; a guard installed by an earlier load stays in place.
    pub fn init(host: Arc<dyn Host>, config: &BridgeConfig) -> BridgeResult<Self> {
        if !logging::init(&config.logging) {
            tracing::debug!("tracing subscriber already installed");
        }

        if config.fault.install {
            let handler = TerminatingHandler::new(host.clone(), config.fault.exit_status);
            match fault::install(Box::new(handler)) {
                Ok(()) => {}
                Err(FaultError::AlreadyInstalled) => {
                    tracing::debug!("fault guard already installed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(version = crate::VERSION, "unsafe extension initialized");
        Ok(Self::new(host))
    }

    /// [`Extension::init`] with configuration from the user file and environment
    pub fn load(host: Arc<dyn Host>) -> BridgeResult<Self> {
        let config = ConfigLoader::new().load()?;
        Self::init(host, &config)
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    /// Run one entry point against the host's argument context
    pub fn call(&self, id: FunctionId, args: &mut dyn NativeArguments) -> BridgeResult<()> {
        let mut args = Args::new(id.name(), args);
        let result = (id.entry())(self, &mut args);
        if let Err(e) = &result {
            tracing::debug!(function = id.name(), error = %e, "native call failed");
        }
        result
    }

    /// Resolve `name` and call it
    pub fn invoke(&self, name: &str, args: &mut dyn NativeArguments) -> BridgeResult<()> {
        let id = FunctionId::from_name(name)
            .ok_or_else(|| BridgeError::UnknownFunction(name.to_string()))?;
        self.call(id, args)
    }

    /// Bind `address` to `object` and ask the host for a weak handle carrying the token
    ///
    /// If the host refuses the handle the binding is dropped and the resource stays
    /// with the caller.
    pub fn register_peer(
        &self,
        object: ObjectRef,
        address: NativeAddress,
        release: ReleaseStrategy,
        size_hint: usize,
    ) -> Result<WeakHandle, PeerError> {
        let token = self.peers.bind(PeerBinding {
            object,
            address,
            release,
            size_hint,
        });
        match self.host.new_weak_persistent(object, token, size_hint) {
            Some(handle) => Ok(handle),
            None => {
                self.peers.unbind(token);
                Err(PeerError::WeakHandleRejected(object))
            }
        }
    }

    /// Collector callback for an unreachable peer object
    ///
    /// Release failures have no managed caller, so they go to the host as unhandled
    /// errors.
    pub fn finalize_peer(&self, token: PeerToken) {
        if let Err(e) = self.peers.finalize(token) {
            self.host.report_unhandled(&e.to_string());
        }
    }
}
