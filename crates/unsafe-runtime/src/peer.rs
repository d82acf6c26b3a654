//! Native resources bound to managed object lifetime
//!
//! A binding ties one native resource to one managed object. The host's collector
//! reports unreachability by token; [`PeerRegistry::finalize`] then releases the
//! resource with the strategy it was bound with. Tokens are consumed on first use, so
//! each resource is released at most once. There is no ordering between bindings.
//!
//! A resource that is bound must not also be released manually.

use crate::address::NativeAddress;
use crate::heap;
use crate::value::ObjectRef;
use crate::vmem::{self, VmError};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Opaque key handed to the host with each binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerToken(u64);

impl PeerToken {
    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PeerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// How a bound resource is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStrategy {
    /// `heap::free`
    Heap,
    /// `vmem::release` with the region size
    VirtualMemory { size: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerBinding {
    pub object: ObjectRef,
    pub address: NativeAddress,
    pub release: ReleaseStrategy,
    /// External memory held by the object, reported to the collector
    pub size_hint: usize,
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("Host refused a weak persistent handle for object {0:?}")]
    WeakHandleRejected(ObjectRef),

    #[error("Finalizer for {token} failed: {source}")]
    ReleaseFailed {
        token: PeerToken,
        #[source]
        source: VmError,
    },
}

/// Backend that actually frees bound resources
pub trait Releaser: Send + Sync {
    /// # Safety
    ///
    /// `address` must be a live heap buffer not released through any other path.
    unsafe fn free_heap(&self, address: NativeAddress);

    /// # Safety
    ///
    /// `address`/`size` must describe a live region from `vmem::allocate`.
    unsafe fn release_virtual(&self, address: NativeAddress, size: usize) -> Result<(), VmError>;
}

/// Releases through [`heap::free`] and [`vmem::release`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemReleaser;

impl Releaser for SystemReleaser {
    unsafe fn free_heap(&self, address: NativeAddress) {
        heap::free(address);
    }

    unsafe fn release_virtual(&self, address: NativeAddress, size: usize) -> Result<(), VmError> {
        vmem::release(address, size)
    }
}

/// Token → binding table
pub struct PeerRegistry {
    next_token: AtomicU64,
    bindings: Mutex<HashMap<PeerToken, PeerBinding>>,
    releaser: Arc<dyn Releaser>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::with_releaser(Arc::new(SystemReleaser))
    }

    pub fn with_releaser(releaser: Arc<dyn Releaser>) -> Self {
        Self {
            next_token: AtomicU64::new(1),
            bindings: Mutex::new(HashMap::new()),
            releaser,
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<PeerToken, PeerBinding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a binding; the resource now belongs to the registry
    pub fn bind(&self, binding: PeerBinding) -> PeerToken {
        let token = PeerToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(
            %token,
            object = binding.object.0,
            address = %binding.address,
            release = ?binding.release,
            "peer bound"
        );
        self.table().insert(token, binding);
        token
    }

    /// Drop a binding without releasing its resource (used when the host refuses a handle)
    pub fn unbind(&self, token: PeerToken) -> Option<PeerBinding> {
        self.table().remove(&token)
    }

    /// Release the resource bound to `token`
    ///
    /// Returns `Ok(None)` when the token is unknown or was already finalized. A failed
    /// virtual release still consumes the binding.
    pub fn finalize(&self, token: PeerToken) -> Result<Option<PeerBinding>, PeerError> {
        // Take the binding out before releasing so a racing call sees it gone
        let Some(binding) = self.table().remove(&token) else {
            tracing::debug!(%token, "finalize on unknown or consumed peer");
            return Ok(None);
        };

        if binding.address.is_null() {
            return Ok(Some(binding));
        }

        match binding.release {
            ReleaseStrategy::Heap => unsafe { self.releaser.free_heap(binding.address) },
            ReleaseStrategy::VirtualMemory { size } => {
                unsafe { self.releaser.release_virtual(binding.address, size) }.map_err(
                    |source| {
                        tracing::error!(%token, error = %source, "peer finalizer release failed");
                        PeerError::ReleaseFailed { token, source }
                    },
                )?;
            }
        }
        tracing::debug!(%token, address = %binding.address, "peer finalized");
        Ok(Some(binding))
    }

    pub fn get(&self, token: PeerToken) -> Option<PeerBinding> {
        self.table().get(&token).cloned()
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
