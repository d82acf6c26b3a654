//! Services the embedding runtime provides to the bridge

use crate::peer::PeerToken;
use crate::value::ObjectRef;

/// Weak persistent handle created by the host, returned to managed code as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakHandle(pub u64);

/// Host runtime primitives the bridge calls into
pub trait Host: Send + Sync {
    /// Attach a finalizer to `object` without keeping it alive
    ///
    /// When the collector finds `object` unreachable the host must call
    /// [`crate::api::Extension::finalize_peer`] with `token`, exactly once.
    /// `size_hint` is external memory held by the object, for collection pressure.
    /// Returns `None` if the host could not create the handle.
    fn new_weak_persistent(
        &self,
        object: ObjectRef,
        token: PeerToken,
        size_hint: usize,
    ) -> Option<WeakHandle>;

    /// Report an unhandled error outside normal call flow (finalizers, faults)
    fn report_unhandled(&self, message: &str);
}
