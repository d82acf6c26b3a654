//! Unsafe Runtime - native capabilities for a managed host
//!
//! This library gives code running in a garbage-collected runtime direct access to:
//! - Heap and page-granular virtual memory, with typed reads and writes
//! - Shared libraries and their exported symbols
//! - Foreign calls through libffi call interfaces
//! - Native resources released when their managed owner is collected
//! - A SIGSEGV guard that reports and terminates instead of crashing silently
//!
//! Nothing here validates addresses. The managed caller carries the full burden of
//! memory safety.

/// Unsafe runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod address;
pub mod api;
pub mod error;
pub mod fault;
pub mod ffi;
pub mod heap;
pub mod host;
pub mod library;
pub mod logging;
pub mod memory;
pub mod peer;
pub mod platform;
pub mod value;
pub mod vmem;

// Re-export commonly used types
pub use address::{LibraryHandle, NativeAddress};
pub use api::{Extension, FunctionId};
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use host::{Host, WeakHandle};
pub use peer::{PeerToken, ReleaseStrategy};
pub use value::{ArgumentError, CallArgs, NativeArguments, ObjectRef, Value};
pub use vmem::ProtectionMode;
