//! Foreign function invocation through libffi
//!
//! The invoker holds no compiled-in knowledge of the libffi it drives: every call
//! takes the address of the libffi routine to use (resolved with
//! [`crate::library::symbol`], or taken from the statically linked copy via
//! [`LibffiRoutines::linked`]) plus raw buffers owned by the caller.
//!
//! # Safety
//!
//! A CIF must be prepared before use and describe the exact signature of the function
//! it later calls. Mismatches are undefined behavior at the native call boundary.

pub mod invoke;
pub mod linked;

pub use invoke::{call, prep_cif, prep_cif_var, FfiAbi, FfiStatus};
pub use linked::{linked_symbol, LibffiRoutines, CIF_SIZE};
