//! Native entry points exposed to the host
//!
//! The host looks a name up with [`FunctionId::from_name`] (or [`resolve`]), then
//! calls [`Extension::call`] with its argument context. Errors come back as
//! [`crate::BridgeError`]; the host raises them according to their
//! [`crate::ErrorKind`].

pub mod args;
pub mod extension;
mod natives;
pub mod table;

pub use args::{Args, HostArg};
pub use extension::Extension;
pub use table::{resolve, FunctionId, NativeFunction};
