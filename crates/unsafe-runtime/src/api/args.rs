//! Typed argument extraction for entry points
//!
//! Wraps the host's positional [`NativeArguments`] with getters that turn a missing
//! or mistyped argument into an [`ArgumentError`] naming the function and position.

use crate::address::{LibraryHandle, NativeAddress};
use crate::ffi::FfiAbi;
use crate::value::{ArgumentError, NativeArguments, ObjectRef, Value};
use crate::vmem::ProtectionMode;

pub struct Args<'a> {
    function: &'static str,
    inner: &'a mut dyn NativeArguments,
}

impl<'a> Args<'a> {
    pub fn new(function: &'static str, inner: &'a mut dyn NativeArguments) -> Self {
        Self { function, inner }
    }

    /// Host-facing name of the function being called
    pub fn function(&self) -> &'static str {
        self.function
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> ArgumentError {
        if index >= self.inner.arg_count() {
            ArgumentError::Missing {
                function: self.function,
                index,
            }
        } else {
            ArgumentError::WrongType {
                function: self.function,
                index,
                expected,
                actual: self.inner.type_name(index),
            }
        }
    }

    fn out_of_range(&self, index: usize, reason: impl Into<String>) -> ArgumentError {
        ArgumentError::OutOfRange {
            function: self.function,
            index,
            reason: reason.into(),
        }
    }

    pub fn int(&self, index: usize) -> Result<i64, ArgumentError> {
        self.inner
            .integer(index)
            .ok_or_else(|| self.mismatch(index, "int"))
    }

    pub fn double(&self, index: usize) -> Result<f64, ArgumentError> {
        self.inner
            .double(index)
            .ok_or_else(|| self.mismatch(index, "double"))
    }

    pub fn string(&self, index: usize) -> Result<String, ArgumentError> {
        self.inner
            .string(index)
            .ok_or_else(|| self.mismatch(index, "string"))
    }

    pub fn object(&self, index: usize) -> Result<ObjectRef, ArgumentError> {
        self.inner
            .object(index)
            .ok_or_else(|| self.mismatch(index, "object"))
    }

    pub fn address(&self, index: usize) -> Result<NativeAddress, ArgumentError> {
        self.int(index).map(NativeAddress::from_host)
    }

    pub fn library(&self, index: usize) -> Result<LibraryHandle, ArgumentError> {
        self.address(index).map(LibraryHandle::from_address)
    }

    /// Non-negative byte count
    pub fn size(&self, index: usize) -> Result<usize, ArgumentError> {
        let value = self.int(index)?;
        if value < 0 {
            return Err(ArgumentError::Negative {
                function: self.function,
                index,
                value,
            });
        }
        usize::try_from(value)
            .map_err(|_| self.out_of_range(index, format!("{} does not fit in a size", value)))
    }

    /// Non-negative count passed to C as `unsigned int`
    pub fn count(&self, index: usize) -> Result<u32, ArgumentError> {
        let value = self.size(index)?;
        u32::try_from(value)
            .map_err(|_| self.out_of_range(index, format!("{} exceeds {}", value, u32::MAX)))
    }

    /// libffi calling convention; values that do not fit `ffi_abi` are rejected here,
    /// anything else is left for `ffi_prep_cif` to judge
    pub fn abi(&self, index: usize) -> Result<FfiAbi, ArgumentError> {
        let value = self.int(index)?;
        FfiAbi::try_from(value)
            .map_err(|_| self.out_of_range(index, format!("ABI {} does not fit in ffi_abi", value)))
    }

    /// String handed to C, so it may not contain NUL
    pub fn c_name(&self, index: usize) -> Result<String, ArgumentError> {
        let name = self.string(index)?;
        if name.contains('\0') {
            return Err(self.out_of_range(index, "contains an interior NUL byte"));
        }
        Ok(name)
    }

    pub fn mode(&self, index: usize) -> Result<ProtectionMode, ArgumentError> {
        let value = self.int(index)?;
        ProtectionMode::from_host(value).ok_or_else(|| {
            self.out_of_range(
                index,
                format!("protection mode {} is not one of 0..=4", value),
            )
        })
    }

    /// Set the call's return value
    pub fn ret(&mut self, value: impl Into<Value>) {
        self.inner.set_return(value.into());
    }
}

/// Host representation a memory write takes its value from
pub trait HostArg: Sized + Into<Value> {
    fn from_args(args: &Args<'_>, index: usize) -> Result<Self, ArgumentError>;
}

impl HostArg for i64 {
    fn from_args(args: &Args<'_>, index: usize) -> Result<Self, ArgumentError> {
        args.int(index)
    }
}

impl HostArg for f64 {
    fn from_args(args: &Args<'_>, index: usize) -> Result<Self, ArgumentError> {
        args.double(index)
    }
}
