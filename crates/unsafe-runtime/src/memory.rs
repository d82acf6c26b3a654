//! Typed memory access at `base + offset`
//!
//! Every access is an unchecked, unaligned load or store in host byte order. There is
//! no bounds, alignment or liveness checking: an invalid address is undefined
//! behavior and usually ends in the fault guard.

use crate::address::NativeAddress;

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width value that can be read from or written to raw memory
///
/// `Host` is the host runtime's representation: `i64` for integers, `f64` for floats.
pub trait Scalar: Copy + sealed::Sealed {
    type Host: Copy;

    /// Width in bytes
    const WIDTH: usize = std::mem::size_of::<Self>();

    /// Sign- or zero-extend (integers) or widen (floats) to the host representation
    fn widen(self) -> Self::Host;

    /// Truncate (integers) or round (floats) a host value to this width
    fn narrow(host: Self::Host) -> Self;
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                type Host = i64;

                #[inline]
                fn widen(self) -> i64 {
                    self as i64
                }

                #[inline]
                fn narrow(host: i64) -> Self {
                    host as $ty
                }
            }
        )*
    };
}

int_scalar!(i8, i16, i32, i64, u8, u16, u32, u64);

impl sealed::Sealed for f32 {}

impl Scalar for f32 {
    type Host = f64;

    #[inline]
    fn widen(self) -> f64 {
        self as f64
    }

    #[inline]
    fn narrow(host: f64) -> Self {
        host as f32
    }
}

impl sealed::Sealed for f64 {}

impl Scalar for f64 {
    type Host = f64;

    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn narrow(host: f64) -> Self {
        host
    }
}

/// Read a `T` at `base + offset`
///
/// # Safety
///
/// `base + offset .. base + offset + size_of::<T>()` must be mapped and readable.
#[inline]
pub unsafe fn read<T: Scalar>(base: NativeAddress, offset: i64) -> T {
    std::ptr::read_unaligned(base.offset(offset).as_ptr::<T>())
}

/// Write a `T` at `base + offset`
///
/// # Safety
///
/// `base + offset .. base + offset + size_of::<T>()` must be mapped and writable.
#[inline]
pub unsafe fn write<T: Scalar>(base: NativeAddress, offset: i64, value: T) {
    std::ptr::write_unaligned(base.offset(offset).as_mut_ptr::<T>(), value)
}

/// Read a `T` and widen it to the host representation
///
/// # Safety
///
/// Same contract as [`read`].
#[inline]
pub unsafe fn read_host<T: Scalar>(base: NativeAddress, offset: i64) -> T::Host {
    read::<T>(base, offset).widen()
}

/// Narrow a host value to `T` and write it
///
/// # Safety
///
/// Same contract as [`write`].
#[inline]
pub unsafe fn write_host<T: Scalar>(base: NativeAddress, offset: i64, value: T::Host) {
    write::<T>(base, offset, T::narrow(value))
}
