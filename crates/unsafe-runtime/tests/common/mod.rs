//! Shared test utilities
//!
//! A recording [`Host`] and helpers for driving entry points by name.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use unsafe_runtime::address::NativeAddress;
use unsafe_runtime::host::{Host, WeakHandle};
use unsafe_runtime::peer::{PeerToken, Releaser};
use unsafe_runtime::vmem::VmError;
use unsafe_runtime::{BridgeResult, CallArgs, Extension, ObjectRef, Value};

/// Host that records weak handles and unhandled reports
#[derive(Default)]
pub struct TestHost {
    next_handle: AtomicU64,
    weak: Mutex<Vec<(ObjectRef, PeerToken, usize)>>,
    reports: Mutex<Vec<String>>,
    pub refuse_handles: bool,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            refuse_handles: true,
            ..Default::default()
        })
    }

    /// Tokens handed out for `object`, oldest first
    pub fn tokens_for(&self, object: ObjectRef) -> Vec<PeerToken> {
        self.weak
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _, _)| *o == object)
            .map(|(_, t, _)| *t)
            .collect()
    }

    pub fn size_hints(&self) -> Vec<usize> {
        self.weak.lock().unwrap().iter().map(|(_, _, s)| *s).collect()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }

    /// Simulate the collector finding `object` unreachable
    pub fn collect(&self, ext: &Extension, object: ObjectRef) {
        let tokens: Vec<PeerToken> = {
            let mut weak = self.weak.lock().unwrap();
            let (dead, live): (Vec<_>, Vec<_>) = weak.drain(..).partition(|(o, _, _)| *o == object);
            *weak = live;
            dead.into_iter().map(|(_, t, _)| t).collect()
        };
        for token in tokens {
            ext.finalize_peer(token);
        }
    }
}

impl Host for TestHost {
    fn new_weak_persistent(
        &self,
        object: ObjectRef,
        token: PeerToken,
        size_hint: usize,
    ) -> Option<WeakHandle> {
        if self.refuse_handles {
            return None;
        }
        self.weak.lock().unwrap().push((object, token, size_hint));
        Some(WeakHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn report_unhandled(&self, message: &str) {
        self.reports.lock().unwrap().push(message.to_string());
    }
}

/// Releaser that only counts, so fake addresses can be bound safely
#[derive(Default)]
pub struct CountingReleaser {
    pub heap_frees: AtomicUsize,
    pub virtual_releases: AtomicUsize,
    pub fail_virtual: bool,
}

impl CountingReleaser {
    pub fn heap_frees(&self) -> usize {
        self.heap_frees.load(Ordering::SeqCst)
    }

    pub fn virtual_releases(&self) -> usize {
        self.virtual_releases.load(Ordering::SeqCst)
    }
}

impl Releaser for CountingReleaser {
    unsafe fn free_heap(&self, _address: NativeAddress) {
        self.heap_frees.fetch_add(1, Ordering::SeqCst);
    }

    unsafe fn release_virtual(&self, address: NativeAddress, size: usize) -> Result<(), VmError> {
        self.virtual_releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_virtual {
            return Err(VmError::ReleaseFailed {
                address,
                size,
                source: std::io::Error::from_raw_os_error(22),
            });
        }
        Ok(())
    }
}

/// Call `name` with `args` and return the value it set
pub fn call(ext: &Extension, name: &str, args: Vec<Value>) -> BridgeResult<Value> {
    let mut call_args = CallArgs::new(args);
    ext.invoke(name, &mut call_args)?;
    Ok(call_args.into_return_value())
}

/// Call `name` and unwrap its integer return value
pub fn call_int(ext: &Extension, name: &str, args: Vec<Value>) -> i64 {
    match call(ext, name, args) {
        Ok(Value::Int(n)) => n,
        other => panic!("{} returned {:?}, expected an int", name, other),
    }
}

pub fn int(n: i64) -> Value {
    Value::Int(n)
}
