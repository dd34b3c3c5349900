//! Purpose: Marshal host closures into boundary `Closure`s and run them when the engine calls back.
//! Exports: `Registration`, `HostFn` (crate-internal).
//! Role: Callback bridge; the only place a capture token is issued or resolved.
//! Invariants: A capture token is an index into a thread-local registry, never an address.
//! Invariants: Tokens start at 1 and are never reused; an unknown token fails the call.
//! Invariants: Host panics and declines both become `ok == false`; nothing unwinds into the engine.
use std::cell::RefCell;
use std::collections::HashMap;
use std::mem::ManuallyDrop;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::value::Value;
use crate::abi::{Capture, Closure, ValuePtr, ValuePtrOr};

pub(crate) type HostFn = Rc<dyn Fn(&Value) -> Option<Value>>;

#[derive(Default)]
struct Registry {
    last_token: usize,
    functions: HashMap<usize, HostFn>,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

fn lookup(token: usize) -> Option<HostFn> {
    REGISTRY
        .try_with(|registry| registry.borrow().functions.get(&token).cloned())
        .ok()
        .flatten()
}

/// Keeps one host function callable through its token for as long as it lives.
pub(crate) struct Registration {
    token: usize,
}

impl Registration {
    pub(crate) fn new(function: HostFn) -> Self {
        let token = REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            registry.last_token += 1;
            let token = registry.last_token;
            registry.functions.insert(token, function);
            token
        });
        Self { token }
    }

    pub(crate) fn closure(&self) -> Closure {
        Closure::new(trampoline, Capture::new(self.token))
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> usize {
        self.token
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        // Dropped outside the borrow: the closure's captures may own other registrations.
        let token = self.token;
        let removed = REGISTRY
            .try_with(|registry| registry.borrow_mut().functions.remove(&token))
            .ok()
            .flatten();
        drop(removed);
    }
}

unsafe extern "C" fn trampoline(argument: ValuePtr, capture: Capture) -> ValuePtrOr {
    let Some(function) = lookup(capture.addr()) else {
        tracing::debug!(token = capture.addr(), "callback token is not registered");
        return ValuePtrOr::none();
    };
    // The engine keeps ownership of `argument` for the duration of the call.
    let argument = ManuallyDrop::new(unsafe { Value::from_raw(argument) });
    match panic::catch_unwind(AssertUnwindSafe(|| function(&*argument))) {
        Ok(Some(result)) => ValuePtrOr::some(result.into_raw()),
        Ok(None) => {
            tracing::debug!(token = capture.addr(), "host function declined");
            ValuePtrOr::none()
        }
        Err(_) => {
            tracing::debug!(token = capture.addr(), "host function panicked");
            ValuePtrOr::none()
        }
    }
}
