//! Purpose: Mutable binding table (variables and host functions) that expressions evaluate against.
//! Exports: `Context`, `make_context`.
//! Role: Owns the context handle plus one callback registration per bound function name.
//! Invariants: Registrations outlive the engine context (field order drops the handle first).
//! Invariants: Rebinding a name overwrites it; the engine rejects changing a variable's type.
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::callback::{HostFn, Registration};
use super::handle::{Handle, Release};
use super::text;
use super::value::Value;
use crate::abi::{self, ContextMutPtr, ContextPtr};

struct ContextKind;

impl Release for ContextKind {
    const KIND: &'static str = "context";
    type Raw = ContextMutPtr;

    unsafe fn release(raw: ContextMutPtr) {
        unsafe { abi::drop_context(raw) }
    }
}

pub struct Context {
    handle: Handle<ContextKind>,
    functions: HashMap<String, Registration>,
}

pub fn make_context() -> Context {
    Context::new()
}

impl Context {
    pub fn new() -> Self {
        Self {
            handle: unsafe { Handle::from_raw(abi::make_context()) },
            functions: HashMap::new(),
        }
    }

    pub(crate) fn as_ptr(&self) -> ContextPtr {
        self.handle.get().cast_const()
    }

    fn as_mut_ptr(&mut self) -> ContextMutPtr {
        self.handle.get()
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        unsafe { abi::set_bool(self.as_mut_ptr(), text::borrow(name), value) }
    }

    pub fn set_int(&mut self, name: &str, value: i64) -> bool {
        unsafe { abi::set_int(self.as_mut_ptr(), text::borrow(name), value) }
    }

    pub fn set_float(&mut self, name: &str, value: f64) -> bool {
        unsafe { abi::set_float(self.as_mut_ptr(), text::borrow(name), value) }
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> bool {
        unsafe { abi::set_string(self.as_mut_ptr(), text::borrow(name), text::borrow(value)) }
    }

    /// Binds an existing value; the context takes it over whether or not binding succeeds.
    pub fn set_value(&mut self, name: &str, value: Value) -> bool {
        unsafe { abi::set_value(self.as_mut_ptr(), text::borrow(name), value.into_raw()) }
    }

    /// Binds `function` as a callable named `name`.
    ///
    /// The engine passes the call's single argument (a tuple for several arguments) and
    /// treats `None` as a failed evaluation of the enclosing expression.
    pub fn set_function<F>(&mut self, name: &str, function: F) -> bool
    where
        F: Fn(&Value) -> Option<Value> + 'static,
    {
        let function: HostFn = Rc::new(function);
        let registration = Registration::new(function);
        let closure = registration.closure();
        let bound = unsafe { abi::set_function(self.as_mut_ptr(), text::borrow(name), closure) };
        if bound {
            self.functions.insert(name.to_string(), registration);
        }
        bound
    }

    /// Copy of the value currently bound to `name`.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        unsafe { Value::adopt(abi::context_get_value(self.as_ptr(), text::borrow(name))) }
    }

    pub fn debug_string(&self) -> String {
        unsafe { text::adopt(abi::context_debug_string(self.as_ptr())) }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}
