//! Purpose: Owned engine value (`bool`, `i64`, `f64`, string, tuple) and its constructors.
//! Exports: `Value`, `make_bool`, `make_int`, `make_float`, `make_string`.
//! Invariants: Accessors fail (`None`) on tag mismatch; they never coerce.
use std::fmt;

use super::fallible::Fallible;
use super::handle::{Handle, Release};
use super::{text, tuple};
use crate::abi::{self, ValuePtr, ValuePtrOr};

struct ValueKind;

impl Release for ValueKind {
    const KIND: &'static str = "value";
    type Raw = ValuePtr;

    unsafe fn release(raw: ValuePtr) {
        unsafe { abi::drop_value(raw) }
    }
}

pub struct Value {
    handle: Handle<ValueKind>,
}

impl Value {
    /// # Safety
    /// The caller must own `raw`, a value handle from the boundary.
    pub(crate) unsafe fn from_raw(raw: ValuePtr) -> Self {
        Self {
            handle: unsafe { Handle::from_raw(raw) },
        }
    }

    /// # Safety
    /// `result` must come straight from a boundary call that transfers its value.
    pub(crate) unsafe fn adopt(result: ValuePtrOr) -> Option<Self> {
        result
            .into_option()
            .map(|raw| unsafe { Self::from_raw(raw) })
    }

    pub(crate) fn as_ptr(&self) -> ValuePtr {
        self.handle.get()
    }

    pub(crate) fn into_raw(self) -> ValuePtr {
        self.handle.into_raw()
    }

    pub fn get_bool(&self) -> Option<bool> {
        unsafe { abi::get_bool(self.as_ptr()) }.into_option()
    }

    pub fn get_int(&self) -> Option<i64> {
        unsafe { abi::get_int(self.as_ptr()) }.into_option()
    }

    pub fn get_float(&self) -> Option<f64> {
        unsafe { abi::get_float(self.as_ptr()) }.into_option()
    }

    pub fn get_string(&self) -> Option<String> {
        unsafe { abi::get_string(self.as_ptr()) }
            .into_option()
            .map(|raw| unsafe { text::adopt(raw) })
    }

    /// Elements of a tuple value, each independently owned.
    pub fn get_tuple(&self) -> Option<Vec<Value>> {
        unsafe { abi::get_tuple(self.as_ptr()) }
            .into_option()
            .map(|raw| unsafe { tuple::adopt(raw) })
    }

    pub fn debug_string(&self) -> String {
        unsafe { text::adopt(abi::value_debug_string(self.as_ptr())) }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}

pub fn make_bool(value: bool) -> Value {
    unsafe { Value::from_raw(abi::make_bool(value)) }
}

pub fn make_int(value: i64) -> Value {
    unsafe { Value::from_raw(abi::make_int(value)) }
}

pub fn make_float(value: f64) -> Value {
    unsafe { Value::from_raw(abi::make_float(value)) }
}

pub fn make_string(value: &str) -> Value {
    unsafe { Value::from_raw(abi::make_string(text::borrow(value))) }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        make_bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        make_int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        make_float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        make_string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        make_string(&value)
    }
}
