//! Purpose: Parsed expression handle and its typed evaluators.
//! Exports: `Expr`, `parse`.
//! Invariants: Evaluation never mutates the expression; only context callbacks have effects.
use std::fmt;

use super::context::Context;
use super::fallible::Fallible;
use super::handle::{Handle, Release};
use super::text;
use super::value::Value;
use crate::abi::{self, ExprPtr};

struct ExprKind;

impl Release for ExprKind {
    const KIND: &'static str = "expr";
    type Raw = ExprPtr;

    unsafe fn release(raw: ExprPtr) {
        unsafe { abi::drop_expr(raw) }
    }
}

pub struct Expr {
    handle: Handle<ExprKind>,
}

/// Parses `text`; blank or malformed input yields `None`.
pub fn parse(text: &str) -> Option<Expr> {
    Expr::parse(text)
}

impl Expr {
    pub fn parse(text: &str) -> Option<Self> {
        let raw = unsafe { abi::parse(text::borrow(text)) }.into_option()?;
        Some(Self {
            handle: unsafe { Handle::from_raw(raw) },
        })
    }

    fn as_ptr(&self) -> ExprPtr {
        self.handle.get()
    }

    pub fn eval_bool(&self, context: &Context) -> Option<bool> {
        unsafe { abi::eval_bool(self.as_ptr(), context.as_ptr()) }.into_option()
    }

    pub fn eval_int(&self, context: &Context) -> Option<i64> {
        unsafe { abi::eval_int(self.as_ptr(), context.as_ptr()) }.into_option()
    }

    pub fn eval_float(&self, context: &Context) -> Option<f64> {
        unsafe { abi::eval_float(self.as_ptr(), context.as_ptr()) }.into_option()
    }

    pub fn eval_string(&self, context: &Context) -> Option<String> {
        unsafe { abi::eval_string(self.as_ptr(), context.as_ptr()) }
            .into_option()
            .map(|raw| unsafe { text::adopt(raw) })
    }

    /// Evaluates without asserting a result type, e.g. for tuples.
    pub fn eval_value(&self, context: &Context) -> Option<Value> {
        unsafe { Value::adopt(abi::eval_value(self.as_ptr(), context.as_ptr())) }
    }

    pub fn debug_string(&self) -> String {
        unsafe { text::adopt(abi::expr_debug_string(self.as_ptr())) }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}
