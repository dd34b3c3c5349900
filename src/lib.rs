//! Purpose: Ownership-safe access to an opaque expression engine across a C-compatible boundary.
//! Exports: `abi` (C entry points + plain-data structs), `port` (safe façade), `error`.
//! Role: Library behind the `exprport` CLI and the `libexprport` cdylib/staticlib for C hosts.
//! Invariants: `port` reaches the engine only through `abi` entry points.
//! Invariants: Every boundary handle is released exactly once via its paired `drop_*`.
pub mod abi;
pub mod error;
pub mod port;

pub use port::{
    Context, Expr, Value, make_bool, make_context, make_float, make_int, make_string, parse,
};
