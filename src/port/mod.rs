//! Purpose: Safe, ownership-checked Rust surface over the C ABI boundary.
//! Exports: `Expr`, `Context`, `Value`, `parse`, `make_context`, `make_*` constructors.
//! Role: Public façade; every engine interaction goes through `crate::abi` entry points only.
//! Invariants: Each boundary handle lives in exactly one `Handle` and is released once on drop.
//! Invariants: Failures stay flag-only (`Option` / `bool`); no causes are invented here.
//! Invariants: Façade types hold raw handles and are neither `Send` nor `Sync`.

mod callback;
mod context;
mod expr;
mod fallible;
mod handle;
mod text;
mod tuple;
mod value;

pub use context::{Context, make_context};
pub use expr::{Expr, parse};
pub use value::{Value, make_bool, make_float, make_int, make_string};
