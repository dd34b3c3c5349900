// Tuple bridge: engine-owned `TupleSlice` into an ordered `Vec<Value>`.
use std::ptr;

use super::handle::{Handle, Release};
use super::value::Value;
use crate::abi::{self, TupleSlice};

pub(crate) struct OwnedTuple;

impl Release for OwnedTuple {
    const KIND: &'static str = "owned-tuple";
    type Raw = TupleSlice;

    unsafe fn release(raw: TupleSlice) {
        unsafe { abi::drop_tuple_slice(raw) }
    }
}

/// Moves every element out of `raw` in index order, then releases the (now empty) slice.
///
/// Each slot is nulled as its handle moves into a `Value`, so releasing the slice never
/// touches an element a `Value` already owns.
///
/// # Safety
/// `raw` must be a live `TupleSlice` returned by the boundary and owned by the caller.
pub(crate) unsafe fn adopt(raw: TupleSlice) -> Vec<Value> {
    let mut slice = unsafe { Handle::<OwnedTuple>::from_raw(raw) };
    let slots = unsafe { slice.as_raw_mut().slots_mut() };
    slots
        .iter_mut()
        .map(|slot| {
            let raw = std::mem::replace(slot, ptr::null());
            unsafe { Value::from_raw(raw) }
        })
        .collect()
}
