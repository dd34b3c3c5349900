// String bridge between host `&str`/`String` and boundary text structs.
use super::handle::{Handle, Release};
use crate::abi::{self, BorrowedString, OwnedString};

pub(crate) struct OwnedText;

impl Release for OwnedText {
    const KIND: &'static str = "owned-text";
    type Raw = OwnedString;

    unsafe fn release(raw: OwnedString) {
        unsafe { abi::drop_string_view(raw) }
    }
}

/// View of `text` for one boundary call; the lifetime keeps it from outliving `text`.
pub(crate) fn borrow(text: &str) -> BorrowedString<'_> {
    BorrowedString::new(text)
}

/// Copies an engine-owned buffer into a host `String` and releases the buffer.
///
/// # Safety
/// `raw` must be a live `OwnedString` returned by the boundary and owned by the caller.
pub(crate) unsafe fn adopt(raw: OwnedString) -> String {
    let owned = unsafe { Handle::<OwnedText>::from_raw(raw) };
    let bytes = unsafe { owned.as_raw().as_bytes() };
    String::from_utf8_lossy(bytes).into_owned()
}
