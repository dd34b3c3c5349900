//! Purpose: C ABI boundary over the expression engine (libexprport).
//! Exports: `#[repr(C)]` plain-data structs plus parse/make/set/get/eval/debug/drop entry points.
//! Role: The only code that touches engine types; hosts (C, C++, `crate::port`) see opaque handles.
//! Invariants: Every allocating entry point has exactly one paired `drop_*`; `drop_*` accept null.
//! Invariants: Failures are flag-only (`ok == false`); no message or code crosses the boundary.
//! Invariants: Inbound text is borrowed for the duration of the call and validated as UTF-8.
//! Notes: Struct layouts are mirrored by `include/exprport.h`; keep both in sync.
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr;

use evalexpr::{
    Context as _, ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprError,
    EvalexprResult, Function, HashMapContext, Node, Value,
};

#[repr(C)]
pub struct RawExpr {
    _private: [u8; 0],
}

#[repr(C)]
pub struct RawValue {
    _private: [u8; 0],
}

#[repr(C)]
pub struct RawContext {
    _private: [u8; 0],
}

pub type ExprPtr = *const RawExpr;
pub type ValuePtr = *const RawValue;
pub type ContextPtr = *const RawContext;
pub type ContextMutPtr = *mut RawContext;

/// Read-only view of caller-owned text, valid only for the call it is passed to.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct BorrowedString<'a> {
    data: *const u8,
    length: usize,
    _borrow: PhantomData<&'a [u8]>,
}

impl<'a> BorrowedString<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            data: text.as_ptr(),
            length: text.len(),
            _borrow: PhantomData,
        }
    }

    /// # Safety
    /// `data` must point at `length` readable bytes that stay alive for `'a`.
    unsafe fn bytes(&self) -> &'a [u8] {
        if self.data.is_null() || self.length == 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.data, self.length) }
    }

    unsafe fn to_str(&self) -> Option<&'a str> {
        std::str::from_utf8(unsafe { self.bytes() }).ok()
    }
}

/// Text buffer allocated by the engine; released with `drop_string_view`.
#[repr(C)]
pub struct OwnedString {
    data: *mut u8,
    length: usize,
    capacity: usize,
}

impl OwnedString {
    pub const fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            length: 0,
            capacity: 0,
        }
    }

    /// # Safety
    /// `self` must come from the boundary and not have been released yet.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() || self.length == 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.data, self.length) }
    }

    unsafe fn into_string(self) -> Option<String> {
        if self.data.is_null() {
            return None;
        }
        Some(unsafe {
            String::from_raw_parts(self.data, self.length, self.capacity)
        })
    }
}

impl From<String> for OwnedString {
    fn from(text: String) -> Self {
        let mut text = ManuallyDrop::new(text);
        Self {
            data: text.as_mut_ptr(),
            length: text.len(),
            capacity: text.capacity(),
        }
    }
}

/// Array of value handles allocated by the engine; released with `drop_tuple_slice`.
#[repr(C)]
pub struct TupleSlice {
    data: *mut ValuePtr,
    length: usize,
    capacity: usize,
}

impl TupleSlice {
    pub const fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            length: 0,
            capacity: 0,
        }
    }

    /// Element slots in index order. A slot set to null is skipped by `drop_tuple_slice`.
    ///
    /// # Safety
    /// `self` must come from the boundary and not have been released yet.
    pub unsafe fn slots_mut(&mut self) -> &mut [ValuePtr] {
        if self.data.is_null() || self.length == 0 {
            return &mut [];
        }
        unsafe { std::slice::from_raw_parts_mut(self.data, self.length) }
    }
}

impl From<Vec<ValuePtr>> for TupleSlice {
    fn from(items: Vec<ValuePtr>) -> Self {
        let mut items = ManuallyDrop::new(items);
        Self {
            data: items.as_mut_ptr(),
            length: items.len(),
            capacity: items.capacity(),
        }
    }
}

macro_rules! fallible_struct {
    ($($(#[$meta:meta])* $name:ident($payload:ty) = $empty:expr;)*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                pub(crate) value: $payload,
                pub(crate) ok: bool,
            }

            impl $name {
                pub fn some(value: $payload) -> Self {
                    Self { value, ok: true }
                }

                pub fn none() -> Self {
                    Self { value: $empty, ok: false }
                }
            }

            impl From<Option<$payload>> for $name {
                fn from(value: Option<$payload>) -> Self {
                    match value {
                        Some(value) => Self::some(value),
                        None => Self::none(),
                    }
                }
            }
        )*
    };
}

fallible_struct! {
    BoolOr(bool) = false;
    IntOr(i64) = 0;
    FloatOr(f64) = 0.0;
    /// Transfers ownership of `value` when `ok`.
    StringOr(OwnedString) = OwnedString::empty();
    /// Transfers ownership of `value` and every element in it when `ok`.
    TupleOr(TupleSlice) = TupleSlice::empty();
    /// Transfers ownership of `value` when `ok`.
    ValuePtrOr(ValuePtr) = ptr::null();
    /// Transfers ownership of `value` when `ok`.
    ExprPtrOr(ExprPtr) = ptr::null();
}

/// Opaque, address-sized token handed back to a closure's trampoline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capture {
    addr: usize,
}

impl Capture {
    pub fn new(addr: usize) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }
}

/// Engine-side callable: `ptr(argument, capture)`.
///
/// The callee borrows `argument` for the call and transfers ownership of the returned value.
pub type ClosureFn = unsafe extern "C" fn(ValuePtr, Capture) -> ValuePtrOr;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct Closure {
    ptr: ClosureFn,
    capture: Capture,
}

impl Closure {
    pub fn new(ptr: ClosureFn, capture: Capture) -> Self {
        Self { ptr, capture }
    }
}

fn into_value_ptr(value: Value) -> ValuePtr {
    Box::into_raw(Box::new(value)) as ValuePtr
}

unsafe fn take_value(value: ValuePtr) -> Option<Value> {
    if value.is_null() {
        return None;
    }
    Some(*unsafe { Box::from_raw(value as *mut Value) })
}

unsafe fn value_ref<'a>(value: ValuePtr) -> Option<&'a Value> {
    unsafe { (value as *const Value).as_ref() }
}

unsafe fn expr_ref<'a>(expr: ExprPtr) -> Option<&'a Node> {
    unsafe { (expr as *const Node).as_ref() }
}

unsafe fn context_ref<'a>(ctx: ContextPtr) -> Option<&'a HashMapContext> {
    unsafe { (ctx as *const HashMapContext).as_ref() }
}

unsafe fn context_mut<'a>(ctx: ContextMutPtr) -> Option<&'a mut HashMapContext> {
    unsafe { (ctx as *mut HashMapContext).as_mut() }
}

/// Transfers ownership of the expression on success. Blank or malformed text fails.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn parse(text: BorrowedString<'_>) -> ExprPtrOr {
    let Some(text) = (unsafe { text.to_str() }) else {
        tracing::debug!("parse input is not valid UTF-8");
        return ExprPtrOr::none();
    };
    if text.trim().is_empty() {
        return ExprPtrOr::none();
    }
    match evalexpr::build_operator_tree(text) {
        Ok(node) => ExprPtrOr::some(Box::into_raw(Box::new(node)) as ExprPtr),
        Err(err) => {
            tracing::debug!(%err, "parse failed");
            ExprPtrOr::none()
        }
    }
}

/// Transfers ownership of the context. Never fails.
#[unsafe(no_mangle)]
pub extern "C" fn make_context() -> ContextMutPtr {
    Box::into_raw(Box::new(HashMapContext::new())) as ContextMutPtr
}

/// Transfers ownership of the value.
#[unsafe(no_mangle)]
pub extern "C" fn make_bool(value: bool) -> ValuePtr {
    into_value_ptr(Value::Boolean(value))
}

/// Transfers ownership of the value.
#[unsafe(no_mangle)]
pub extern "C" fn make_int(value: i64) -> ValuePtr {
    into_value_ptr(Value::Int(value))
}

/// Transfers ownership of the value.
#[unsafe(no_mangle)]
pub extern "C" fn make_float(value: f64) -> ValuePtr {
    into_value_ptr(Value::Float(value))
}

/// Transfers ownership of the value. Invalid UTF-8 is replaced with U+FFFD.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn make_string(value: BorrowedString<'_>) -> ValuePtr {
    let bytes = unsafe { value.bytes() };
    into_value_ptr(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

unsafe fn bind(ctx: ContextMutPtr, name: BorrowedString<'_>, value: Value) -> bool {
    let (Some(ctx), Some(name)) = (unsafe { context_mut(ctx) }, unsafe { name.to_str() }) else {
        return false;
    };
    match ctx.set_value(name.to_string(), value) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(binding = name, %err, "binding rejected");
            false
        }
    }
}

/// Does **not** take ownership of `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_bool(
    ctx: ContextMutPtr,
    name: BorrowedString<'_>,
    value: bool,
) -> bool {
    unsafe { bind(ctx, name, Value::Boolean(value)) }
}

/// Does **not** take ownership of `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_int(ctx: ContextMutPtr, name: BorrowedString<'_>, value: i64) -> bool {
    unsafe { bind(ctx, name, Value::Int(value)) }
}

/// Does **not** take ownership of `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_float(
    ctx: ContextMutPtr,
    name: BorrowedString<'_>,
    value: f64,
) -> bool {
    unsafe { bind(ctx, name, Value::Float(value)) }
}

/// Does **not** take ownership of `ctx`; `value` is copied.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_string(
    ctx: ContextMutPtr,
    name: BorrowedString<'_>,
    value: BorrowedString<'_>,
) -> bool {
    let Some(value) = (unsafe { value.to_str() }) else {
        return false;
    };
    unsafe { bind(ctx, name, Value::String(value.to_string())) }
}

/// Does **not** take ownership of `ctx`. Always takes ownership of `value`, even on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_value(
    ctx: ContextMutPtr,
    name: BorrowedString<'_>,
    value: ValuePtr,
) -> bool {
    let Some(value) = (unsafe { take_value(value) }) else {
        return false;
    };
    unsafe { bind(ctx, name, value) }
}

/// Does **not** take ownership of `ctx`.
///
/// On every call from an expression the engine invokes `closure.ptr` with a borrowed argument
/// and takes ownership of the returned value; `ok == false` fails the enclosing evaluation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_function(
    ctx: ContextMutPtr,
    name: BorrowedString<'_>,
    closure: Closure,
) -> bool {
    let (Some(ctx), Some(name)) = (unsafe { context_mut(ctx) }, unsafe { name.to_str() }) else {
        return false;
    };
    let function = Function::new(move |argument: &Value| {
        let argument = argument as *const Value as ValuePtr;
        let result = unsafe { (closure.ptr)(argument, closure.capture) };
        if !result.ok {
            return Err(EvalexprError::CustomMessage(
                "host function produced no value".to_string(),
            ));
        }
        unsafe { take_value(result.value) }.ok_or_else(|| {
            EvalexprError::CustomMessage("host function returned a null value".to_string())
        })
    });
    match ctx.set_function(name.to_string(), function) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(binding = name, %err, "function binding rejected");
            false
        }
    }
}

/// Does **not** take ownership of `ctx`. Transfers ownership of a copy of the bound value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn context_get_value(
    ctx: ContextPtr,
    name: BorrowedString<'_>,
) -> ValuePtrOr {
    let (Some(ctx), Some(name)) = (unsafe { context_ref(ctx) }, unsafe { name.to_str() }) else {
        return ValuePtrOr::none();
    };
    ValuePtrOr::from(ctx.get_value(name).cloned().map(into_value_ptr))
}

/// Does **not** take ownership of `value`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_bool(value: ValuePtr) -> BoolOr {
    let value = unsafe { value_ref(value) };
    BoolOr::from(value.and_then(|value| value.as_boolean().ok()))
}

/// Does **not** take ownership of `value`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_int(value: ValuePtr) -> IntOr {
    let value = unsafe { value_ref(value) };
    IntOr::from(value.and_then(|value| value.as_int().ok()))
}

/// Does **not** take ownership of `value`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_float(value: ValuePtr) -> FloatOr {
    let value = unsafe { value_ref(value) };
    FloatOr::from(value.and_then(|value| value.as_float().ok()))
}

/// Does **not** take ownership of `value`; transfers ownership of the `StringOr` buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_string(value: ValuePtr) -> StringOr {
    let value = unsafe { value_ref(value) };
    let text = value.and_then(|value| value.as_string().ok());
    StringOr::from(text.map(OwnedString::from))
}

/// Does **not** take ownership of `value`; transfers ownership of the `TupleOr` slice.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_tuple(value: ValuePtr) -> TupleOr {
    let value = unsafe { value_ref(value) };
    let items = value.and_then(|value| value.as_tuple().ok());
    TupleOr::from(items.map(|items| {
        let slots: Vec<ValuePtr> = items.into_iter().map(into_value_ptr).collect();
        TupleSlice::from(slots)
    }))
}

unsafe fn evaluate<T>(
    expr: ExprPtr,
    ctx: ContextPtr,
    eval: impl FnOnce(&Node, &HashMapContext) -> EvalexprResult<T>,
) -> Option<T> {
    let (Some(node), Some(ctx)) = (unsafe { expr_ref(expr) }, unsafe { context_ref(ctx) }) else {
        return None;
    };
    match eval(node, ctx) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(%err, "evaluation failed");
            None
        }
    }
}

/// Does **not** take ownership of `expr` or `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eval_bool(expr: ExprPtr, ctx: ContextPtr) -> BoolOr {
    let value = unsafe { evaluate(expr, ctx, |node, ctx| node.eval_boolean_with_context(ctx)) };
    BoolOr::from(value)
}

/// Does **not** take ownership of `expr` or `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eval_int(expr: ExprPtr, ctx: ContextPtr) -> IntOr {
    let value = unsafe { evaluate(expr, ctx, |node, ctx| node.eval_int_with_context(ctx)) };
    IntOr::from(value)
}

/// Does **not** take ownership of `expr` or `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eval_float(expr: ExprPtr, ctx: ContextPtr) -> FloatOr {
    let value = unsafe { evaluate(expr, ctx, |node, ctx| node.eval_float_with_context(ctx)) };
    FloatOr::from(value)
}

/// Does **not** take ownership of `expr` or `ctx`; transfers ownership of the `StringOr` buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eval_string(expr: ExprPtr, ctx: ContextPtr) -> StringOr {
    let text = unsafe { evaluate(expr, ctx, |node, ctx| node.eval_string_with_context(ctx)) };
    StringOr::from(text.map(OwnedString::from))
}

/// Does **not** take ownership of `expr` or `ctx`; transfers ownership of the result value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eval_value(expr: ExprPtr, ctx: ContextPtr) -> ValuePtrOr {
    let value = unsafe { evaluate(expr, ctx, |node, ctx| node.eval_with_context(ctx)) };
    ValuePtrOr::from(value.map(into_value_ptr))
}

fn debug_text(value: Option<&impl std::fmt::Debug>) -> OwnedString {
    let text = value.map(|value| format!("{value:#?}"));
    OwnedString::from(text.unwrap_or_default())
}

/// Does **not** take ownership of `expr`; transfers ownership of the returned buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn expr_debug_string(expr: ExprPtr) -> OwnedString {
    debug_text(unsafe { expr_ref(expr) })
}

/// Does **not** take ownership of `ctx`; transfers ownership of the returned buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn context_debug_string(ctx: ContextPtr) -> OwnedString {
    debug_text(unsafe { context_ref(ctx) })
}

/// Does **not** take ownership of `value`; transfers ownership of the returned buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn value_debug_string(value: ValuePtr) -> OwnedString {
    debug_text(unsafe { value_ref(value) })
}

/// Takes ownership of `expr`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drop_expr(expr: ExprPtr) {
    if expr.is_null() {
        return;
    }
    #[cfg(test)]
    release_log::record(|log| log.expr += 1);
    drop(unsafe { Box::from_raw(expr as *mut Node) });
}

/// Takes ownership of `value`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drop_value(value: ValuePtr) {
    if value.is_null() {
        return;
    }
    #[cfg(test)]
    release_log::record(|log| log.value += 1);
    drop(unsafe { Box::from_raw(value as *mut Value) });
}

/// Takes ownership of `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drop_context(ctx: ContextMutPtr) {
    if ctx.is_null() {
        return;
    }
    #[cfg(test)]
    release_log::record(|log| log.context += 1);
    drop(unsafe { Box::from_raw(ctx as *mut HashMapContext) });
}

/// Takes ownership of `text`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drop_string_view(text: OwnedString) {
    if let Some(text) = unsafe { text.into_string() } {
        #[cfg(test)]
        release_log::record(|log| log.string += 1);
        drop(text);
    }
}

/// Takes ownership of `tuple` and of every non-null element still in it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drop_tuple_slice(tuple: TupleSlice) {
    if tuple.data.is_null() {
        return;
    }
    #[cfg(test)]
    release_log::record(|log| log.tuple += 1);
    let slots = unsafe { Vec::from_raw_parts(tuple.data, tuple.length, tuple.capacity) };
    for slot in slots {
        unsafe { drop_value(slot) };
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    const WORD: usize = size_of::<usize>();

    fn raw_text(bytes: &[u8]) -> BorrowedString<'_> {
        BorrowedString {
            data: bytes.as_ptr(),
            length: bytes.len(),
            _borrow: PhantomData,
        }
    }

    #[test]
    fn struct_layouts_match_c_header() {
        assert_eq!(size_of::<BorrowedString<'static>>(), 2 * WORD);
        assert_eq!(offset_of!(BorrowedString<'static>, length), WORD);
        assert_eq!(size_of::<OwnedString>(), 3 * WORD);
        assert_eq!(offset_of!(OwnedString, capacity), 2 * WORD);
        assert_eq!(size_of::<TupleSlice>(), 3 * WORD);
        assert_eq!(size_of::<Capture>(), WORD);
        assert_eq!(offset_of!(Closure, capture), WORD);
        assert_eq!(offset_of!(BoolOr, ok), 1);
        assert_eq!(offset_of!(IntOr, ok), 8);
        assert_eq!(offset_of!(FloatOr, ok), 8);
        assert_eq!(offset_of!(StringOr, ok), 3 * WORD);
        assert_eq!(offset_of!(TupleOr, ok), 3 * WORD);
        assert_eq!(offset_of!(ValuePtrOr, ok), WORD);
        assert_eq!(offset_of!(ExprPtrOr, ok), WORD);
    }

    #[test]
    fn blank_text_does_not_parse() {
        for text in ["", "   ", "\n\t"] {
            let result = unsafe { parse(BorrowedString::new(text)) };
            assert!(!result.ok, "{text:?} should not parse");
            assert!(result.value.is_null());
        }
    }

    #[test]
    fn non_utf8_text_is_rejected() {
        let bytes = [b'1', 0xff, b'2'];
        let text = raw_text(&bytes);
        assert!(!unsafe { parse(text) }.ok);

        let ctx = make_context();
        let name = BorrowedString::new("label");
        assert!(!unsafe { set_int(ctx, text, 1) });
        assert!(!unsafe { set_string(ctx, name, text) });
        assert!(!unsafe { context_get_value(ctx, name) }.ok);
        unsafe { drop_context(ctx) };
    }

    #[test]
    fn make_string_replaces_invalid_bytes() {
        let bytes = [b'a', 0xff];
        let value = unsafe { make_string(raw_text(&bytes)) };
        let text = unsafe { get_string(value) };
        assert!(text.ok);
        assert_eq!(unsafe { text.value.as_bytes() }, "a\u{FFFD}".as_bytes());
        unsafe {
            drop_string_view(text.value);
            drop_value(value);
        }
    }

    #[test]
    fn drop_functions_ignore_null_and_empty_inputs() {
        let before = release_log::snapshot();
        unsafe {
            drop_expr(ptr::null());
            drop_value(ptr::null());
            drop_context(ptr::null_mut());
            drop_string_view(OwnedString::empty());
            drop_tuple_slice(TupleSlice::empty());
        }
        let released = release_log::snapshot().since(before);
        assert_eq!(released, release_log::Releases::default());
    }

    #[test]
    fn dropping_a_tuple_slice_releases_remaining_elements() {
        let value = into_value_ptr(Value::Tuple(vec![Value::Int(1), Value::Int(2)]));
        let tuple = unsafe { get_tuple(value) };
        assert!(tuple.ok);
        let mut slice = tuple.value;
        let slots = unsafe { slice.slots_mut() };
        let first = std::mem::replace(&mut slots[0], ptr::null());

        let before = release_log::snapshot();
        unsafe { drop_tuple_slice(slice) };
        let released = release_log::snapshot().since(before);
        assert_eq!(released.tuple, 1);
        assert_eq!(released.value, 1);

        assert_eq!(unsafe { get_int(first) }.value, 1);
        unsafe {
            drop_value(first);
            drop_value(value);
        }
    }

    #[test]
    fn set_value_moves_the_value_into_the_context() {
        let ctx = make_context();
        let name = BorrowedString::new("x");
        let before = release_log::snapshot();
        assert!(unsafe { set_value(ctx, name, make_int(3)) });
        assert_eq!(release_log::snapshot().since(before).value, 0);

        let bound = unsafe { context_get_value(ctx, name) };
        assert!(bound.ok);
        assert_eq!(unsafe { get_int(bound.value) }.value, 3);
        unsafe {
            drop_value(bound.value);
            drop_context(ctx);
        }
    }

    #[test]
    fn set_value_without_a_context_fails_and_still_takes_the_value() {
        let before = release_log::snapshot();
        let name = BorrowedString::new("x");
        assert!(!unsafe { set_value(ptr::null_mut(), name, make_int(3)) });
        assert_eq!(release_log::snapshot().since(before).value, 0);
    }

    #[test]
    fn rebinding_to_another_type_is_rejected() {
        let ctx = make_context();
        let name = BorrowedString::new("a");
        assert!(unsafe { set_int(ctx, name, 1) });
        assert!(unsafe { set_int(ctx, name, 2) });
        let two = BorrowedString::new("two");
        assert!(!unsafe { set_string(ctx, name, two) });
        let bound = unsafe { context_get_value(ctx, name) };
        assert!(bound.ok);
        assert_eq!(unsafe { get_int(bound.value) }.value, 2);
        unsafe {
            drop_value(bound.value);
            drop_context(ctx);
        }
    }
}
