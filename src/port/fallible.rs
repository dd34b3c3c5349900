// `{value, ok}` boundary results as `Option`; the payload is unreachable unless `ok`.
use crate::abi::{
    BoolOr, ExprPtr, ExprPtrOr, FloatOr, IntOr, OwnedString, StringOr, TupleOr, TupleSlice,
    ValuePtr, ValuePtrOr,
};

pub(crate) trait Fallible {
    type Payload;

    fn into_option(self) -> Option<Self::Payload>;
}

macro_rules! impl_fallible {
    ($($name:ident => $payload:ty,)*) => {
        $(
            impl Fallible for $name {
                type Payload = $payload;

                fn into_option(self) -> Option<$payload> {
                    if self.ok { Some(self.value) } else { None }
                }
            }
        )*
    };
}

impl_fallible! {
    BoolOr => bool,
    IntOr => i64,
    FloatOr => f64,
    StringOr => OwnedString,
    TupleOr => TupleSlice,
    ValuePtrOr => ValuePtr,
    ExprPtrOr => ExprPtr,
}
