//! Built-in override sets applied before caller-supplied ones.

use rand::RngCore;

use super::{Continue, FillFunc};
use crate::primitives::{ObjectMeta, TypeMeta};
use crate::scheme::Scheme;
use crate::types::{IntOrString, Time};

/// Metadata rules: blank type metadata, realistic object metadata and
/// timestamps at wire precision.
pub fn meta_funcs(_scheme: &Scheme) -> Vec<FillFunc> {
    vec![
        FillFunc::new(|t: &mut TypeMeta, _c: &mut Continue<'_>| {
            // Kinds are set by the codec, never by hand.
            *t = TypeMeta::default();
        }),
        FillFunc::new(|m: &mut ObjectMeta, c: &mut Continue<'_>| {
            c.fill_no_custom(m);
            let mut bytes = [0u8; 16];
            c.fill_bytes(&mut bytes);
            m.uid = Some(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string());
        }),
        FillFunc::new(|t: &mut Time, c: &mut Continue<'_>| {
            *t = wire_time(c);
        }),
    ]
}

/// Rules for optional fields whose naive random values would not survive a
/// trip over the wire.
pub fn wire_funcs(_scheme: &Scheme) -> Vec<FillFunc> {
    vec![
        FillFunc::new(|t: &mut Option<Time>, c: &mut Continue<'_>| {
            *t = if c.bool() {
                None
            } else if c.bool() {
                Some(Time::zero())
            } else {
                Some(wire_time(c))
            };
        }),
        FillFunc::new(|v: &mut Option<IntOrString>, c: &mut Continue<'_>| {
            *v = if c.bool() {
                None
            } else if c.bool() {
                Some(IntOrString::default())
            } else {
                Some(IntOrString::from_int(c.int31n(50)))
            };
        }),
    ]
}

fn wire_time(c: &mut Continue<'_>) -> Time {
    let sec = i64::from(c.u32());
    let nsec = c.u32() % 1_000_000_000;
    Time::from_unix(sec, nsec).unwrap_or_default().rfc3339_copy()
}
