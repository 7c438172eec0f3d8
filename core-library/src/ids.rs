//! Record id coercion.
//!
//! Callers may hand over ids as integers or as strings taken from a route or
//! a form. Strings follow leading-integer parsing: surrounding whitespace is
//! ignored, an optional sign is accepted and parsing stops at the first
//! non-digit, so `" 42abc"` becomes `42` while `"abc"` has no id.

use std::fmt;

pub type RecordId = i64;

/// Anything the services accept as a record id.
pub trait IntoRecordId: fmt::Display {
    fn into_record_id(&self) -> Option<RecordId>;
}

impl IntoRecordId for i64 {
    fn into_record_id(&self) -> Option<RecordId> {
        Some(*self)
    }
}

impl IntoRecordId for i32 {
    fn into_record_id(&self) -> Option<RecordId> {
        Some(i64::from(*self))
    }
}

impl IntoRecordId for u32 {
    fn into_record_id(&self) -> Option<RecordId> {
        Some(i64::from(*self))
    }
}

impl IntoRecordId for u64 {
    fn into_record_id(&self) -> Option<RecordId> {
        i64::try_from(*self).ok()
    }
}

impl IntoRecordId for usize {
    fn into_record_id(&self) -> Option<RecordId> {
        i64::try_from(*self).ok()
    }
}

impl IntoRecordId for str {
    fn into_record_id(&self) -> Option<RecordId> {
        parse_leading_int(self)
    }
}

impl IntoRecordId for String {
    fn into_record_id(&self) -> Option<RecordId> {
        parse_leading_int(self)
    }
}

impl<T: IntoRecordId + ?Sized> IntoRecordId for &T {
    fn into_record_id(&self) -> Option<RecordId> {
        (**self).into_record_id()
    }
}

/// Leading-integer parse. Returns `None` when no digit follows the optional
/// sign or when the value overflows `i64`.
pub fn parse_leading_int(raw: &str) -> Option<RecordId> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
