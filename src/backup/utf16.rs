//! UTF-16 to UTF-8 conversion.
//!
//! Every text field in an NBU container (phone identity, folder names, memo
//! bodies, message bodies) is little-endian UTF-16. The reader hands back
//! zero-terminated code-unit buffers; this module turns them into UTF-8.
//!
//! Malformed input never fails conversion: each lone or mismatched surrogate
//! becomes one U+FFFD and decoding continues with the next unit. The only
//! failure is [`NbuError::TooLong`], when the UTF-8 size would not fit in a
//! `usize`.

use crate::NbuError;

/// U+FFFD REPLACEMENT CHARACTER.
pub const REPLACEMENT_CHAR: u32 = 0xFFFD;

/// Largest Unicode scalar value.
pub const CODEPOINT_MAX: u32 = 0x10FFFF;

pub fn is_surrogate(u: u16) -> bool {
    u & 0xF800 == 0xD800
}

pub fn is_high_surrogate(u: u16) -> bool {
    u & 0xFC00 == 0xD800
}

pub fn is_low_surrogate(u: u16) -> bool {
    u & 0xFC00 == 0xDC00
}

/// Combine a high and a low surrogate into a supplementary-plane scalar.
pub fn decode_surrogate_pair(high: u16, low: u16) -> u32 {
    (((u32::from(high) & 0x3FF) << 10) | (u32::from(low) & 0x3FF)) + 0x10000
}

/// Decode one scalar value starting at `u1`, with `u2` as lookahead.
///
/// Returns the code point and the number of units it occupied. An invalid
/// surrogate yields `(REPLACEMENT_CHAR, 0)`; callers must still advance by
/// one unit.
pub fn decode_one(u1: u16, u2: u16) -> (u32, usize) {
    if !is_surrogate(u1) {
        return (u32::from(u1), 1);
    }
    if is_high_surrogate(u1) && is_low_surrogate(u2) {
        return (decode_surrogate_pair(u1, u2), 2);
    }
    (REPLACEMENT_CHAR, 0)
}

/// Number of bytes `encode_utf8` writes for `cp` (0 above `CODEPOINT_MAX`).
pub fn utf8_len(cp: u32) -> usize {
    match cp {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        0x1_0000..=CODEPOINT_MAX => 4,
        _ => 0,
    }
}

/// Append the UTF-8 encoding of `cp` to `out`, returning the byte count.
///
/// Code points above `CODEPOINT_MAX` are a caller error and append nothing.
pub fn encode_utf8(cp: u32, out: &mut Vec<u8>) -> usize {
    let n = utf8_len(cp);
    match n {
        1 => out.push(cp as u8),
        2 => out.extend_from_slice(&[0xC0 | (cp >> 6 & 0x1F) as u8, 0x80 | (cp & 0x3F) as u8]),
        3 => out.extend_from_slice(&[
            0xE0 | (cp >> 12 & 0x0F) as u8,
            0x80 | (cp >> 6 & 0x3F) as u8,
            0x80 | (cp & 0x3F) as u8,
        ]),
        4 => out.extend_from_slice(&[
            0xF0 | (cp >> 18 & 0x07) as u8,
            0x80 | (cp >> 12 & 0x3F) as u8,
            0x80 | (cp >> 6 & 0x3F) as u8,
            0x80 | (cp & 0x3F) as u8,
        ]),
        _ => {}
    }
    n
}

/// Iterator over the scalar values of a zero-terminated code-unit buffer.
///
/// Stops at the first zero unit or at the end of the slice, whichever comes
/// first.
struct Scalars<'a> {
    units: &'a [u16],
    index: usize,
}

impl Iterator for Scalars<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let u1 = *self.units.get(self.index)?;
        if u1 == 0 {
            return None;
        }
        let u2 = self.units.get(self.index + 1).copied().unwrap_or(0);
        let (cp, consumed) = decode_one(u1, u2);
        self.index += consumed.max(1);
        Some(cp)
    }
}

fn scalars(units: &[u16]) -> Scalars<'_> {
    Scalars { units, index: 0 }
}

/// Size query: UTF-8 bytes `convert_string` will produce, excluding the
/// terminator.
pub fn utf8_size(units: &[u16]) -> Result<usize, NbuError> {
    scalars(units).try_fold(0usize, |acc, cp| {
        acc.checked_add(utf8_len(cp)).ok_or(NbuError::TooLong)
    })
}

/// Convert a zero-terminated UTF-16 buffer to UTF-8 plus a trailing zero byte.
///
/// The output is allocated once, at the size reported by [`utf8_size`].
pub fn convert_string(units: &[u16]) -> Result<Vec<u8>, NbuError> {
    let size = utf8_size(units)?;
    let capacity = size.checked_add(1).ok_or(NbuError::TooLong)?;

    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|_| NbuError::TooLong)?;
    for cp in scalars(units) {
        encode_utf8(cp, &mut out);
    }
    out.push(0);
    Ok(out)
}

/// Convert a zero-terminated UTF-16 buffer to a `String`.
pub fn to_utf8_string(units: &[u16]) -> Result<String, NbuError> {
    let mut bytes = convert_string(units)?;
    bytes.pop();
    String::from_utf8(bytes)
        .map_err(|e| NbuError::InvalidRecord(format!("UTF-16 conversion produced invalid UTF-8: {}", e)))
}
