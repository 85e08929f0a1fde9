//! Minimal signed little-endian integer encoding used for numbers pushed inside scripts.

/// Widest number accepted by arithmetic and locktime opcodes.
pub const MAX_NUM_LEN: usize = 4;

/// Encodes `value` in its minimal script-number form. Zero encodes as an empty vector.
#[must_use]
pub fn encode(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while abs > 0 {
        out.push(abs.to_le_bytes()[0]);
        abs >>= 8;
    }

    // The top bit of the last byte is the sign bit, add a byte if it is already taken.
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

/// Decodes a minimally encoded script number of at most `max_len` bytes.
#[must_use]
pub fn decode(bytes: &[u8], max_len: usize) -> Option<i64> {
    if bytes.is_empty() {
        return Some(0);
    }
    if bytes.len() > max_len || bytes.len() > 8 {
        return None;
    }

    let last = bytes[bytes.len() - 1];
    if last & 0x7f == 0 && (bytes.len() == 1 || bytes[bytes.len() - 2] & 0x80 == 0) {
        // Redundant sign byte
        return None;
    }

    let mut magnitude: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        let byte = if i == bytes.len() - 1 {
            byte & 0x7f
        } else {
            *byte
        };
        magnitude |= u64::from(byte) << (8 * i);
    }
    let magnitude = i64::try_from(magnitude).ok()?;
    Some(if last & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    })
}
