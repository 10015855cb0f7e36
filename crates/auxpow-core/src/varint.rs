//! Bitcoin CompactSize variable-length integers.
//!
//! - `0x00..=0xfc`: the value itself (1 byte)
//! - `0xfd`: followed by a little-endian `u16`
//! - `0xfe`: followed by a little-endian `u32`
//! - `0xff`: followed by a little-endian `u64`
//!
//! Decoding rejects values that were not written with the shortest form.

use bytes::{Buf, BufMut};

use crate::error::{ensure_capacity, ensure_remaining, Error, Result};

const PREFIX_U16: u8 = 0xfd;
const PREFIX_U32: u8 = 0xfe;
const PREFIX_U64: u8 = 0xff;

/// Number of bytes `value` occupies once encoded.
pub const fn varint_size(value: u64) -> usize {
    if value < PREFIX_U16 as u64 {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Encode a variable-length integer.
pub fn write_varint<B: BufMut>(buf: &mut B, value: u64) -> Result<()> {
    ensure_capacity(buf.remaining_mut(), varint_size(value))?;

    if value < PREFIX_U16 as u64 {
        buf.put_u8(value as u8);
    } else if value <= 0xffff {
        buf.put_u8(PREFIX_U16);
        buf.put_u16_le(value as u16);
    } else if value <= 0xffff_ffff {
        buf.put_u8(PREFIX_U32);
        buf.put_u32_le(value as u32);
    } else {
        buf.put_u8(PREFIX_U64);
        buf.put_u64_le(value);
    }
    Ok(())
}

/// Decode a variable-length integer.
pub fn read_varint<B: Buf>(buf: &mut B) -> Result<u64> {
    ensure_remaining(buf.remaining(), 1)?;
    let prefix = buf.get_u8();

    let (value, min) = match prefix {
        PREFIX_U16 => {
            ensure_remaining(buf.remaining(), 2)?;
            (u64::from(buf.get_u16_le()), u64::from(PREFIX_U16))
        }
        PREFIX_U32 => {
            ensure_remaining(buf.remaining(), 4)?;
            (u64::from(buf.get_u32_le()), 0x1_0000)
        }
        PREFIX_U64 => {
            ensure_remaining(buf.remaining(), 8)?;
            (buf.get_u64_le(), 0x1_0000_0000)
        }
        small => return Ok(u64::from(small)),
    };

    if value < min {
        return Err(Error::NonCanonicalVarInt { prefix, value });
    }
    Ok(value)
}

/// Decode a count and check that `remaining` bytes could hold `count`
/// items of at least `min_item_size` bytes each.
///
/// Guards allocations sized from untrusted counts.
pub(crate) fn read_count<B: Buf>(buf: &mut B, min_item_size: usize) -> Result<usize> {
    let count = read_varint(buf)?;
    let remaining = buf.remaining();
    let needed = usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(min_item_size))
        .unwrap_or(usize::MAX);
    ensure_remaining(remaining, needed)?;
    // `needed` fit in usize, so `count` does too.
    Ok(count as usize)
}
