//! Big-endian bit field extraction over byte slices.
//!
//! Bits are numbered MSB-first from the start of the slice, the way RTCM3
//! payloads are laid out. Neither function checks bounds beyond the usual
//! slice indexing: callers validate `pos + len <= 8 * buff.len()` first.

/// Unsigned field of `len` bits (at most 64) starting at bit `pos`.
///
/// # Panics
///
/// If the field extends past the end of `buff`.
pub fn getbitu(buff: &[u8], pos: usize, len: usize) -> u64 {
    debug_assert!(len <= 64);
    (pos..pos + len).fold(0u64, |bits, i| {
        (bits << 1) | u64::from((buff[i / 8] >> (7 - i % 8)) & 1)
    })
}

/// Two's complement signed field of `len` bits (at most 64) starting at bit `pos`.
///
/// # Panics
///
/// If the field extends past the end of `buff`.
pub fn getbits(buff: &[u8], pos: usize, len: usize) -> i64 {
    let bits = getbitu(buff, pos, len);
    if len == 0 || len >= 64 {
        return bits as i64;
    }
    if bits & (1u64 << (len - 1)) != 0 {
        // extend the sign bit
        (bits | (!0u64 << len)) as i64
    } else {
        bits as i64
    }
}

/// True if a field of `len` bits at `pos` fits in `buff`
pub(crate) fn fits(buff: &[u8], pos: usize, len: usize) -> bool {
    pos + len <= buff.len() * 8
}
