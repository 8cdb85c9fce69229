//! Capability bitsets, as returned by `EVIOCGBIT`
//!
//! Bit `i` of the set is bit `i % 8` of byte `i / 8`, least significant bit
//! first.

/// Number of bytes needed to address every code up to and including `max`.
pub const fn byte_len(max: u16) -> usize {
    max as usize / 8 + 1
}

/// Whether bit `code` is set.
///
/// Codes beyond the end of `bits` are reported unset, as the kernel had
/// nothing to say about them.
pub fn test(bits: &[u8], code: u16) -> bool {
    bits.get(code as usize / 8)
        .map_or(false, |byte| byte & (1 << (code % 8)) != 0)
}

/// Set bit `code`, ignoring codes beyond the end of `bits`.
pub fn set(bits: &mut [u8], code: u16) {
    if let Some(byte) = bits.get_mut(code as usize / 8) {
        *byte |= 1 << (code % 8);
    }
}

/// Iterate over every set bit, in ascending order.
pub fn iter(bits: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bits.iter().enumerate().flat_map(|(i, byte)| {
        (0..8u16)
            .filter(move |bit| byte & (1 << bit) != 0)
            .map(move |bit| i as u16 * 8 + bit)
    })
}
