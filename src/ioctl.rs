//! Encoding of Linux `ioctl` request codes
//!
//! A request code packs a transfer direction, a type tag (the "magic"
//! character of the subsystem), a sequence number, and the size of the
//! argument into one integer, exactly like the `_IOC` macro family from
//! `<asm-generic/ioctl.h>`.
//!
//! This is the generic layout used by x86, x86_64, arm and aarch64.
//! `size` is not checked against the 14 bits available, matching the kernel
//! macros.

/// Width, in bits, of the sequence number field
pub const NR_BITS: u32 = 8;

/// Width, in bits, of the type field
pub const TYPE_BITS: u32 = 8;

/// Width, in bits, of the size field
pub const SIZE_BITS: u32 = 14;

/// Width, in bits, of the direction field
pub const DIR_BITS: u32 = 2;

pub const NR_SHIFT: u32 = 0;
pub const TYPE_SHIFT: u32 = NR_SHIFT + NR_BITS;
pub const SIZE_SHIFT: u32 = TYPE_SHIFT + TYPE_BITS;
pub const DIR_SHIFT: u32 = SIZE_SHIFT + SIZE_BITS;

/// Direction of the data transfer, from userspace's point of view
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum Direction {
    /// No argument is transferred
    None = 0,

    /// Userspace writes the argument to the kernel
    Write = 1,

    /// Userspace reads the argument from the kernel
    Read = 2,

    /// Both
    ReadWrite = 3,
}

/// Build a request code. Equivalent to `_IOC(dir, ty, nr, size)`.
pub const fn request_code(dir: Direction, ty: u8, nr: u8, size: usize) -> u32 {
    ((dir as u32) << DIR_SHIFT)
        | ((ty as u32) << TYPE_SHIFT)
        | ((nr as u32) << NR_SHIFT)
        | ((size as u32) << SIZE_SHIFT)
}

/// `_IO`
pub const fn io(ty: u8, nr: u8) -> u32 {
    request_code(Direction::None, ty, nr, 0)
}

/// `_IOR`
pub const fn ior(ty: u8, nr: u8, size: usize) -> u32 {
    request_code(Direction::Read, ty, nr, size)
}

/// `_IOW`
pub const fn iow(ty: u8, nr: u8, size: usize) -> u32 {
    request_code(Direction::Write, ty, nr, size)
}

/// `_IOWR`
pub const fn iowr(ty: u8, nr: u8, size: usize) -> u32 {
    request_code(Direction::ReadWrite, ty, nr, size)
}
