//! Controller sample record shared with the firmware.
//!
//! The firmware owns the storage (usually on the caller's stack) and the
//! hook only borrows it, so [`OsContPad`] must match the firmware's layout
//! exactly. There is no serialization step between the two; the record is
//! read and written in place.
//!
//! # Layout
//!
//! ```text
//! offset  width  field     type
//! 0       2      button    u16 big-endian bit-set
//! 2       1      stick_x   i8
//! 3       1      stick_y   i8
//! ```

use core::mem::{align_of, offset_of, size_of};

bitflags::bitflags! {
    /// Buttons reported by a standard N64 controller.
    ///
    /// Bits 0x0040 and 0x0080 have no button assigned. The firmware may
    /// still set them, so they are retained rather than truncated.
    #[repr(transparent)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ContButtons: u16 {
        const A = 0x8000;
        const B = 0x4000;
        const Z = 0x2000;
        const START = 0x1000;
        const D_UP = 0x0800;
        const D_DOWN = 0x0400;
        const D_LEFT = 0x0200;
        const D_RIGHT = 0x0100;
        const L = 0x0020;
        const R = 0x0010;
        const C_UP = 0x0008;
        const C_DOWN = 0x0004;
        const C_LEFT = 0x0002;
        const C_RIGHT = 0x0001;

        const _ = !0;
    }
}

/// One controller poll, as written by `osContGetReadData`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OsContPad {
    /// Currently pressed buttons.
    pub button: ContButtons,
    /// Horizontal stick deflection.
    pub stick_x: i8,
    /// Vertical stick deflection.
    pub stick_y: i8,
}

const _: () = assert!(size_of::<OsContPad>() == 4);
const _: () = assert!(align_of::<OsContPad>() == 2);
const _: () = assert!(offset_of!(OsContPad, button) == 0);
const _: () = assert!(offset_of!(OsContPad, stick_x) == 2);
const _: () = assert!(offset_of!(OsContPad, stick_y) == 3);

/// Description of one field of the shared record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub signed: bool,
}

/// Byte layout of [`OsContPad`], in field order.
pub const LAYOUT: [FieldLayout; 3] = [
    FieldLayout {
        name: "button",
        offset: offset_of!(OsContPad, button),
        width: size_of::<ContButtons>(),
        signed: false,
    },
    FieldLayout {
        name: "stick_x",
        offset: offset_of!(OsContPad, stick_x),
        width: size_of::<i8>(),
        signed: true,
    },
    FieldLayout {
        name: "stick_y",
        offset: offset_of!(OsContPad, stick_y),
        width: size_of::<i8>(),
        signed: true,
    },
];

impl OsContPad {
    /// Size of the record in bytes.
    pub const SIZE: usize = size_of::<Self>();

    pub const fn new(button: ContButtons, stick_x: i8, stick_y: i8) -> Self {
        Self {
            button,
            stick_x,
            stick_y,
        }
    }

    /// Returns `true` if every button in `mask` is held.
    #[inline]
    pub fn is_held(&self, mask: ContButtons) -> bool {
        self.button.contains(mask)
    }

    /// Encode the record the way it sits in N64 RAM.
    pub fn to_be_bytes(&self) -> [u8; Self::SIZE] {
        let [hi, lo] = self.button.bits().to_be_bytes();
        [hi, lo, self.stick_x as u8, self.stick_y as u8]
    }

    /// Decode a record from N64 RAM bytes. Every bit pattern is valid.
    pub fn from_be_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            button: ContButtons::from_bits_retain(u16::from_be_bytes([bytes[0], bytes[1]])),
            stick_x: bytes[2] as i8,
            stick_y: bytes[3] as i8,
        }
    }
}
