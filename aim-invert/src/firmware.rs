//! Binding to the firmware's own read routine, and the exported hook.
//!
//! The call-site trampoline built by
//! [`HookLayout::call_trampoline`](crate::site::HookLayout::call_trampoline)
//! `jal`s to the `interceptor` symbol defined here. Placing that symbol at
//! `hook_site` is up to the linker script of the image being patched.

use crate::hook::ReadController;
use crate::pad::OsContPad;

/// Signature of `osContGetReadData`.
pub type ReadDataFn = unsafe extern "C" fn(pad: *mut OsContPad);

/// A firmware routine reached through a fixed entry point.
#[derive(Copy, Clone)]
pub struct FirmwareRoutine {
    entry: ReadDataFn,
}

impl FirmwareRoutine {
    /// Bind the routine at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be the entry point of a function with the
    /// `osContGetReadData` signature, and must remain mapped for as long as
    /// the returned value is used.
    pub unsafe fn at(addr: u32) -> Self {
        // SAFETY: Caller guarantees `addr` is a valid entry point. `usize`
        // and function pointers have the same width on every target.
        let entry = unsafe { core::mem::transmute::<usize, ReadDataFn>(addr as usize) };
        Self { entry }
    }

    /// Bind an existing function pointer.
    pub const fn from_fn(entry: ReadDataFn) -> Self {
        Self { entry }
    }

    /// Entry point address.
    pub fn address(&self) -> usize {
        self.entry as usize
    }
}

impl ReadController for FirmwareRoutine {
    #[inline]
    fn read(&mut self, pad: &mut OsContPad) {
        // SAFETY: The constructor contract guarantees `entry` follows the
        // read routine's ABI, and `pad` is a valid exclusive reference.
        unsafe { (self.entry)(pad) }
    }
}

/// Replacement for the stock `jal osContGetReadData`.
///
/// # Safety
///
/// Called by firmware only. `pad` must be non-null and writable for the
/// duration of the call, which is the firmware's own calling contract.
#[cfg(target_arch = "mips")]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn interceptor(pad: *mut OsContPad) {
    use crate::hook::{DEFAULT_HOLD, NegationPolicy, invert_aim};
    use crate::site::DEFAULT_LAYOUT;

    // SAFETY: DEFAULT_LAYOUT.original_routine is osContGetReadData in the
    // image this hook is linked into.
    let mut original = unsafe { FirmwareRoutine::at(DEFAULT_LAYOUT.original_routine) };
    // SAFETY: Firmware passes its own pad buffer.
    let pad = unsafe { &mut *pad };

    original.read(pad);
    invert_aim(pad, DEFAULT_HOLD, NegationPolicy::Wrap);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Interceptor;
    use crate::pad::ContButtons;

    extern "C" fn stub(pad: *mut OsContPad) {
        // SAFETY: Only called through `FirmwareRoutine::read` with a live
        // reference.
        let pad = unsafe { &mut *pad };
        *pad = OsContPad::new(ContButtons::R | ContButtons::B, 12, -34);
    }

    #[test]
    fn routine_through_function_pointer() {
        let mut hook = Interceptor::new(FirmwareRoutine::from_fn(stub));
        let mut pad = OsContPad::default();
        hook.poll(&mut pad);
        assert_eq!(pad.stick_x, 12);
        assert_eq!(pad.stick_y, 34);
        assert_eq!(hook.original().address(), stub as usize);
    }

    #[test]
    fn routine_reads_without_inversion() {
        let mut routine = FirmwareRoutine::from_fn(stub);
        let mut pad = OsContPad::default();
        routine.read(&mut pad);
        assert_eq!(pad.stick_y, -34);
        assert_eq!(pad.button, ContButtons::R | ContButtons::B);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn bound_by_address() {
        let addr = stub as usize as u32;
        // SAFETY: `addr` is the address of `stub`.
        let mut routine = unsafe { FirmwareRoutine::at(addr) };
        assert_eq!(routine.address(), stub as usize);
        let mut pad = OsContPad::default();
        routine.read(&mut pad);
        assert_eq!(pad.stick_y, -34);
    }
}
