//! Patch sites and the address layout the hook is bound to.
//!
//! A patch site is known twice: by the address the code runs at once the
//! segment is loaded, and by its offset in the ROM image. The two move
//! together; [`SegmentMap`] translates between them for a loaded segment.

use crate::trampoline::{EncodeError, Trampoline};

/// A location in the firmware image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatchSite {
    /// Logical load address (KSEG0).
    pub ram: u32,
    /// Physical offset in the ROM image.
    pub rom: u32,
}

impl PatchSite {
    pub const fn new(ram: u32, rom: u32) -> Self {
        Self { ram, rom }
    }

    /// The site `bytes` further on, in both address spaces.
    pub const fn advance(self, bytes: u32) -> Self {
        Self {
            ram: self.ram.wrapping_add(bytes),
            rom: self.rom.wrapping_add(bytes),
        }
    }

    pub const fn is_word_aligned(self) -> bool {
        self.ram & 3 == 0 && self.rom & 3 == 0
    }
}

/// A contiguous segment copied from ROM to RAM.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SegmentMap {
    pub ram_base: u32,
    pub rom_base: u32,
    pub len: u32,
}

/// The boot segment: ROM `0x1000` onward is loaded at `0x8000_0400`.
pub const BOOT_SEGMENT: SegmentMap = SegmentMap {
    ram_base: 0x8000_0400,
    rom_base: 0x0000_1000,
    len: 0x0010_0000,
};

impl SegmentMap {
    pub const fn contains_ram(&self, ram: u32) -> bool {
        ram >= self.ram_base && ram - self.ram_base < self.len
    }

    pub const fn contains_rom(&self, rom: u32) -> bool {
        rom >= self.rom_base && rom - self.rom_base < self.len
    }

    /// Site for a load address, or `None` if it lies outside the segment.
    pub const fn site_for_ram(&self, ram: u32) -> Option<PatchSite> {
        if !self.contains_ram(ram) {
            return None;
        }
        Some(PatchSite::new(ram, ram - self.ram_base + self.rom_base))
    }

    /// Site for a ROM offset, or `None` if it lies outside the segment.
    pub const fn site_for_rom(&self, rom: u32) -> Option<PatchSite> {
        if !self.contains_rom(rom) {
            return None;
        }
        Some(PatchSite::new(rom - self.rom_base + self.ram_base, rom))
    }

    /// Whether `site` is consistent with this segment's mapping.
    pub const fn maps(&self, site: PatchSite) -> bool {
        match self.site_for_ram(site.ram) {
            Some(expected) => expected.rom == site.rom,
            None => false,
        }
    }
}

/// Where the hook is spliced in and what it calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HookLayout {
    /// The original `jal osContGetReadData` sequence, overwritten with the
    /// call trampoline.
    pub call_site: PatchSite,
    /// Where the interceptor body is placed.
    pub hook_site: PatchSite,
    /// Entry point of `osContGetReadData`.
    pub original_routine: u32,
    /// The pad buffer the call site passes in `a0`.
    pub pad_address: u32,
}

/// Addresses of the stock patch.
pub const DEFAULT_LAYOUT: HookLayout = HookLayout {
    call_site: PatchSite::new(0x8004_31B0, 0x0004_3DB0),
    hook_site: PatchSite::new(0x800A_C440, 0x000A_D040),
    original_routine: 0x8009_7DD4,
    pad_address: 0x800F_B0C0,
};

impl HookLayout {
    /// The three words written at `call_site`.
    pub const fn call_trampoline(&self) -> Result<Trampoline, EncodeError> {
        Trampoline::call_with_pointer(self.call_site, self.hook_site.ram, self.pad_address)
    }
}
