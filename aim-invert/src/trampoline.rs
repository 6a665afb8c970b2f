//! MIPS encoding for the call-site trampoline.
//!
//! The stock call site loads the pad pointer into `a0` and calls
//! `osContGetReadData`. The trampoline keeps the argument setup and only
//! retargets the call:
//!
//! ```text
//! lui   a0, %hi(pad)
//! jal   interceptor
//! addiu a0, a0, %lo(pad)    ; delay slot
//! ```
//!
//! Only the handful of instructions a splice needs are modelled here.

use core::fmt;

use crate::site::PatchSite;

/// A MIPS general purpose register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Register(u8);

const REGISTER_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

impl Register {
    /// First argument register; carries the pad pointer.
    pub const A0: Self = Self(4);

    pub fn name(self) -> &'static str {
        REGISTER_NAMES[self.0 as usize]
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const OP_JAL: u32 = 0x03;
const OP_ADDIU: u32 = 0x09;
const OP_LUI: u32 = 0x0F;

/// Region reachable by a `jal` from a given delay slot.
const JUMP_REGION_MASK: u32 = 0xF000_0000;

/// Instructions used when splicing a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Lui { rt: Register, imm: u16 },
    Addiu { rt: Register, rs: Register, imm: i16 },
    /// Absolute call target. Only bits 2..28 are encoded.
    Jal { target: u32 },
}

impl Instruction {
    /// Encode as a 32-bit instruction word.
    pub const fn encode(self) -> u32 {
        match self {
            Self::Lui { rt, imm } => (OP_LUI << 26) | ((rt.0 as u32) << 16) | imm as u32,
            Self::Addiu { rt, rs, imm } => {
                (OP_ADDIU << 26) | ((rs.0 as u32) << 21) | ((rt.0 as u32) << 16) | (imm as u16) as u32
            },
            Self::Jal { target } => (OP_JAL << 26) | ((target >> 2) & 0x03FF_FFFF),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Lui { rt, imm } => write!(f, "lui {rt},0x{imm:x}"),
            Self::Addiu { rt, rs, imm } => write!(f, "addiu {rt},{rs},{imm}"),
            Self::Jal { target } => write!(f, "jal 0x{target:08x}"),
        }
    }
}

/// Split an address into `%hi`/`%lo` halves for a `lui`/`addiu` pair.
///
/// `addiu` sign-extends its immediate, so `%hi` is rounded up whenever
/// `%lo` is negative.
pub const fn split_hi_lo(addr: u32) -> (u16, i16) {
    let lo = addr as u16 as i16;
    let hi = (addr.wrapping_add(0x8000) >> 16) as u16;
    (hi, lo)
}

/// Error building a trampoline.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A patch site or jump target address is not word aligned.
    Unaligned(u32),
    /// The jump target lies outside the 256 MiB region of the delay slot.
    OutOfRegion { delay_slot: u32, target: u32 },
}

impl fmt::Debug for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unaligned(addr) => write!(f, "EncodeError::Unaligned({addr:#010x})"),
            Self::OutOfRegion { delay_slot, target } => write!(
                f,
                "EncodeError::OutOfRegion {{ delay_slot: {delay_slot:#010x}, target: {target:#010x} }}"
            ),
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unaligned(addr) => write!(f, "address {addr:#010x} is not word aligned"),
            Self::OutOfRegion { delay_slot, target } => write!(
                f,
                "jump target {target:#010x} is not reachable from {delay_slot:#010x}"
            ),
        }
    }
}

impl core::error::Error for EncodeError {}

/// Encode a `jal` placed at `pc`, checking reachability.
pub const fn jal(pc: u32, target: u32) -> Result<Instruction, EncodeError> {
    if pc & 3 != 0 {
        return Err(EncodeError::Unaligned(pc));
    }
    if target & 3 != 0 {
        return Err(EncodeError::Unaligned(target));
    }
    let delay_slot = pc.wrapping_add(4);
    if delay_slot & JUMP_REGION_MASK != target & JUMP_REGION_MASK {
        return Err(EncodeError::OutOfRegion { delay_slot, target });
    }
    Ok(Instruction::Jal { target })
}

/// Number of instructions in a call trampoline.
pub const CALL_LEN: usize = 3;

/// A patch-site payload: instructions and where they go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Trampoline {
    pub site: PatchSite,
    pub instructions: [Instruction; CALL_LEN],
}

impl Trampoline {
    /// Call `target` with `arg` in `a0`, using the delay slot for the low
    /// half of the argument.
    pub const fn call_with_pointer(
        site: PatchSite,
        target: u32,
        arg: u32,
    ) -> Result<Self, EncodeError> {
        if site.ram & 3 != 0 {
            return Err(EncodeError::Unaligned(site.ram));
        }
        if site.rom & 3 != 0 {
            return Err(EncodeError::Unaligned(site.rom));
        }
        let (hi, lo) = split_hi_lo(arg);
        let call = match jal(site.ram.wrapping_add(4), target) {
            Ok(insn) => insn,
            Err(e) => return Err(e),
        };
        Ok(Self {
            site,
            instructions: [
                Instruction::Lui {
                    rt: Register::A0,
                    imm: hi,
                },
                call,
                Instruction::Addiu {
                    rt: Register::A0,
                    rs: Register::A0,
                    imm: lo,
                },
            ],
        })
    }

    /// Encoded instruction words.
    pub fn words(&self) -> [u32; CALL_LEN] {
        self.instructions.map(Instruction::encode)
    }

    /// Big-endian payload, ready to be written at `site.rom`.
    pub fn to_be_bytes(&self) -> [u8; CALL_LEN * 4] {
        let mut out = [0u8; CALL_LEN * 4];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.words()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Each instruction with the site it occupies.
    pub fn iter(&self) -> impl Iterator<Item = (PatchSite, Instruction)> + '_ {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, insn)| (self.site.advance(i as u32 * 4), *insn))
    }
}
