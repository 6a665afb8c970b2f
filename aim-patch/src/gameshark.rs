//! N64 GameShark codes.
//!
//! A code is a 32-bit command word and a 16-bit value, written as
//! `XXXXXXXX YYYY`. The top byte of the command selects the code type and
//! the low 24 bits are a KSEG0 address offset.

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Code types understood by GameShark Pro firmware.
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CodeType {
    Write8 = 0x80,
    Write16 = 0x81,
    WriteGs8 = 0x88,
    WriteGs16 = 0x89,
    Equal8 = 0xD0,
    Equal16 = 0xD1,
    EqualGs8 = 0xD8,
    EqualGs16 = 0xD9,
    NotEqual8 = 0xD2,
    NotEqual16 = 0xD3,
    NotEqualGs8 = 0xDA,
    NotEqualGs16 = 0xDB,
    WriteOnBoot8 = 0xF0,
    WriteOnBoot16 = 0xF1,
    ExpansionPackDisable = 0xEE,
    AdditionalEnableCode = 0x20,
    ChangeExceptionHandler = 0xCC,
    Enabler = 0xDE,
    SetStoreLocation = 0xFF,
    Repeater = 0x50,
}

impl CodeType {
    pub fn is_write8(self) -> bool {
        matches!(self, Self::Write8 | Self::WriteGs8 | Self::WriteOnBoot8)
    }

    pub fn is_write16(self) -> bool {
        matches!(self, Self::Write16 | Self::WriteGs16 | Self::WriteOnBoot16)
    }

    pub fn is_write(self) -> bool {
        self.is_write8() || self.is_write16()
    }

    /// Applies only when the following code's condition holds.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Self::Equal8
                | Self::Equal16
                | Self::EqualGs8
                | Self::EqualGs16
                | Self::NotEqual8
                | Self::NotEqual16
                | Self::NotEqualGs8
                | Self::NotEqualGs16
        )
    }

    /// May follow a [`Repeater`](Self::Repeater).
    pub fn can_be_repeated(self) -> bool {
        self.is_write()
    }
}

const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// A single GameShark code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GamesharkCode {
    code: u32,
    value: u16,
}

impl GamesharkCode {
    pub const fn new(code: u32, value: u16) -> Self {
        Self { code, value }
    }

    /// Build a code from its type, an address and a value. Only the low 24
    /// bits of `address` are kept.
    pub fn with_type(ty: CodeType, address: u32, value: u16) -> Self {
        Self::new(((u8::from(ty) as u32) << 24) | (address & ADDRESS_MASK), value)
    }

    pub const fn code(&self) -> u32 {
        self.code
    }

    pub const fn address(&self) -> u32 {
        self.code & ADDRESS_MASK
    }

    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Code type, or `None` for an unknown type byte.
    pub fn code_type(&self) -> Option<CodeType> {
        CodeType::try_from((self.code >> 24) as u8).ok()
    }

    pub fn is_conditional(&self) -> bool {
        self.code_type().is_some_and(CodeType::is_conditional)
    }

    fn is_repeater(&self) -> bool {
        self.code_type() == Some(CodeType::Repeater)
    }
}

impl fmt::Display for GamesharkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X} {:04X}", self.code, self.value)
    }
}

/// Error parsing a code from text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseCodeError {
    /// Not two whitespace separated fields.
    Shape,
    /// A field is not 8 (code) or 4 (value) hex digits.
    Hex(String),
}

impl fmt::Display for ParseCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape => write!(f, "expected `XXXXXXXX YYYY`"),
            Self::Hex(field) => write!(f, "invalid hex field `{field}`"),
        }
    }
}

impl std::error::Error for ParseCodeError {}

fn parse_hex<T>(
    field: &str,
    digits: usize,
    parse: fn(&str, u32) -> Result<T, std::num::ParseIntError>,
) -> Result<T, ParseCodeError> {
    if field.len() != digits {
        return Err(ParseCodeError::Hex(field.to_owned()));
    }
    parse(field, 16).map_err(|_| ParseCodeError::Hex(field.to_owned()))
}

impl FromStr for GamesharkCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let (Some(code), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(ParseCodeError::Shape);
        };
        Ok(Self::new(
            parse_hex(code, 8, u32::from_str_radix)?,
            parse_hex(value, 4, u16::from_str_radix)?,
        ))
    }
}

/// A `50` code: repeat the next write `count` times.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Repeater {
    pub count: u8,
    pub address_step: u8,
    pub value_step: i16,
}

impl Repeater {
    /// Interpret `code` as a repeater. Returns `None` for any other type.
    pub fn from_code(code: GamesharkCode) -> Option<Self> {
        if !code.is_repeater() {
            return None;
        }
        Some(Self {
            count: (code.address() >> 8) as u8,
            address_step: code.address() as u8,
            value_step: code.value() as i16,
        })
    }

    pub fn to_code(self) -> GamesharkCode {
        GamesharkCode::with_type(
            CodeType::Repeater,
            ((self.count as u32) << 8) | self.address_step as u32,
            self.value_step as u16,
        )
    }
}

/// Flatten repeaters into the codes they stand for.
///
/// A conditional code guards exactly the next write, so it is re-emitted in
/// front of every write a repeater expands into.
pub fn expand_repeaters<I>(codes: I) -> Vec<GamesharkCode>
where
    I: IntoIterator<Item = GamesharkCode>,
{
    let mut out = Vec::new();
    let mut condition: Option<GamesharkCode> = None;
    let mut repeater: Option<Repeater> = None;

    for code in codes {
        if let Some(rep) = repeater.take() {
            let ty = code.code_type();
            for i in 0..rep.count as u32 {
                if let Some(cond) = condition {
                    out.push(cond);
                }
                let address = code.address().wrapping_add(i * rep.address_step as u32);
                let value = code
                    .value()
                    .wrapping_add((i as u16).wrapping_mul(rep.value_step as u16));
                out.push(GamesharkCode::new(
                    (code.code() & !ADDRESS_MASK) | (address & ADDRESS_MASK),
                    value,
                ));
            }
            if ty.is_some_and(|t| !t.can_be_repeated()) {
                log::warn!("repeater applied to non-write code {code}");
            }
            condition = None;
            continue;
        }

        if let Some(rep) = Repeater::from_code(code) {
            repeater = Some(rep);
            continue;
        }

        if code.is_conditional() {
            condition = Some(code);
            continue;
        }

        if let Some(cond) = condition.take() {
            out.push(cond);
        }
        out.push(code);
    }

    if repeater.is_some() {
        log::warn!("trailing repeater with nothing to repeat");
    }
    if let Some(cond) = condition {
        out.push(cond);
    }
    out
}

/// Two `81` writes per instruction word, high half first.
pub fn from_words(ram: u32, words: &[u32]) -> Vec<GamesharkCode> {
    words
        .iter()
        .enumerate()
        .flat_map(|(i, word)| {
            let addr = ram.wrapping_add(i as u32 * 4);
            [
                GamesharkCode::with_type(CodeType::Write16, addr, (word >> 16) as u16),
                GamesharkCode::with_type(CodeType::Write16, addr.wrapping_add(2), *word as u16),
            ]
        })
        .collect()
}

/// Upper half of `addiu zero,zero,imm`. Written over a zeroed word it
/// yields a no-op whatever the lower half holds.
const NOP_UPPER: u16 = 0x2400;

fn is_zero_write16(code: GamesharkCode) -> bool {
    code.value() == 0 && code.code_type().is_some_and(CodeType::is_write16)
}

fn same_type(a: GamesharkCode, b: GamesharkCode) -> bool {
    a.code() >> 24 == b.code() >> 24
}

/// Replace each pair of half-word writes that zero an aligned word with a
/// single write of [`NOP_UPPER`] to its upper half.
///
/// A pair whose first code is guarded by a conditional is left alone, since
/// merging would put the second write under the condition too.
pub fn nop_optimize(codes: &[GamesharkCode]) -> Vec<GamesharkCode> {
    let mut out = Vec::with_capacity(codes.len());
    let mut i = 0;
    while i < codes.len() {
        let code = codes[i];
        let guarded = i > 0 && codes[i - 1].is_conditional();
        let zeroes_word = codes.get(i + 1).is_some_and(|&next| {
            !guarded
                && code.address() & 3 == 0
                && is_zero_write16(code)
                && is_zero_write16(next)
                && same_type(code, next)
                && next.address() == code.address() + 2
        });
        if zeroes_word {
            out.push(GamesharkCode::new(code.code(), NOP_UPPER));
            i += 2;
        } else {
            out.push(code);
            i += 1;
        }
    }
    out
}

/// Shortest run worth a repeater: two codes in, two codes out otherwise.
const MIN_RUN: usize = 3;

/// The repeater covering the run of evenly spaced writes at the front of
/// `codes`, if it is long enough.
fn run_at(codes: &[GamesharkCode]) -> Option<Repeater> {
    let (&first, &second) = (codes.first()?, codes.get(1)?);
    if !first.code_type().is_some_and(CodeType::can_be_repeated) || !same_type(first, second) {
        return None;
    }
    let address_step = second.address().checked_sub(first.address())?;
    if !(1..=0xFF).contains(&address_step) {
        return None;
    }
    let value_step = second.value().wrapping_sub(first.value());

    let mut count = 2;
    while count < codes.len() && count < u8::MAX as usize {
        let (prev, next) = (codes[count - 1], codes[count]);
        if !same_type(first, next)
            || next.address() != prev.address() + address_step
            || next.value().wrapping_sub(prev.value()) != value_step
        {
            break;
        }
        count += 1;
    }

    (count >= MIN_RUN).then_some(Repeater {
        count: count as u8,
        address_step: address_step as u8,
        value_step: value_step as i16,
    })
}

/// Compress runs of evenly spaced writes into `50` repeaters.
///
/// Repeaters already in `codes` are expanded first. A conditional and the
/// code it guards are copied through unchanged. Runs longer than 255 are
/// split.
pub fn optimize<I>(codes: I) -> Vec<GamesharkCode>
where
    I: IntoIterator<Item = GamesharkCode>,
{
    let flat = expand_repeaters(codes);
    let mut out = Vec::with_capacity(flat.len());
    let mut i = 0;
    while i < flat.len() {
        let code = flat[i];
        if code.is_conditional() {
            let end = (i + 2).min(flat.len());
            out.extend_from_slice(&flat[i..end]);
            i = end;
            continue;
        }
        match run_at(&flat[i..]) {
            Some(rep) => {
                log::debug!("{} writes from {code} folded into a repeater", rep.count);
                out.push(rep.to_code());
                out.push(code);
                i += rep.count as usize;
            },
            None => {
                out.push(code);
                i += 1;
            },
        }
    }
    out
}

/// Codes that write `words` at `ram`, as compact as the code set allows.
pub fn patch_codes(ram: u32, words: &[u32]) -> Vec<GamesharkCode> {
    optimize(nop_optimize(&from_words(ram, words)))
}
