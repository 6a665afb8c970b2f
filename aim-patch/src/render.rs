//! Text output for the subcommands.

use std::fmt::Write;

use aim_invert::pad::{LAYOUT, OsContPad};
use aim_invert::site::HookLayout;
use aim_invert::trampoline::Trampoline;
use anyhow::{Context, Result};

use crate::gameshark::{self, GamesharkCode};

fn trampoline(layout: &HookLayout) -> Result<Trampoline> {
    layout
        .call_trampoline()
        .context("cannot build call-site trampoline")
}

/// One line per patched word: `ROM RAM WORD  disassembly`.
pub fn listing(layout: &HookLayout) -> Result<String> {
    let trampoline = trampoline(layout)?;
    let mut out = String::new();

    writeln!(
        out,
        "# call site          ram {:#010x} rom {:#010x}",
        layout.call_site.ram, layout.call_site.rom
    )?;
    writeln!(
        out,
        "# interceptor        ram {:#010x} rom {:#010x}",
        layout.hook_site.ram, layout.hook_site.rom
    )?;
    writeln!(out, "# osContGetReadData  {:#010x}", layout.original_routine)?;
    writeln!(out, "# pad buffer         {:#010x}", layout.pad_address)?;

    for ((site, insn), word) in trampoline.iter().zip(trampoline.words()) {
        writeln!(out, "0x{:08X} 0x{:08X} {word:08X}  {insn}", site.rom, site.ram)?;
    }
    Ok(out)
}

/// Write codes that splice the trampoline into RAM.
pub fn gameshark_codes(layout: &HookLayout) -> Result<Vec<GamesharkCode>> {
    let trampoline = trampoline(layout)?;
    Ok(gameshark::patch_codes(trampoline.site.ram, &trampoline.words()))
}

fn code_lines(codes: &[GamesharkCode]) -> Result<String> {
    let mut out = String::new();
    for code in codes {
        writeln!(out, "{code}")?;
    }
    Ok(out)
}

pub fn gameshark(layout: &HookLayout) -> Result<String> {
    code_lines(&gameshark_codes(layout)?)
}

/// Parse a code list, one `XXXXXXXX YYYY` per line. Blank lines and lines
/// starting with `#` are skipped.
pub fn parse_codes(text: &str) -> Result<Vec<GamesharkCode>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            line.parse::<GamesharkCode>()
                .with_context(|| format!("line {n}: cannot parse `{line}`"))
        })
        .collect()
}

/// Re-pack an existing code list with repeaters.
pub fn optimize(text: &str) -> Result<String> {
    let codes = parse_codes(text)?;
    let before = codes.len();
    let codes = gameshark::optimize(codes);
    log::info!("{before} codes in, {} out", codes.len());
    code_lines(&codes)
}

/// The controller record's byte layout.
pub fn layout_table() -> Result<String> {
    let mut out = String::new();
    writeln!(out, "OsContPad ({} bytes, big-endian)", OsContPad::SIZE)?;
    writeln!(out, "offset  width  field    type")?;
    for field in LAYOUT {
        let sign = if field.signed { 'i' } else { 'u' };
        let ty = format!("{sign}{}", field.width * 8);
        writeln!(
            out,
            "{:<7} {:<6} {:<8} {ty}",
            field.offset, field.width, field.name
        )?;
    }
    Ok(out)
}
