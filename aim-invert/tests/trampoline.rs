use aim_invert::site::{DEFAULT_LAYOUT, HookLayout, PatchSite};
use aim_invert::trampoline::{EncodeError, Instruction};

#[test]
fn stock_call_site_words() {
    let trampoline = DEFAULT_LAYOUT.call_trampoline().unwrap();
    assert_eq!(trampoline.words(), [0x3C04_8010, 0x0C02_B110, 0x2484_B0C0]);
    assert_eq!(
        trampoline.to_be_bytes(),
        [
            0x3C, 0x04, 0x80, 0x10, 0x0C, 0x02, 0xB1, 0x10, 0x24, 0x84, 0xB0, 0xC0
        ]
    );
}

#[test]
fn stock_call_site_disassembly() {
    let trampoline = DEFAULT_LAYOUT.call_trampoline().unwrap();
    let lines: Vec<_> = trampoline
        .iter()
        .map(|(site, insn)| format!("{:08X} {insn}", site.ram))
        .collect();
    assert_eq!(
        lines,
        [
            "800431B0 lui a0,0x8010",
            "800431B4 jal 0x800ac440",
            "800431B8 addiu a0,a0,-20288",
        ]
    );
}

#[test]
fn sites_advance_per_word() {
    let trampoline = DEFAULT_LAYOUT.call_trampoline().unwrap();
    let roms: Vec<_> = trampoline.iter().map(|(site, _)| site.rom).collect();
    assert_eq!(roms, [0x0004_3DB0, 0x0004_3DB4, 0x0004_3DB8]);
}

#[test]
fn hook_out_of_reach() {
    let layout = HookLayout {
        hook_site: PatchSite::new(0xA000_0000, 0x1000),
        ..DEFAULT_LAYOUT
    };
    assert_eq!(
        layout.call_trampoline(),
        Err(EncodeError::OutOfRegion {
            delay_slot: 0x8004_31B8,
            target: 0xA000_0000,
        })
    );
}

#[test]
fn unaligned_hook() {
    let layout = HookLayout {
        hook_site: PatchSite::new(0x800A_C442, 0x000A_D042),
        ..DEFAULT_LAYOUT
    };
    assert_eq!(
        layout.call_trampoline(),
        Err(EncodeError::Unaligned(0x800A_C442))
    );
}

#[test]
fn low_half_without_carry() {
    let layout = HookLayout {
        pad_address: 0x8012_3456,
        ..DEFAULT_LAYOUT
    };
    let trampoline = layout.call_trampoline().unwrap();
    assert_eq!(
        trampoline.instructions[0],
        Instruction::Lui {
            rt: aim_invert::trampoline::Register::A0,
            imm: 0x8012
        }
    );
    assert_eq!(trampoline.words()[2], 0x2484_3456);
}
