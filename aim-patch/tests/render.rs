use aim_invert::site::DEFAULT_LAYOUT;
use aim_patch::config::PatchConfig;
use aim_patch::gameshark::{self, CodeType, GamesharkCode};
use aim_patch::render;

#[test]
fn stock_listing() {
    let text = render::listing(&DEFAULT_LAYOUT).unwrap();
    let body: Vec<_> = text.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        body,
        [
            "0x00043DB0 0x800431B0 3C048010  lui a0,0x8010",
            "0x00043DB4 0x800431B4 0C02B110  jal 0x800ac440",
            "0x00043DB8 0x800431B8 2484B0C0  addiu a0,a0,-20288",
        ]
    );
    assert!(text.contains("# osContGetReadData  0x80097dd4"));
}

#[test]
fn stock_gameshark() {
    let text = render::gameshark(&DEFAULT_LAYOUT).unwrap();
    assert_eq!(
        text,
        "810431B0 3C04\n\
         810431B2 8010\n\
         810431B4 0C02\n\
         810431B6 B110\n\
         810431B8 2484\n\
         810431BA B0C0\n"
    );
}

#[test]
fn gameshark_output_reparses() {
    let codes = render::gameshark_codes(&DEFAULT_LAYOUT).unwrap();
    let text = render::gameshark(&DEFAULT_LAYOUT).unwrap();
    let parsed: Vec<GamesharkCode> = text.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(parsed, codes);
    assert!(
        parsed
            .iter()
            .all(|c| c.code_type() == Some(CodeType::Write16))
    );
    assert_eq!(gameshark::expand_repeaters(parsed.clone()), parsed);
}

#[test]
fn layout_table() {
    let text = render::layout_table().unwrap();
    let rows: Vec<Vec<&str>> = text
        .lines()
        .skip(2)
        .map(|l| l.split_whitespace().collect())
        .collect();
    assert_eq!(
        rows,
        [
            ["0", "2", "button", "u16"],
            ["2", "1", "stick_x", "i8"],
            ["3", "1", "stick_y", "i8"],
        ]
    );
}

#[test]
fn custom_config_moves_hook() {
    let config = PatchConfig::from_toml(
        r#"
        pad_address = 0x80123456

        [hook_site]
        ram = 0x800B0000
        "#,
    )
    .unwrap();
    let layout = config.layout().unwrap();
    let text = render::listing(&layout).unwrap();
    assert!(text.contains("0x00043DB0 0x800431B0 3C048012  lui a0,0x8012"));
    assert!(text.contains("jal 0x800b0000"));
    assert!(text.contains("addiu a0,a0,13398"));
}

#[test]
fn unreachable_hook_is_an_error() {
    let config = PatchConfig::from_toml(
        r#"
        [hook_site]
        ram = 0x90000000
        rom = 0x00200000
        "#,
    )
    .unwrap();
    let layout = config.layout().unwrap();
    let err = render::listing(&layout).unwrap_err();
    assert!(format!("{err:#}").contains("not reachable"));
}

#[test]
fn loads_shipped_config() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("stock.toml");
    let config = PatchConfig::load(&path).unwrap();
    assert_eq!(config.layout().unwrap(), DEFAULT_LAYOUT);
}

#[test]
fn optimize_code_list() {
    let text = "\
        # fill a table\n\
        80100000 0001\n\
        80100001 0002\n\
        80100002 0003\n\
        \n\
        D00FB0C0 0010\n\
        81100010 0000\n";
    assert_eq!(
        render::optimize(text).unwrap(),
        "50000301 0001\n\
         80100000 0001\n\
         D00FB0C0 0010\n\
         81100010 0000\n"
    );
}

#[test]
fn optimize_expands_before_repacking() {
    let text = "50000202 0000\n81100000 0000\n81100004 0000\n";
    assert_eq!(render::optimize(text).unwrap(), "50000302 0000\n81100000 0000\n");
}

#[test]
fn optimize_reports_bad_line() {
    let err = render::optimize("81100000 0000\n\n8110000 0000\n").unwrap_err();
    assert!(format!("{err:#}").contains("line 3"));
}
