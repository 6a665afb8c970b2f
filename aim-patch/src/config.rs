//! Patch configuration loaded from TOML.
//!
//! ```toml
//! pad_address = 0x800FB0C0
//!
//! [call_site]
//! ram = 0x800431B0
//! rom = 0x00043DB0
//!
//! [hook_site]
//! ram = 0x800AC440
//! # rom omitted: derived from the boot segment
//! ```
//!
//! Every key is optional; anything missing falls back to the stock layout.
//! The address of `osContGetReadData` is not configurable: the hook is
//! linked against [`DEFAULT_LAYOUT`]'s `original_routine`, so the tool always
//! reports that one.

use std::path::Path;

use aim_invert::site::{BOOT_SEGMENT, DEFAULT_LAYOUT, HookLayout, PatchSite};
use anyhow::{Context, Result, bail};
use serde_derive::Deserialize;

/// A patch site as written in the config file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    pub ram: u32,
    /// ROM offset. Derived from the boot segment when omitted.
    #[serde(default)]
    pub rom: Option<u32>,
}

impl From<PatchSite> for SiteConfig {
    fn from(site: PatchSite) -> Self {
        Self {
            ram: site.ram,
            rom: Some(site.rom),
        }
    }
}

impl SiteConfig {
    fn resolve(self, name: &str) -> Result<PatchSite> {
        let site = match self.rom {
            Some(rom) => {
                let site = PatchSite::new(self.ram, rom);
                if !BOOT_SEGMENT.maps(site) {
                    log::warn!(
                        "{name}: ram {:#010x} / rom {:#010x} is not in the boot segment mapping",
                        site.ram,
                        site.rom
                    );
                }
                site
            },
            None => BOOT_SEGMENT.site_for_ram(self.ram).with_context(|| {
                format!(
                    "{name}: ram {:#010x} is outside the boot segment, give `rom` explicitly",
                    self.ram
                )
            })?,
        };

        if !site.is_word_aligned() {
            bail!(
                "{name}: ram {:#010x} / rom {:#010x} is not word aligned",
                site.ram,
                site.rom
            );
        }
        log::debug!("{name}: ram {:#010x} rom {:#010x}", site.ram, site.rom);
        Ok(site)
    }
}

/// Addresses the patch is built from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchConfig {
    /// Pad buffer passed in `a0` at the call site.
    pub pad_address: u32,
    pub call_site: SiteConfig,
    pub hook_site: SiteConfig,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            pad_address: DEFAULT_LAYOUT.pad_address,
            call_site: DEFAULT_LAYOUT.call_site.into(),
            hook_site: DEFAULT_LAYOUT.hook_site.into(),
        }
    }
}

impl PatchConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid patch config")
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Resolve and validate into a [`HookLayout`].
    pub fn layout(&self) -> Result<HookLayout> {
        let call_site = self.call_site.resolve("call_site")?;
        let hook_site = self.hook_site.resolve("hook_site")?;

        if self.pad_address & 1 != 0 {
            bail!(
                "pad_address {:#010x} is not aligned for a controller record",
                self.pad_address
            );
        }

        Ok(HookLayout {
            call_site,
            hook_site,
            original_routine: DEFAULT_LAYOUT.original_routine,
            pad_address: self.pad_address,
        })
    }
}
