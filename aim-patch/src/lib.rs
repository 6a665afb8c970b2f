//! Host-side rendering of the aim-invert patch.
//!
//! Reads a [`PatchConfig`](config::PatchConfig), builds the call-site
//! trampoline with [`aim_invert`], and renders it for the tools people
//! actually apply patches with: an address listing for ROM patchers and
//! GameShark codes for cartridge cheat devices.

pub mod config;
pub mod gameshark;
pub mod render;
