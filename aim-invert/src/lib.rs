//! Controller-poll interceptor for an N64 ROM patch.
//!
//! The firmware calls `osContGetReadData` once per frame to fill an
//! [`OsContPad`](pad::OsContPad). A three-instruction trampoline at the
//! original call site redirects that call into [`firmware::interceptor`],
//! which forwards to the original routine and then flips the vertical stick
//! axis while the R trigger is held.
//!
//! Everything except the exported symbol is target independent, so the
//! transformation can be exercised on the host with a stub standing in for
//! the firmware routine:
//!
//! ```
//! use aim_invert::hook::Interceptor;
//! use aim_invert::pad::{ContButtons, OsContPad};
//!
//! let mut hook = Interceptor::new(|pad: &mut OsContPad| {
//!     *pad = OsContPad::new(ContButtons::R, 10, 50);
//! });
//!
//! let mut pad = OsContPad::default();
//! hook.poll(&mut pad);
//! assert_eq!(pad.stick_y, -50);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod firmware;
pub mod hook;
pub mod pad;
pub mod site;
pub mod trampoline;

pub use hook::{Interceptor, NegationPolicy, ReadController, invert_aim};
pub use pad::{ContButtons, OsContPad};
pub use site::{DEFAULT_LAYOUT, HookLayout, PatchSite};
