//! The controller-read interceptor.
//!
//! [`Interceptor::poll`] stands in for the firmware's read routine: it
//! forwards the caller's record to the original routine unchanged, then
//! negates `stick_y` if the hold mask is pressed. There is no validation
//! and no error path. The record is the only thing touched.
//!
//! # Example
//!
//! ```
//! use aim_invert::hook::{Interceptor, NegationPolicy};
//! use aim_invert::pad::{ContButtons, OsContPad};
//!
//! let mut hook = Interceptor::new(|pad: &mut OsContPad| {
//!     *pad = OsContPad::new(ContButtons::R, 0, -128);
//! })
//! .negation(NegationPolicy::Saturate);
//!
//! let mut pad = OsContPad::default();
//! hook.poll(&mut pad);
//! assert_eq!(pad.stick_y, 127);
//! ```

use crate::pad::{ContButtons, OsContPad};

/// Button that inverts the aim axis while held.
pub const DEFAULT_HOLD: ContButtons = ContButtons::R;

/// The original routine that fills a controller record.
pub trait ReadController {
    /// Populate `pad` with the current controller state.
    fn read(&mut self, pad: &mut OsContPad);
}

impl<F> ReadController for F
where
    F: FnMut(&mut OsContPad),
{
    #[inline]
    fn read(&mut self, pad: &mut OsContPad) {
        self(pad)
    }
}

/// What to do when the axis holds `i8::MIN`, whose negation is not
/// representable.
///
/// The firmware patch this hook reproduces negates through `int` and
/// truncates back to `signed char`, so `-128` stays `-128`. That is
/// [`Wrap`](Self::Wrap), the default. [`Saturate`](Self::Saturate) clamps to
/// `127` instead and therefore differs from the stock patch at that one
/// value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NegationPolicy {
    #[default]
    Wrap,
    Saturate,
}

impl NegationPolicy {
    #[inline]
    pub const fn negate(self, value: i8) -> i8 {
        match self {
            Self::Wrap => value.wrapping_neg(),
            Self::Saturate => value.saturating_neg(),
        }
    }
}

/// Negate `stick_y` in place if every button in `hold` is pressed.
///
/// An empty `hold` mask is never held. `button` and `stick_x` are never
/// modified.
#[inline]
pub fn invert_aim(pad: &mut OsContPad, hold: ContButtons, policy: NegationPolicy) {
    if !hold.is_empty() && pad.is_held(hold) {
        pad.stick_y = policy.negate(pad.stick_y);
    }
}

/// Replacement for the firmware's controller-read routine.
///
/// Holds no per-poll state; the same interceptor can serve every frame.
pub struct Interceptor<R> {
    original: R,
    hold: ContButtons,
    policy: NegationPolicy,
}

impl<R: ReadController> Interceptor<R> {
    /// Wrap `original` with the default hold button and [`NegationPolicy::Wrap`].
    pub const fn new(original: R) -> Self {
        Self {
            original,
            hold: DEFAULT_HOLD,
            policy: NegationPolicy::Wrap,
        }
    }

    /// Use a different button mask. All bits in `mask` must be held; an
    /// empty mask disables the inversion.
    pub const fn hold(mut self, mask: ContButtons) -> Self {
        self.hold = mask;
        self
    }

    pub const fn negation(mut self, policy: NegationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read the controller through the original routine, then apply the
    /// inversion.
    pub fn poll(&mut self, pad: &mut OsContPad) {
        self.original.read(pad);
        invert_aim(pad, self.hold, self.policy);
    }

    /// The wrapped original routine.
    pub fn original(&self) -> &R {
        &self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(bits: u16, x: i8, y: i8) -> OsContPad {
        OsContPad::new(ContButtons::from_bits_retain(bits), x, y)
    }

    #[test]
    fn wrap_matches_stock_patch_at_minimum() {
        assert_eq!(NegationPolicy::Wrap.negate(-128), -128);
        assert_eq!(NegationPolicy::Saturate.negate(-128), 127);
        assert_eq!(NegationPolicy::Wrap.negate(127), -127);
        assert_eq!(NegationPolicy::Saturate.negate(0), 0);
    }

    #[test]
    fn untouched_without_hold() {
        let mut p = pad(0x8000 | 0x0020, 3, 44);
        invert_aim(&mut p, DEFAULT_HOLD, NegationPolicy::Wrap);
        assert_eq!(p, pad(0x8020, 3, 44));
    }

    #[test]
    fn original_runs_exactly_once() {
        let mut calls = 0;
        let mut hook = Interceptor::new(|p: &mut OsContPad| {
            calls += 1;
            *p = pad(0x0010, 1, 2);
        });
        let mut p = OsContPad::default();
        hook.poll(&mut p);
        drop(hook);
        assert_eq!(calls, 1);
        assert_eq!(p, pad(0x0010, 1, -2));
    }

    #[test]
    fn original_sees_record_before_inversion() {
        let mut seen = None;
        let mut hook = Interceptor::new(|p: &mut OsContPad| {
            seen = Some(*p);
            p.button = ContButtons::R;
        });
        let mut p = pad(0x0010, 7, 9);
        hook.poll(&mut p);
        drop(hook);
        assert_eq!(seen, Some(pad(0x0010, 7, 9)));
        assert_eq!(p.stick_y, -9);
    }

    #[test]
    fn empty_mask_never_inverts() {
        let mut hook = Interceptor::new(|p: &mut OsContPad| *p = pad(0xFFFF, 5, 60))
            .hold(ContButtons::empty());
        let mut p = OsContPad::default();
        hook.poll(&mut p);
        assert_eq!(p, pad(0xFFFF, 5, 60));

        let mut p = pad(0x0000, 0, -9);
        invert_aim(&mut p, ContButtons::empty(), NegationPolicy::Saturate);
        assert_eq!(p.stick_y, -9);
    }

    #[test]
    fn custom_hold_mask() {
        let mut hook = Interceptor::new(|p: &mut OsContPad| *p = pad(0x2010, 0, 20))
            .hold(ContButtons::Z | ContButtons::R);
        let mut p = OsContPad::default();
        hook.poll(&mut p);
        assert_eq!(p.stick_y, -20);

        let mut hook = Interceptor::new(|p: &mut OsContPad| *p = pad(0x0010, 0, 20))
            .hold(ContButtons::Z | ContButtons::R);
        hook.poll(&mut p);
        assert_eq!(p.stick_y, 20);
    }
}
