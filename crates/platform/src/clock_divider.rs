//! Fractional clock-divider derivation for the clock manager.
//!
//! Every clock generator divides its PLL source by a 12.12 fixed-point
//! value written to its DIV register:
//!
//! ```text
//!   f_out = f_source / (DIVI + DIVF / 4096)
//! ```
//!
//! # Derivation
//!
//!   divisor = source_khz × 1000 / target_hz      (f64)
//!   DIVI    = trunc(divisor)
//!   DIVF    = trunc((divisor − DIVI) × 4096)
//!
//! DIVF is truncated rather than rounded. This biases the output frequency
//! slightly high (the divisor is at most 1/4096 too small), which matches the
//! long-standing behaviour boards were characterised against.
//!
//! # Worked examples (Pi 4, PLLD = 750 MHz)
//!
//!   MCLK 12.288 MHz:  divisor = 61.03515625  → DIVI 61,  DIVF 144
//!   BCLK 3.072 MHz:   divisor = 244.140625   → DIVI 244, DIVF 576
//!
//! Both are exact: 750 MHz / (61 + 144/4096) = 12 288 000 Hz.
//!
//! # Range
//!
//! DIVI is a 12-bit field and MASH stage 1 requires DIVI >= 2, so the
//! reachable band is roughly `source / 4096 .. source / 2`. Anything outside
//! is rejected before it can reach the hardware.

/// Scale of the fractional field: DIVF counts 1/4096ths.
pub const DIVF_SCALE: u32 = 4096;
/// Smallest integer divider accepted with MASH stage 1.
pub const DIVI_MIN: u32 = 2;
/// Largest value of the 12-bit DIVI field.
pub const DIVI_MAX: u32 = 0xFFF;
/// Largest value of the 12-bit DIVF field.
pub const DIVF_MAX: u32 = 0xFFF;

/// Divider values that cannot be represented in the DIV register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DividerError {
    /// Integer part outside `2..=4095`: the target is too fast or too slow
    /// for the source clock.
    #[error("invalid integer divider: {0} (must be 2..=4095)")]
    IntegerOutOfRange(u32),
    /// Fractional part outside `0..=4095`.
    #[error("invalid fractional divider: {0} (must be 0..=4095)")]
    FractionalOutOfRange(u32),
}

/// A validated DIVI/DIVF pair.
///
/// Can only be built through [`ClockDivider::new`] or
/// [`ClockDivider::for_target`], so every instance fits the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDivider {
    integer: u16,
    fractional: u16,
}

impl ClockDivider {
    /// Build a divider from raw parts, checking both 12-bit field ranges.
    ///
    /// # Errors
    ///
    /// [`DividerError::IntegerOutOfRange`] if `integer` is not in `2..=4095`,
    /// [`DividerError::FractionalOutOfRange`] if `fractional > 4095`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(integer: u32, fractional: u32) -> Result<Self, DividerError> {
        if !(DIVI_MIN..=DIVI_MAX).contains(&integer) {
            return Err(DividerError::IntegerOutOfRange(integer));
        }
        if fractional > DIVF_MAX {
            return Err(DividerError::FractionalOutOfRange(fractional));
        }
        // Both fit in 12 bits after the checks above.
        Ok(Self {
            integer: integer as u16,
            fractional: fractional as u16,
        })
    }

    /// Derive the divider that brings `source_khz` down to `target_hz`.
    ///
    /// Pure and deterministic. A `target_hz` of zero yields an infinite
    /// divisor, which saturates and is rejected as out of range.
    ///
    /// # Errors
    ///
    /// Returns [`DividerError`] if the required divider is not representable.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::arithmetic_side_effects
    )]
    pub fn for_target(source_khz: u32, target_hz: u32) -> Result<Self, DividerError> {
        let divisor = f64::from(source_khz) * 1000.0 / f64::from(target_hz);
        // `as` saturates (and maps NaN to 0), so out-of-band divisors land
        // outside the valid range instead of wrapping into it.
        let integer = divisor as u32;
        if !(DIVI_MIN..=DIVI_MAX).contains(&integer) {
            return Err(DividerError::IntegerOutOfRange(integer));
        }
        let fractional = ((divisor - f64::from(integer)) * f64::from(DIVF_SCALE)) as u32;
        Self::new(integer, fractional)
    }

    /// Integer part (DIVI).
    pub fn integer(self) -> u32 {
        u32::from(self.integer)
    }

    /// Fractional part (DIVF), in 1/4096ths.
    pub fn fractional(self) -> u32 {
        u32::from(self.fractional)
    }

    /// DIV register payload without the password byte.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn register_payload(self) -> u32 {
        use crate::clock_config::{CLK_DIV_DIVF_SHIFT, CLK_DIV_DIVI_SHIFT};
        (self.integer() << CLK_DIV_DIVI_SHIFT) | (self.fractional() << CLK_DIV_DIVF_SHIFT)
    }

    /// Frequency this divider actually produces from `source_khz`, in Hz.
    ///
    /// Exact integer arithmetic: `source_hz × 4096 / (DIVI × 4096 + DIVF)`.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    pub fn output_hz(self, source_khz: u32) -> u32 {
        let source_hz = u64::from(source_khz) * 1000;
        let scaled_divisor =
            u64::from(self.integer()) * u64::from(DIVF_SCALE) + u64::from(self.fractional());
        // DIVI >= 2, so the result is at most source_hz / 2 and fits in u32
        // for any source_khz below ~8.5 GHz.
        (source_hz * u64::from(DIVF_SCALE) / scaled_divisor) as u32
    }
}

impl core::fmt::Display for ClockDivider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "I={} F={}", self.integer, self.fractional)
    }
}
