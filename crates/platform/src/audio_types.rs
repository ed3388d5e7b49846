//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions keep unvalidated numbers away from the
//! clock hardware:
//! - `SampleRateHz`: validates the LRCLK rate before any register is touched
//! - `BCLK_PER_LRCLK`: the fixed I2S frame width used to derive BCLK

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{value} is outside the supported range {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── Frame geometry ───────────────────────────────────────────────────────────

/// Bit clocks per LRCLK period: two 32-bit slots (left + right).
///
/// BCLK = 64 × fs is the conventional I2S frame for 32-bit slot DACs.
pub const BCLK_PER_LRCLK: u32 = 64;

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample (LRCLK) rate in Hz, validated before the BCLK is derived from it.
///
/// Lower bound is 8000 Hz (telephony). The upper bound is whatever keeps
/// `64 × fs` representable in a `u32`; the divider calculator rejects rates
/// the PLL cannot reach long before that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Largest sample rate whose 64× bit clock still fits in a `u32`.
    pub const MAX_HZ: u32 = u32::MAX / BCLK_PER_LRCLK;

    /// Create a `SampleRateHz`, returning an error if out of range.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > MAX_HZ`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Bit clock for this sample rate: `64 × fs`.
    ///
    /// Cannot overflow: `new()` caps the rate at `u32::MAX / 64`.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn bit_clock_hz(self) -> u32 {
        self.0 * BCLK_PER_LRCLK
    }
}
