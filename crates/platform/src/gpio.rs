//! GPIO function-select control
//!
//! Routes a clock generator's output onto a header pin, or silences it by
//! returning the pin to input.
//!
//! Each GPFSELn register holds 3-bit function fields for ten pins:
//!
//! ```text
//!   register = pin / 10
//!   shift    = (pin % 10) × 3
//! ```
//!
//! Reference: BCM2835 ARM Peripherals, §6.2 and Table 6-2.
//! GPFSEL writes are not password-protected.

use crate::registers::{RegisterBlock, RegisterError};

/// GPIO carrying GPCLK0 in [`PinMode::Alt0`] (header pin 7).
pub const MCLK_PIN: u32 = 4;

/// Width of one function-select field.
const FSEL_BITS: u32 = 3;
/// Mask of one function-select field before shifting.
const FSEL_MASK: u32 = 0b111;
/// Pins per GPFSEL register.
const PINS_PER_REGISTER: u32 = 10;

/// Pin function, encoded as the BCM2835 FSEL field value.
///
/// The alternate-function encoding is not monotonic (Alt4 = 3, Alt5 = 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Plain input; any clock routed here stops driving the pin.
    Input,
    /// Plain output.
    Output,
    /// Alternate function 0 (GPCLK0 on GPIO 4).
    Alt0,
    /// Alternate function 1.
    Alt1,
    /// Alternate function 2.
    Alt2,
    /// Alternate function 3.
    Alt3,
    /// Alternate function 4.
    Alt4,
    /// Alternate function 5.
    Alt5,
}

impl PinMode {
    /// Raw 3-bit FSEL value.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Input => 0b000,
            Self::Output => 0b001,
            Self::Alt0 => 0b100,
            Self::Alt1 => 0b101,
            Self::Alt2 => 0b110,
            Self::Alt3 => 0b111,
            Self::Alt4 => 0b011,
            Self::Alt5 => 0b010,
        }
    }
}

/// Location of one pin's function-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSelect {
    /// GPFSEL word index inside the GPIO block.
    pub register: usize,
    /// Bit position of the 3-bit field.
    pub shift: u32,
}

impl FunctionSelect {
    /// Field location for `pin`.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn for_pin(pin: u32) -> Self {
        Self {
            register: (pin / PINS_PER_REGISTER) as usize,
            shift: (pin % PINS_PER_REGISTER) * FSEL_BITS,
        }
    }

    /// Return `word` with this field replaced by `mode`, other bits untouched.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn apply(self, word: u32, mode: PinMode) -> u32 {
        (word & !(FSEL_MASK << self.shift)) | (mode.bits() << self.shift)
    }
}

/// Set `pin` to `mode` with a read-modify-write of its GPFSEL register.
///
/// The pin number is not range-checked beyond the mapped window; callers
/// pass pins that exist on the board.
pub fn set_pin_mode<R>(gpio: &mut R, pin: u32, mode: PinMode) -> Result<(), RegisterError>
where
    R: RegisterBlock + ?Sized,
{
    let fsel = FunctionSelect::for_pin(pin);
    tracing::debug!(
        pin,
        register = fsel.register,
        shift = fsel.shift,
        fsel = mode.bits(),
        "set pin mode"
    );
    gpio.modify(fsel.register, |word| fsel.apply(word, mode))
}
