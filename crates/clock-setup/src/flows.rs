//! What each tool does, end to end.
//!
//! Every configuration check (sample rate, board family, divider range)
//! runs before `/dev/mem` is opened, so a bad request never writes a
//! register. The hardware-facing steps are generic over
//! [`RegisterBlock`] and [`DelayNs`] and run unchanged against mocks.
//!
//! ## Flow A (`setup-i2s-rate`)
//! ```text
//! validate rate → identify board → plan PCM divider → map → reprogram PCM
//! ```
//!
//! ## Flow B (`setup-mclk`)
//! ```text
//! identify board → plan GPCLK0 divider → map → reprogram GPCLK0 → GPIO4 = ALT0
//! identify board → map → GPIO4 = INPUT                           (--disable)
//! ```

use std::fmt;
use std::path::Path;

use anyhow::Context;
use embedded_hal::delay::DelayNs;
use platform::audio_types::SampleRateHz;
use platform::clock_config::{ClockGenerator, MCLK_TARGET_HZ};
use platform::clock_divider::{ClockDivider, DividerError};
use platform::clock_sequencer::{ClockError, ClockSequencer};
use platform::delay::ThreadDelay;
use platform::gpio::{set_pin_mode, PinMode, MCLK_PIN};
use platform::mmio::{PeripheralMap, Peripherals};
use platform::registers::{RegisterBlock, RegisterError};
use platform::revision::{self, PeripheralLayout};

use crate::cli::{HardwareArgs, I2sRateArgs, MclkArgs};

/// A fully derived clock configuration, checked before any hardware access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPlan {
    /// Board the plan was made for.
    pub layout: PeripheralLayout,
    /// Generator to reprogram.
    pub generator: ClockGenerator,
    /// Requested output frequency in Hz.
    pub target_hz: u32,
    /// Divider that will be written.
    pub divider: ClockDivider,
}

impl ClockPlan {
    /// Plan an arbitrary output on `generator`.
    pub fn new(
        layout: PeripheralLayout,
        generator: ClockGenerator,
        target_hz: u32,
    ) -> Result<Self, DividerError> {
        let divider = ClockDivider::for_target(layout.pll_source_khz, target_hz)?;
        Ok(Self {
            layout,
            generator,
            target_hz,
            divider,
        })
    }

    /// PCM bit clock for `rate` (BCLK = 64 × LRCLK).
    pub fn bit_clock(layout: PeripheralLayout, rate: SampleRateHz) -> Result<Self, DividerError> {
        Self::new(layout, ClockGenerator::Pcm, rate.bit_clock_hz())
    }

    /// 12.288 MHz master clock on GPCLK0.
    pub fn master_clock(layout: PeripheralLayout) -> Result<Self, DividerError> {
        Self::new(layout, ClockGenerator::GeneralPurpose0, MCLK_TARGET_HZ)
    }

    /// Frequency the divider actually produces, in Hz.
    pub fn achieved_hz(&self) -> u32 {
        self.divider.output_hz(self.layout.pll_source_khz)
    }
}

impl fmt::Display for ClockPlan {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} kHz using PLLD ({})",
            self.achieved_hz() as f64 / 1000.0,
            self.divider
        )
    }
}

/// Read the board revision and resolve its layout.
pub fn identify_board(cpuinfo: &Path) -> anyhow::Result<PeripheralLayout> {
    let layout = revision::detect(cpuinfo)?;
    tracing::info!("{} detected", layout.family);
    Ok(layout)
}

/// Check an LRCLK request against the supported range.
pub fn validate_sample_rate(hz: u32) -> anyhow::Result<SampleRateHz> {
    SampleRateHz::new(hz).with_context(|| {
        format!(
            "invalid LRCLK frequency: {hz} Hz (minimum {} Hz)",
            SampleRateHz::MIN_HZ
        )
    })
}

/// Run the full reprogramming sequence for `plan` and start the generator.
pub fn program_clock<R, D>(
    clock: &mut R,
    delay: &mut D,
    plan: &ClockPlan,
) -> Result<ClockDivider, ClockError>
where
    R: RegisterBlock,
    D: DelayNs,
{
    ClockSequencer::new(clock, delay).reprogram(
        plan.generator,
        plan.layout.pll_source_khz,
        plan.target_hz,
        true,
    )
}

/// Start MCLK, then route it to GPIO 4.
///
/// The pin is switched only after the generator runs at the new rate.
pub fn enable_mclk<C, G, D>(
    peripherals: &mut Peripherals<C, G>,
    delay: &mut D,
    plan: &ClockPlan,
) -> Result<(), ClockError>
where
    C: RegisterBlock,
    G: RegisterBlock,
    D: DelayNs,
{
    program_clock(&mut peripherals.clock, delay, plan)?;
    set_pin_mode(&mut peripherals.gpio, MCLK_PIN, PinMode::Alt0)?;
    Ok(())
}

/// Stop driving MCLK by returning GPIO 4 to input. GPCLK0 is left as is.
pub fn disable_mclk<G>(gpio: &mut G) -> Result<(), RegisterError>
where
    G: RegisterBlock + ?Sized,
{
    set_pin_mode(gpio, MCLK_PIN, PinMode::Input)
}

fn map_peripherals(
    hardware: &HardwareArgs,
    layout: &PeripheralLayout,
) -> anyhow::Result<PeripheralMap> {
    Ok(PeripheralMap::map(&hardware.mem_device, layout.peripheral_base)?)
}

/// Flow A planning: every check that can fail without hardware.
pub fn plan_i2s_rate(args: &I2sRateArgs) -> anyhow::Result<ClockPlan> {
    let rate = validate_sample_rate(args.sample_rate)?;
    tracing::info!("Requested LRCLK: {} Hz", rate.get());

    let layout = identify_board(&args.hardware.cpuinfo)?;
    let plan = ClockPlan::bit_clock(layout, rate).context("error setting up BCLK")?;
    tracing::info!("Setting BCLK to {plan} for LRCLK {} Hz", rate.get());
    Ok(plan)
}

/// Flow A entry point.
pub fn run_i2s_rate(args: &I2sRateArgs) -> anyhow::Result<()> {
    let plan = plan_i2s_rate(args)?;
    if args.hardware.dry_run {
        tracing::info!("Dry run: no registers written");
        return Ok(());
    }

    let mut map = map_peripherals(&args.hardware, &plan.layout)?;
    program_clock(&mut map.clock, &mut ThreadDelay, &plan).context("error setting up BCLK")?;
    tracing::info!("BCLK configured for PCM interface");
    Ok(())
}

/// Flow B: what `setup-mclk` will do, resolved without touching hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MclkAction {
    /// Program GPCLK0 and route it to GPIO 4.
    Enable(ClockPlan),
    /// Return GPIO 4 to input.
    Disable(PeripheralLayout),
}

impl MclkAction {
    /// Board the action targets.
    pub fn layout(&self) -> PeripheralLayout {
        match self {
            Self::Enable(plan) => plan.layout,
            Self::Disable(layout) => *layout,
        }
    }
}

/// Flow B planning.
pub fn plan_mclk(args: &MclkArgs) -> anyhow::Result<MclkAction> {
    if args.disable {
        tracing::info!("Disabling MCLK output");
    }
    let layout = identify_board(&args.hardware.cpuinfo)?;
    if args.disable {
        return Ok(MclkAction::Disable(layout));
    }
    let plan = ClockPlan::master_clock(layout).context("error setting up MCLK")?;
    tracing::info!("Setting MCLK to {plan}");
    Ok(MclkAction::Enable(plan))
}

/// Carry out a planned MCLK action on already-mapped peripherals.
pub fn apply_mclk<C, G, D>(
    action: &MclkAction,
    peripherals: &mut Peripherals<C, G>,
    delay: &mut D,
) -> anyhow::Result<()>
where
    C: RegisterBlock,
    G: RegisterBlock,
    D: DelayNs,
{
    match action {
        MclkAction::Enable(plan) => {
            enable_mclk(peripherals, delay, plan).context("error setting up MCLK")?;
            tracing::info!("MCLK enabled on GPIO{MCLK_PIN} (pin 7)");
        }
        MclkAction::Disable(_) => {
            disable_mclk(&mut peripherals.gpio)?;
            tracing::info!("MCLK disabled");
        }
    }
    Ok(())
}

/// Flow B entry point.
pub fn run_mclk(args: &MclkArgs) -> anyhow::Result<()> {
    let action = plan_mclk(args)?;
    if args.hardware.dry_run {
        tracing::info!("Dry run: no registers written");
        return Ok(());
    }

    let mut map = map_peripherals(&args.hardware, &action.layout())?;
    apply_mclk(&action, &mut map, &mut ThreadDelay)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{MockDelay, MockRegisters, StopBehaviour};
    use platform::revision::BoardFamily;

    const CLK_WORDS: usize = 0xA8 / 4;
    const GPIO_WORDS: usize = 0xB4 / 4;

    fn mock_peripherals() -> Peripherals<MockRegisters, MockRegisters> {
        Peripherals {
            clock: MockRegisters::new(CLK_WORDS),
            gpio: MockRegisters::new(GPIO_WORDS),
        }
    }

    #[test]
    fn pi4_bit_clock_plan() {
        let rate = SampleRateHz::new(48_000).unwrap();
        let plan = ClockPlan::bit_clock(BoardFamily::Pi4.layout(), rate).unwrap();
        assert_eq!(plan.generator, ClockGenerator::Pcm);
        assert_eq!(plan.target_hz, 3_072_000);
        assert_eq!(plan.divider.to_string(), "I=244 F=576");
        assert_eq!(plan.to_string(), "3072.000 kHz using PLLD (I=244 F=576)");
    }

    #[test]
    fn pi4_master_clock_is_exact() {
        let plan = ClockPlan::master_clock(BoardFamily::Pi4.layout()).unwrap();
        assert_eq!(plan.achieved_hz(), 12_288_000);
        assert_eq!(plan.to_string(), "12288.000 kHz using PLLD (I=61 F=144)");
    }

    #[test]
    fn sample_rate_floor() {
        assert!(validate_sample_rate(8_000).is_ok());
        let err = validate_sample_rate(7_999).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid LRCLK frequency: 7999 Hz (minimum 8000 Hz)"
        );
    }

    #[test]
    fn enable_routes_pin_after_clock_runs() {
        let mut p = mock_peripherals();
        p.gpio.set_word(0, 0x0000_0249);
        let plan = ClockPlan::master_clock(BoardFamily::Pi4.layout()).unwrap();
        enable_mclk(&mut p, &mut MockDelay::new(), &plan).unwrap();

        assert_eq!(p.clock.writes().last(), Some(&(28, 0x5A00_0216)));
        assert_eq!(p.gpio.writes(), &[(0, 0x0000_4249)]);
    }

    #[test]
    fn stuck_clock_never_touches_the_pin() {
        let mut p = Peripherals {
            clock: MockRegisters::with_stop_behaviour(CLK_WORDS, StopBehaviour::Stuck),
            gpio: MockRegisters::new(GPIO_WORDS),
        };
        let plan = ClockPlan::master_clock(BoardFamily::Pi3.layout()).unwrap();
        let err = enable_mclk(&mut p, &mut MockDelay::new(), &plan).unwrap_err();
        assert!(err.is_fatal());
        assert!(p.gpio.writes().is_empty());
    }

    #[test]
    fn disable_only_touches_gpio() {
        let mut p = mock_peripherals();
        p.gpio.set_word(0, 0x0000_4249);
        apply_mclk(
            &MclkAction::Disable(BoardFamily::Pi4.layout()),
            &mut p,
            &mut MockDelay::new(),
        )
        .unwrap();
        assert!(p.clock.writes().is_empty());
        assert_eq!(p.gpio.word(0), 0x0000_0249);
    }
}
