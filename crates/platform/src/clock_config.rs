//! Clock-manager register map for the BCM2835 family (BCM2836/7, BCM2711).
//!
//! Encodes the control/divider register layout of the two clock generators
//! this tool drives, the write-protect password, and the stop-latency
//! budgets used when halting a running generator.
//!
//! # Background
//!
//! Each generator has a CTL word and a DIV word. The hardware ignores any
//! write whose top byte is not the password `0x5A`. Changing DIV or SRC while
//! BUSY is set glitches the output, so a generator must be killed and
//! confirmed stopped first.
//!
//! # Sources
//!
//! - BCM2835 ARM Peripherals, §6.3 "General Purpose GPIO Clocks"
//!   (CM_GPnCTL / CM_GPnDIV, MASH, BUSY, KILL, ENAB, SRC fields)
//! - The PCM clock (CM_PCMCTL / CM_PCMDIV) shares the same field layout but
//!   is not listed in that document; its word offsets are 0x98 / 0x9C.

/// Write-protect password, placed in bits 31:24 of every clock-manager write.
pub const CLK_PASSWD: u32 = 0x5A << 24;

/// CTL: MASH filter stage field (bits 10:9).
pub const CLK_CTL_MASH_SHIFT: u32 = 9;
/// CTL: BUSY status bit. Set while the generator is running or stopping.
pub const CLK_CTL_BUSY: u32 = 1 << 7;
/// CTL: KILL bit. Stops the generator immediately (asynchronously).
pub const CLK_CTL_KILL: u32 = 1 << 5;
/// CTL: ENAB bit. Starts the generator.
pub const CLK_CTL_ENAB: u32 = 1 << 4;
/// CTL: clock source field (bits 3:0).
pub const CLK_CTL_SRC_SHIFT: u32 = 0;

/// DIV: integer divider field (bits 23:12).
pub const CLK_DIV_DIVI_SHIFT: u32 = 12;
/// DIV: fractional divider field (bits 11:0).
pub const CLK_DIV_DIVF_SHIFT: u32 = 0;

/// Fixed MCLK target for the DAC: 12.288 MHz (256 × 48 kHz).
pub const MCLK_TARGET_HZ: u32 = 12_288_000;

/// Clock sources selectable in the CTL.SRC field.
///
/// Only [`ClockSource::PllD`] is used; the others document the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// 19.2 MHz crystal oscillator.
    Oscillator,
    /// PLLC per-channel output (1000 MHz, follows core frequency scaling).
    PllC,
    /// PLLD per-channel output: 500 MHz on Pi 2/3, 750 MHz on Pi 4.
    PllD,
    /// HDMI auxiliary (216 MHz).
    HdmiAux,
}

impl ClockSource {
    /// Raw CTL.SRC field value.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Oscillator => 1,
            Self::PllC => 5,
            Self::PllD => 6,
            Self::HdmiAux => 7,
        }
    }
}

/// MASH noise-shaping filter stage (CTL bits 10:9).
///
/// Stage 1 is the only setting that accepts the full DIVI range down to 2,
/// which is why the sequencer fixes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MashStage {
    /// Integer division only; DIVF is ignored.
    Integer,
    /// 1-stage MASH (equivalent to non-MASH fractional divider).
    Stage1,
    /// 2-stage MASH. Requires DIVI >= 3.
    Stage2,
    /// 3-stage MASH. Requires DIVI >= 5.
    Stage3,
}

impl MashStage {
    /// CTL.MASH field value, already shifted into place.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn bits(self) -> u32 {
        let stage = match self {
            Self::Integer => 0,
            Self::Stage1 => 1,
            Self::Stage2 => 2,
            Self::Stage3 => 3,
        };
        stage << CLK_CTL_MASH_SHIFT
    }
}

/// One of the two clock generators this tool reprograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockGenerator {
    /// GPCLK0: drives MCLK, routed to GPIO 4 in Alt0.
    GeneralPurpose0,
    /// PCM clock: drives BCLK of the PCM/I2S block.
    Pcm,
}

impl ClockGenerator {
    /// Word index of the CTL register inside the clock-manager block.
    pub const fn ctl_index(self) -> usize {
        match self {
            Self::GeneralPurpose0 => 28, // CM_GP0CTL, byte offset 0x70
            Self::Pcm => 38,             // CM_PCMCTL, byte offset 0x98
        }
    }

    /// Word index of the DIV register inside the clock-manager block.
    pub const fn div_index(self) -> usize {
        match self {
            Self::GeneralPurpose0 => 29, // CM_GP0DIV, byte offset 0x74
            Self::Pcm => 39,             // CM_PCMDIV, byte offset 0x9C
        }
    }

    /// Maximum BUSY polls (10 µs apart) before the stop is declared failed.
    ///
    /// PCM: 10 000 polls, observed to take about 1 s with scheduler overhead.
    /// GPCLK0: 500 000 polls, about half a second of busy-waiting.
    /// Either clock normally stops on the first poll.
    pub const fn max_stop_polls(self) -> u32 {
        match self {
            Self::GeneralPurpose0 => 500_000,
            Self::Pcm => 10_000,
        }
    }

    /// Short name used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::GeneralPurpose0 => "GPCLK0",
            Self::Pcm => "PCM",
        }
    }
}

impl core::fmt::Display for ClockGenerator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
