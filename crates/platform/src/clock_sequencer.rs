//! Stop / reprogram / restart sequencing for one clock generator.
//!
//! ## Sequence
//! ```text
//! kill() --> await_stopped() --> [Stopped] --program_divider()--> [DividerSet]
//!        --select_source()--> [SourceSelected] --enable()--> running
//! ```
//!
//! ## Why this matters
//! Writing DIV or SRC while the generator reports BUSY produces glitches on
//! the output, and the output feeds a DAC's analog stage. The proof tokens
//! below ([`Stopped`], [`DividerSet`], [`SourceSelected`]) can only be
//! obtained by completing the previous step, so the divider write cannot be
//! issued before BUSY has been seen clear.
//!
//! A generator that never reports stopped is a [`ClockError::StopTimeout`],
//! which callers must treat as fatal. A divider that cannot be represented is
//! a [`ClockError::Divider`]: the generator is left killed and nothing more
//! is written.

use embedded_hal::delay::DelayNs;

use crate::clock_config::{
    ClockGenerator, ClockSource, MashStage, CLK_CTL_BUSY, CLK_CTL_ENAB, CLK_CTL_KILL,
    CLK_CTL_SRC_SHIFT,
};
use crate::clock_divider::{ClockDivider, DividerError};
use crate::config::{BUSY_POLL_INTERVAL_US, SETTLE_DELAY_US};
use crate::registers::{write_protected, RegisterBlock, RegisterError};

/// MASH stage programmed by the sequencer.
pub const MASH_STAGE: MashStage = MashStage::Stage1;
/// PLL feeding every generator this crate programs.
pub const SOURCE: ClockSource = ClockSource::PllD;

/// Failure while reprogramming a clock generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Requested frequency cannot be derived from the source; the generator
    /// has been killed and left stopped.
    #[error("cannot derive clock divider: {0}")]
    Divider(#[from] DividerError),
    /// BUSY never cleared after KILL. Unrecoverable.
    #[error("{generator} clock didn't stop after {polls} polls (max: {max})")]
    StopTimeout {
        /// Generator that failed to stop.
        generator: ClockGenerator,
        /// Polls performed.
        polls: u32,
        /// Poll budget for this generator.
        max: u32,
    },
    /// Register window access failed.
    #[error(transparent)]
    Register(#[from] RegisterError),
}

impl ClockError {
    /// `true` when the process must terminate rather than return normally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StopTimeout { .. })
    }
}

/// Proof that a generator reported not-BUSY after KILL.
#[derive(Debug)]
#[must_use]
pub struct Stopped {
    generator: ClockGenerator,
    polls: u32,
}

impl Stopped {
    /// Polls it took for BUSY to clear (0 if it was already clear).
    pub fn polls(&self) -> u32 {
        self.polls
    }
}

/// Proof that the DIV register has been written on a stopped generator.
#[derive(Debug)]
#[must_use]
pub struct DividerSet {
    generator: ClockGenerator,
}

/// Proof that MASH + source have been written; the generator is still disabled.
#[derive(Debug)]
#[must_use]
pub struct SourceSelected {
    generator: ClockGenerator,
}

/// Drives the reprogramming protocol over a clock-manager register block.
///
/// Borrows the register block and the delay for the duration of one
/// sequence; there is no state carried between invocations.
pub struct ClockSequencer<'a, R, D> {
    regs: &'a mut R,
    delay: &'a mut D,
}

impl<'a, R, D> ClockSequencer<'a, R, D>
where
    R: RegisterBlock,
    D: DelayNs,
{
    /// Create a sequencer over the clock-manager window.
    pub fn new(regs: &'a mut R, delay: &'a mut D) -> Self {
        Self { regs, delay }
    }

    /// Run the full sequence and return the divider that was programmed.
    ///
    /// `enable = false` leaves the generator configured but stopped.
    pub fn reprogram(
        &mut self,
        generator: ClockGenerator,
        source_khz: u32,
        target_hz: u32,
        enable: bool,
    ) -> Result<ClockDivider, ClockError> {
        self.kill(generator)?;
        let stopped = self.await_stopped(generator)?;

        let divider = ClockDivider::for_target(source_khz, target_hz).map_err(|err| {
            tracing::warn!(%generator, target_hz, "{err}; generator left stopped");
            err
        })?;

        let divider_set = self.program_divider(stopped, divider)?;
        let selected = self.select_source(divider_set)?;
        if enable {
            self.enable(selected)?;
        }
        Ok(divider)
    }

    /// Request an asynchronous stop (password | KILL).
    pub fn kill(&mut self, generator: ClockGenerator) -> Result<(), ClockError> {
        tracing::debug!(%generator, "kill");
        write_protected(&mut *self.regs, generator.ctl_index(), CLK_CTL_KILL)?;
        Ok(())
    }

    /// Poll BUSY every 10 µs until clear, within the generator's budget.
    ///
    /// The budget counts sleeps: once `max` sleeps have passed the generator
    /// has timed out, even if it would read clear on the next poll.
    pub fn await_stopped(&mut self, generator: ClockGenerator) -> Result<Stopped, ClockError> {
        let max = generator.max_stop_polls();
        let mut polls: u32 = 0;
        while self.regs.read(generator.ctl_index())? & CLK_CTL_BUSY != 0 {
            self.delay.delay_us(BUSY_POLL_INTERVAL_US);
            polls = polls.saturating_add(1);
            if polls >= max {
                tracing::error!(%generator, polls, max, "clock did not stop");
                return Err(ClockError::StopTimeout {
                    generator,
                    polls,
                    max,
                });
            }
        }
        tracing::debug!(%generator, polls, "stopped");
        Ok(Stopped { generator, polls })
    }

    /// Write DIVI/DIVF to a stopped generator, then settle.
    pub fn program_divider(
        &mut self,
        stopped: Stopped,
        divider: ClockDivider,
    ) -> Result<DividerSet, ClockError> {
        let generator = stopped.generator;
        tracing::debug!(%generator, %divider, "program divider");
        write_protected(&mut *self.regs, generator.div_index(), divider.register_payload())?;
        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(DividerSet { generator })
    }

    /// Select MASH stage 1 fed from PLLD, generator still disabled, then settle.
    pub fn select_source(&mut self, divider_set: DividerSet) -> Result<SourceSelected, ClockError> {
        let generator = divider_set.generator;
        tracing::debug!(%generator, "select PLLD, MASH 1");
        write_protected(&mut *self.regs, generator.ctl_index(), source_payload())?;
        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(SourceSelected { generator })
    }

    /// Start the generator: same static bits as [`select_source`](Self::select_source) plus ENAB.
    pub fn enable(&mut self, selected: SourceSelected) -> Result<(), ClockError> {
        let generator = selected.generator;
        tracing::debug!(%generator, "enable");
        write_protected(&mut *self.regs, generator.ctl_index(), source_payload() | CLK_CTL_ENAB)?;
        Ok(())
    }
}

/// CTL payload for "MASH stage 1, source PLLD, disabled".
#[allow(clippy::arithmetic_side_effects)]
fn source_payload() -> u32 {
    MASH_STAGE.bits() | (SOURCE.bits() << CLK_CTL_SRC_SHIFT)
}
