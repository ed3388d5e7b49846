//! Mock implementations for testing
//!
//! [`MockRegisters`] stands in for a mapped register window and
//! [`MockDelay`] for the microsecond sleeps, so the clock sequencer and the
//! pin-mode controller run on the host without root or real time passing.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::clock_config::{CLK_CTL_BUSY, CLK_CTL_KILL};
use crate::registers::{RegisterBlock, RegisterError};

/// How a simulated clock generator responds to KILL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBehaviour {
    /// BUSY is never raised; the generator is already idle.
    Immediate,
    /// BUSY is reported on this many reads after the KILL write, then clears.
    AfterPolls(u32),
    /// BUSY never clears.
    Stuck,
}

/// Pending BUSY simulation: the killed word and the reads left until it clears.
#[derive(Debug, Clone, Copy)]
struct PendingStop {
    index: usize,
    remaining: Option<u32>,
}

/// In-memory register window that records every write in order.
///
/// Writing a word with the KILL bit set arms the configured
/// [`StopBehaviour`] on that word. Hardware registers change underneath a
/// shared read, so the countdown lives in a `Cell` and `read(&self)` can
/// advance it.
#[derive(Debug, Clone)]
pub struct MockRegisters {
    words: Vec<u32>,
    writes: Vec<(usize, u32)>,
    reads: Cell<usize>,
    stop: StopBehaviour,
    pending: Cell<Option<PendingStop>>,
}

impl MockRegisters {
    /// Create a zeroed window of `len` words whose generators stop instantly.
    pub fn new(len: usize) -> Self {
        Self::with_stop_behaviour(len, StopBehaviour::Immediate)
    }

    /// Create a zeroed window with a given generator stop behaviour.
    pub fn with_stop_behaviour(len: usize, stop: StopBehaviour) -> Self {
        Self {
            words: vec![0; len],
            writes: Vec::new(),
            reads: Cell::new(0),
            stop,
            pending: Cell::new(None),
        }
    }

    /// Preload a word without recording a write.
    ///
    /// Out-of-window indices are ignored.
    pub fn set_word(&mut self, index: usize, value: u32) {
        if let Some(word) = self.words.get_mut(index) {
            *word = value;
        }
    }

    /// Current stored value of a word (0 if out of window).
    pub fn word(&self, index: usize) -> u32 {
        self.words.get(index).copied().unwrap_or(0)
    }

    /// Every successful write, in order, as `(index, value)`.
    pub fn writes(&self) -> &[(usize, u32)] {
        &self.writes
    }

    /// Writes that targeted `index`, in order.
    pub fn writes_to(&self, index: usize) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Number of reads served so far.
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Report BUSY for `index` if a stop is pending there, and count it down.
    fn poll_busy(&self, index: usize) -> bool {
        match self.pending.get() {
            Some(pending) if pending.index == index => {
                if let Some(remaining) = pending.remaining {
                    let remaining = remaining.saturating_sub(1);
                    self.pending.set((remaining > 0).then_some(PendingStop {
                        index,
                        remaining: Some(remaining),
                    }));
                }
                true
            }
            _ => false,
        }
    }
}

impl RegisterBlock for MockRegisters {
    fn len_words(&self) -> usize {
        self.words.len()
    }

    fn read(&self, index: usize) -> Result<u32, RegisterError> {
        let value = *self.words.get(index).ok_or(RegisterError {
            index,
            len: self.words.len(),
        })?;
        self.reads.set(self.reads.get().saturating_add(1));
        if self.poll_busy(index) {
            Ok(value | CLK_CTL_BUSY)
        } else {
            Ok(value)
        }
    }

    fn write(&mut self, index: usize, value: u32) -> Result<(), RegisterError> {
        let len = self.words.len();
        let word = self
            .words
            .get_mut(index)
            .ok_or(RegisterError { index, len })?;
        *word = value;
        self.writes.push((index, value));
        if value & CLK_CTL_KILL != 0 {
            let remaining = match self.stop {
                StopBehaviour::Immediate | StopBehaviour::AfterPolls(0) => None,
                StopBehaviour::AfterPolls(n) => Some(Some(n)),
                StopBehaviour::Stuck => Some(None),
            };
            self.pending
                .set(remaining.map(|remaining| PendingStop { index, remaining }));
        }
        Ok(())
    }
}

/// Delay that records what was requested and returns immediately.
#[derive(Debug, Default, Clone)]
pub struct MockDelay {
    total_ns: u64,
    calls: usize,
}

impl MockDelay {
    /// Create a delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of delay calls made.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Sum of all requested delays in microseconds.
    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns = self.total_ns.saturating_add(u64::from(ns));
        self.calls = self.calls.saturating_add(1);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1_000));
    }
}
