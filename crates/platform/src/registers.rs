//! Register access surface.
//!
//! [`RegisterBlock`] is the only way the rest of the crate touches hardware:
//! an indexed array of 32-bit words. The real implementation is a
//! `/dev/mem` window ([`crate::mmio::MappedRegion`]); tests use
//! [`crate::mocks::MockRegisters`].
//!
//! Clock-manager writes must carry the `0x5A` password in their top byte or
//! the hardware silently drops them. [`write_protected`] is the single place
//! that adds it, so no call site can forget.

use crate::clock_config::CLK_PASSWD;

/// Register index outside the mapped window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("register word {index} is outside the {len}-word window")]
pub struct RegisterError {
    /// Requested word index.
    pub index: usize,
    /// Number of 32-bit words in the window.
    pub len: usize,
}

/// A fixed-size block of 32-bit hardware registers addressed by word index.
///
/// Implementations perform volatile accesses; no caching, no reordering.
/// Offsets are not interpreted: callers own the register layout.
pub trait RegisterBlock {
    /// Number of 32-bit words in the block.
    fn len_words(&self) -> usize;

    /// Read the word at `index`.
    fn read(&self, index: usize) -> Result<u32, RegisterError>;

    /// Write `value` to the word at `index`.
    fn write(&mut self, index: usize, value: u32) -> Result<(), RegisterError>;

    /// Read-modify-write the word at `index`.
    fn modify<F>(&mut self, index: usize, f: F) -> Result<(), RegisterError>
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(index)?;
        self.write(index, f(value))
    }
}

impl<R: RegisterBlock + ?Sized> RegisterBlock for &mut R {
    fn len_words(&self) -> usize {
        (**self).len_words()
    }

    fn read(&self, index: usize) -> Result<u32, RegisterError> {
        (**self).read(index)
    }

    fn write(&mut self, index: usize, value: u32) -> Result<(), RegisterError> {
        (**self).write(index, value)
    }
}

/// Write a clock-manager register, OR-ing the password into the top byte.
///
/// `payload` is the semantic register content (bits 23:0). Any bits the
/// caller sets in the top byte are overwritten by the password.
pub fn write_protected<R>(regs: &mut R, index: usize, payload: u32) -> Result<(), RegisterError>
where
    R: RegisterBlock + ?Sized,
{
    let value = CLK_PASSWD | (payload & 0x00FF_FFFF);
    tracing::trace!(index, value = format_args!("{value:#010x}"), "clock register write");
    regs.write(index, value)
}
