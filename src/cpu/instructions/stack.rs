// Stack operation instructions for the 6502 CPU
//
// The push/pop primitives themselves live on `Cpu` next to the stack
// discipline configuration; these are the four instruction wrappers.

use crate::bus::Bus;
use crate::cpu::flags;
use crate::cpu::{Cpu, CpuError};

impl Cpu {
    /// PHA - Push Accumulator
    pub fn pha(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        self.stack_push(bus, self.a)
    }

    /// PLA - Pull Accumulator
    ///
    /// Flags affected: Z, N from the pulled value
    pub fn pla(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        self.a = self.stack_pop(bus)?;
        self.update_zero_and_negative_flags(self.a);
        Ok(())
    }

    /// PHP - Push Processor Status
    ///
    /// The pushed byte always carries B and the reserved bit set; the
    /// live P register is not modified. B exists only in this image.
    pub fn php(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        let pushed = self.status_byte() | flags::BREAK;
        self.stack_push(bus, pushed)
    }

    /// PLP - Pull Processor Status
    ///
    /// Loads P from the stack, ignoring the ghost B bit and keeping the
    /// reserved bit set.
    pub fn plp(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        let value = self.stack_pop(bus)?;
        self.set_status_byte(value);
        Ok(())
    }
}
