// Miscellaneous instructions: NOP, BRK, and RTI

use crate::bus::Bus;
use crate::cpu::flags;
use crate::cpu::vectors;
use crate::cpu::{Cpu, CpuError};

impl Cpu {
    /// NOP - No Operation
    ///
    /// Covers the official 0xEA and the whole unofficial family: by the
    /// time this runs, the addressing layer has consumed (and possibly
    /// read through) the operand, which is all the side effect they have.
    pub fn nop(&mut self) {}

    /// BRK - Software Interrupt
    ///
    /// Pushes the address two past the opcode (BRK carries a padding
    /// byte), then P with the ghost B bit set, sets I, and vectors
    /// through IRQ/BRK at $FFFE.
    ///
    /// Flags affected: I set; B appears only in the pushed byte
    pub fn brk(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        // The dispatcher advanced PC past the opcode; one more byte
        // accounts for the padding byte.
        let return_addr = self.pc.wrapping_add(1);
        self.stack_push_u16(bus, return_addr)?;

        let pushed = self.status_byte() | flags::BREAK;
        self.stack_push(bus, pushed)?;

        self.set_flag(flags::INTERRUPT_DISABLE);
        self.pc = bus.read_u16(vectors::IRQ);
        Ok(())
    }

    /// RTI - Return from Interrupt
    ///
    /// Pops P (ignoring the ghost B bit, reserved forced on), then PC low
    /// and high. Unlike RTS there is no +1: interrupts push the exact
    /// resume address.
    pub fn rti(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        let status = self.stack_pop(bus)?;
        self.set_status_byte(status);
        self.pc = self.stack_pop_u16(bus)?;
        Ok(())
    }
}
