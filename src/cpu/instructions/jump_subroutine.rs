// Jump and subroutine instructions for the 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{Cpu, CpuError};

impl Cpu {
    /// JMP - Jump
    ///
    /// Sets PC to the computed address. The indirect form's pointer bug
    /// lives in the addressing layer, so both forms land here identical.
    pub fn jmp(&mut self, addr_result: &AddressingResult) {
        self.pc = addr_result.address;
    }

    /// JSR - Jump to Subroutine
    ///
    /// Pushes the address of the instruction's last byte (PC after the
    /// operand, minus one) high byte first, then jumps. RTS undoes the
    /// bias with its own +1.
    pub fn jsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) -> Result<(), CpuError> {
        let return_addr = self.pc.wrapping_sub(1);
        self.stack_push_u16(bus, return_addr)?;
        self.pc = addr_result.address;
        Ok(())
    }

    /// RTS - Return from Subroutine
    ///
    /// Pops low then high, then increments past the byte JSR left off.
    pub fn rts(&mut self, bus: &mut Bus) -> Result<(), CpuError> {
        let addr = self.stack_pop_u16(bus)?;
        self.pc = addr.wrapping_add(1);
        Ok(())
    }
}
