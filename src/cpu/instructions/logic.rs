// Logical instructions for the 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::flags;
use crate::cpu::Cpu;

impl Cpu {
    /// AND - Logical AND into the accumulator
    ///
    /// Flags affected: Z, N
    pub fn and(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// ORA - Logical OR into the accumulator
    ///
    /// Flags affected: Z, N
    pub fn ora(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// EOR - Exclusive OR into the accumulator
    ///
    /// Flags affected: Z, N
    pub fn eor(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// BIT - Bit Test
    ///
    /// Z from A AND M; N and V copied straight from bits 7 and 6 of M.
    /// A itself is untouched.
    pub fn bit(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.update_flag(flags::ZERO, self.a & value == 0);
        self.update_flag(flags::NEGATIVE, value & 0x80 != 0);
        self.update_flag(flags::OVERFLOW, value & 0x40 != 0);
    }
}
