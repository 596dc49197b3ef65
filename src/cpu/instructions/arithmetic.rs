// Arithmetic instructions for the 6502 CPU
//
// ADC and SBC share one adder: SBC is ADC of the one's complement, which
// makes C the no-borrow flag. Decimal mode is disconnected on the NES, so
// the D flag is stored but never consulted here.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::flags;
use crate::cpu::Cpu;

impl Cpu {
    /// ADC - Add with Carry
    ///
    /// A := A + M + C.
    ///
    /// Flags affected:
    /// - C: set when the sum exceeds 8 bits
    /// - V: set on signed overflow (both operands share a sign the
    ///   result does not)
    /// - Z, N: from the result
    pub fn adc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.adc_value(value);
    }

    /// SBC - Subtract with Carry
    ///
    /// A := A - M - (1 - C), computed as A + !M + C so that C reads as
    /// "no borrow occurred".
    ///
    /// Flags affected: C, V, Z, N as for ADC on the complemented operand
    pub fn sbc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.sbc_value(value);
    }

    /// The shared adder behind ADC, RRA and the SBC pair.
    pub(crate) fn adc_value(&mut self, value: u8) {
        let carry_in = self.get_flag(flags::CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        self.update_flag(flags::CARRY, sum >= 0x100);
        // Signed overflow: operands agree in sign, result disagrees
        let overflow = (self.a ^ result) & (value ^ result) & 0x80 != 0;
        self.update_flag(flags::OVERFLOW, overflow);

        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// SBC core, shared with ISC and the unofficial SBC alias.
    pub(crate) fn sbc_value(&mut self, value: u8) {
        self.adc_value(!value);
    }

    // ========================================
    // Increment / Decrement
    // ========================================
    // All six wrap at the byte boundary and update Z and N.

    /// INC - Increment Memory
    pub fn inc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_add(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// DEC - Decrement Memory
    pub fn dec(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_sub(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// INX - Increment X
    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// DEX - Decrement X
    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// INY - Increment Y
    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    /// DEY - Decrement Y
    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imm(value: u8) -> AddressingResult {
        AddressingResult::immediate(value)
    }

    // ========================================
    // ADC Tests
    // ========================================

    #[test]
    fn test_adc_simple() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x20;

        cpu.adc(&mut bus, &imm(0x10));
        assert_eq!(cpu.a, 0x30);
        assert!(!cpu.get_flag(flags::CARRY));
        assert!(!cpu.get_flag(flags::OVERFLOW));
        assert!(!cpu.get_flag(flags::ZERO));
        assert!(!cpu.get_flag(flags::NEGATIVE));
    }

    #[test]
    fn test_adc_carry_in_and_out() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0xFF;
        cpu.set_flag(flags::CARRY);

        cpu.adc(&mut bus, &imm(0x00));
        assert_eq!(cpu.a, 0x00, "0xFF + 0 + carry wraps");
        assert!(cpu.get_flag(flags::CARRY));
        assert!(cpu.get_flag(flags::ZERO));
    }

    #[test]
    fn test_adc_signed_overflow() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        // 0x50 + 0x50: two positives summing to a negative
        cpu.a = 0x50;
        cpu.adc(&mut bus, &imm(0x50));

        assert_eq!(cpu.a, 0xA0);
        assert!(cpu.get_flag(flags::OVERFLOW));
        assert!(cpu.get_flag(flags::NEGATIVE));
        assert!(!cpu.get_flag(flags::CARRY));
        assert!(!cpu.get_flag(flags::ZERO));
    }

    #[test]
    fn test_adc_no_overflow_on_mixed_signs() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x50;
        cpu.adc(&mut bus, &imm(0x90));
        assert!(!cpu.get_flag(flags::OVERFLOW));
    }

    // ========================================
    // SBC Tests
    // ========================================

    #[test]
    fn test_sbc_with_borrow_out() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        // 0x50 - 0xF0 with C=1: result 0x60, borrow (C=0), no overflow
        cpu.a = 0x50;
        cpu.set_flag(flags::CARRY);

        cpu.sbc(&mut bus, &imm(0xF0));
        assert_eq!(cpu.a, 0x60);
        assert!(!cpu.get_flag(flags::CARRY), "borrow clears C");
        assert!(!cpu.get_flag(flags::OVERFLOW));
    }

    #[test]
    fn test_sbc_no_borrow() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x50;
        cpu.set_flag(flags::CARRY);

        cpu.sbc(&mut bus, &imm(0x10));
        assert_eq!(cpu.a, 0x40);
        assert!(cpu.get_flag(flags::CARRY), "no borrow keeps C set");
    }

    #[test]
    fn test_sbc_without_carry_subtracts_one_more() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x50;
        cpu.clear_flag(flags::CARRY);

        cpu.sbc(&mut bus, &imm(0x10));
        assert_eq!(cpu.a, 0x3F);
    }

    #[test]
    fn test_sbc_signed_overflow() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        // 0x50 - 0xB0: positive minus negative overflowing positive range
        cpu.a = 0x50;
        cpu.set_flag(flags::CARRY);

        cpu.sbc(&mut bus, &imm(0xB0));
        assert_eq!(cpu.a, 0xA0);
        assert!(cpu.get_flag(flags::OVERFLOW));
    }

    // ========================================
    // Increment / Decrement Tests
    // ========================================

    #[test]
    fn test_inc_dec_memory() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        bus.write(0x0040, 0xFF);

        cpu.inc(&mut bus, &AddressingResult::new(0x0040));
        assert_eq!(bus.read(0x0040), 0x00, "wraps at 0xFF");
        assert!(cpu.get_flag(flags::ZERO));

        cpu.dec(&mut bus, &AddressingResult::new(0x0040));
        assert_eq!(bus.read(0x0040), 0xFF, "wraps back");
        assert!(cpu.get_flag(flags::NEGATIVE));
    }

    #[test]
    fn test_inx_wraps_to_zero() {
        let mut cpu = Cpu::new();
        cpu.x = 0xFF;
        cpu.inx();
        assert_eq!(cpu.x, 0x00);
        assert!(cpu.get_flag(flags::ZERO));

        cpu.inx();
        assert_eq!(cpu.x, 0x01);
        assert!(!cpu.get_flag(flags::ZERO));
    }

    #[test]
    fn test_dex_dey_iny() {
        let mut cpu = Cpu::new();
        cpu.x = 0x01;
        cpu.dex();
        assert!(cpu.get_flag(flags::ZERO));
        cpu.dex();
        assert_eq!(cpu.x, 0xFF);
        assert!(cpu.get_flag(flags::NEGATIVE));

        cpu.y = 0x7F;
        cpu.iny();
        assert_eq!(cpu.y, 0x80);
        assert!(cpu.get_flag(flags::NEGATIVE));
        cpu.dey();
        assert_eq!(cpu.y, 0x7F);
        assert!(!cpu.get_flag(flags::NEGATIVE));
    }
}
