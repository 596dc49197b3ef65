// CPU execution loop
//
// One `step` is the unit of progress: fetch, decode through the opcode
// table, execute, account cycles (base + page penalty + branch extras),
// stall for any pending DMA, let the PPU catch up at 3:1, and poll the
// interrupt latches. Errors surface as `CpuError`; nothing is caught
// mid-instruction.

use log::trace;

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::opcode_info;
use crate::cpu::{Cpu, CpuError};

/// Cycles consumed by NMI, IRQ, or BRK entry.
const INTERRUPT_CYCLES: u32 = 7;

impl Cpu {
    /// Execute one instruction and everything it drags along.
    ///
    /// Returns the CPU cycles consumed, including DMA stall and interrupt
    /// entry. The caller re-invokes until it wants to stop; a jammed CPU
    /// keeps returning `CpuError::CpuJam` without touching state.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32, CpuError> {
        if let Some((pc, opcode)) = self.jammed() {
            return Err(CpuError::CpuJam { pc, opcode });
        }

        let mut total: u32 = 0;

        // A store to OAMDMA in the previous instruction freezes the CPU
        // while the transfer runs; the PPU keeps going.
        let stall = bus.take_dma_stall() as u32;
        if stall > 0 {
            self.cycles += stall as u64;
            bus.tick(stall);
            total += stall;
        }

        let pc = self.pc;
        let opcode = bus.read(pc);
        let info = opcode_info(opcode).ok_or(CpuError::UnknownOpcode { pc, opcode })?;

        trace!("{}", self.trace_line(pc));

        self.pc = pc.wrapping_add(1);

        let addr_result = match info.mode {
            AddressingMode::Implied => self.addr_implied(),
            AddressingMode::Accumulator => self.addr_accumulator(),
            AddressingMode::Immediate => self.addr_immediate(bus),
            AddressingMode::ZeroPage => self.addr_zero_page(bus),
            AddressingMode::ZeroPageX => self.addr_zero_page_x(bus),
            AddressingMode::ZeroPageY => self.addr_zero_page_y(bus),
            AddressingMode::Relative => self.addr_relative(bus),
            AddressingMode::Absolute => self.addr_absolute(bus),
            AddressingMode::AbsoluteX => self.addr_absolute_x(bus),
            AddressingMode::AbsoluteY => self.addr_absolute_y(bus),
            AddressingMode::Indirect => self.addr_indirect(bus),
            AddressingMode::IndexedIndirect => self.addr_indexed_indirect(bus),
            AddressingMode::IndirectIndexed => self.addr_indirect_indexed(bus),
        };

        let extra_cycles = self.execute_instruction(pc, opcode, &addr_result, bus)?;

        // Base cycles, plus the page penalty for the modes that incur it.
        // Branches account their own extras through `extra_cycles`.
        let mut cycles = info.cycles as u32;
        if info.page_cycle && addr_result.page_crossed && info.mode != AddressingMode::Relative {
            cycles += 1;
        }
        cycles += extra_cycles as u32;

        self.cycles += cycles as u64;
        bus.tick(cycles);
        total += cycles;

        // Inter-instruction interrupt check: the PPU may have latched an
        // NMI during catch-up. Entry costs 7 cycles and its own catch-up.
        if bus.take_nmi() {
            self.trigger_nmi();
        }
        if self.nmi_pending() {
            self.nmi(bus)?;
            self.cycles += INTERRUPT_CYCLES as u64;
            bus.tick(INTERRUPT_CYCLES);
            total += INTERRUPT_CYCLES;
        } else if self.irq_pending && self.irq(bus)? {
            self.cycles += INTERRUPT_CYCLES as u64;
            bus.tick(INTERRUPT_CYCLES);
            total += INTERRUPT_CYCLES;
        }

        Ok(total)
    }

    /// Execute one decoded instruction.
    /// Returns the extra cycles a branch consumed (0 otherwise).
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        pc: u16,
        opcode: u8,
        addr_result: &crate::cpu::addressing::AddressingResult,
        bus: &mut Bus,
    ) -> Result<u8, CpuError> {
        match opcode {
            // Load/Store instructions
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(bus, addr_result),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(bus, addr_result),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(bus, addr_result),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(bus, addr_result),
            0x86 | 0x96 | 0x8E => self.stx(bus, addr_result),
            0x84 | 0x94 | 0x8C => self.sty(bus, addr_result),

            // Arithmetic instructions
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(bus, addr_result),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 => self.sbc(bus, addr_result),
            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(bus, addr_result),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(bus, addr_result),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logical instructions
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(bus, addr_result),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(bus, addr_result),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(bus, addr_result),
            0x24 | 0x2C => self.bit(bus, addr_result),

            // Shift/Rotate instructions
            0x0A => self.asl(bus, addr_result, true),
            0x06 | 0x16 | 0x0E | 0x1E => self.asl(bus, addr_result, false),
            0x4A => self.lsr(bus, addr_result, true),
            0x46 | 0x56 | 0x4E | 0x5E => self.lsr(bus, addr_result, false),
            0x2A => self.rol(bus, addr_result, true),
            0x26 | 0x36 | 0x2E | 0x3E => self.rol(bus, addr_result, false),
            0x6A => self.ror(bus, addr_result, true),
            0x66 | 0x76 | 0x6E | 0x7E => self.ror(bus, addr_result, false),

            // Compare instructions
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(bus, addr_result),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, addr_result),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, addr_result),

            // Branch instructions (return extra cycles)
            0x10 => return Ok(self.bpl(addr_result)),
            0x30 => return Ok(self.bmi(addr_result)),
            0x50 => return Ok(self.bvc(addr_result)),
            0x70 => return Ok(self.bvs(addr_result)),
            0x90 => return Ok(self.bcc(addr_result)),
            0xB0 => return Ok(self.bcs(addr_result)),
            0xD0 => return Ok(self.bne(addr_result)),
            0xF0 => return Ok(self.beq(addr_result)),

            // Jump/Subroutine instructions
            0x4C | 0x6C => self.jmp(addr_result),
            0x20 => self.jsr(bus, addr_result)?,
            0x60 => self.rts(bus)?,

            // Stack instructions
            0x48 => self.pha(bus)?,
            0x68 => self.pla(bus)?,
            0x08 => self.php(bus)?,
            0x28 => self.plp(bus)?,
            0x9A => self.txs(),
            0xBA => self.tsx(),

            // Transfer instructions
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),

            // Flag instructions
            0x18 => self.clc(),
            0x38 => self.sec(),
            0x58 => self.cli(),
            0x78 => self.sei(),
            0xB8 => self.clv(),
            0xD8 => self.cld(),
            0xF8 => self.sed(),

            // Miscellaneous instructions
            0x00 => self.brk(bus)?,
            0x40 => self.rti(bus)?,
            0xEA => self.nop(),

            // Unofficial opcodes
            0xA7 | 0xB7 | 0xA3 | 0xB3 | 0xAF | 0xBF => self.lax(bus, addr_result),
            0x87 | 0x97 | 0x83 | 0x8F => self.sax(bus, addr_result),
            0x07 | 0x17 | 0x03 | 0x13 | 0x0F | 0x1F | 0x1B => self.slo(bus, addr_result),
            0x27 | 0x37 | 0x23 | 0x33 | 0x2F | 0x3F | 0x3B => self.rla(bus, addr_result),
            0x47 | 0x57 | 0x43 | 0x53 | 0x4F | 0x5F | 0x5B => self.sre(bus, addr_result),
            0x67 | 0x77 | 0x63 | 0x73 | 0x6F | 0x7F | 0x7B => self.rra(bus, addr_result),
            0xC7 | 0xD7 | 0xC3 | 0xD3 | 0xCF | 0xDF | 0xDB => self.dcp(bus, addr_result),
            0xE7 | 0xF7 | 0xE3 | 0xF3 | 0xEF | 0xFF | 0xFB => self.isc(bus, addr_result),
            0x0B | 0x2B => self.anc(bus, addr_result),
            0x4B => self.alr(bus, addr_result),
            0x6B => self.arr(bus, addr_result),
            0xCB => self.sbx(bus, addr_result),
            0xEB => self.sbc(bus, addr_result),
            0xBB => self.las(bus, addr_result),

            // Unofficial NOPs: the addressing layer already consumed (and
            // possibly read through) the operand
            0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA | 0x80 | 0x82 | 0xC2 | 0xE2 | 0x89 | 0x04
            | 0x44 | 0x64 | 0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 | 0x0C | 0x1C | 0x3C
            | 0x5C | 0x7C | 0xDC | 0xFC => self.nop(),

            // JAM: the processor halts until reset
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => {
                return Err(self.jam(pc, opcode));
            }

            // Table entry without a handler: kept distinct from unknown
            // opcodes so the failure names the right defect
            _ => return Err(CpuError::UnimplementedOpcode { pc, opcode }),
        }
        Ok(0)
    }

    /// Render the standard trace line for the instruction about to run:
    /// `PPPP A:AA X:XX Y:YY P:PP SP:SS CYC:NNNN`, registers as they stand
    /// before the fetch.
    pub fn trace(&self) -> String {
        self.trace_line(self.pc)
    }

    fn trace_line(&self, pc: u16) -> String {
        format!(
            "{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            self.a,
            self.x,
            self.y,
            self.status_byte(),
            self.sp,
            self.cycles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::flags;
    use crate::cpu::tests::bus_with_rom;

    /// Place a program at $8000 and return a CPU resting there.
    fn cpu_with_program(program: &[u8]) -> (Cpu, Bus) {
        let bytes: Vec<(u16, u8)> = program
            .iter()
            .enumerate()
            .map(|(i, &b)| (0x8000 + i as u16, b))
            .collect();
        let mut bus = bus_with_rom(&bytes);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        assert_eq!(cpu.pc, 0x8000);
        (cpu, bus)
    }

    // ========================================
    // End-to-End Instruction Tests
    // ========================================

    #[test]
    fn test_lda_immediate_end_to_end() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA9, 0x42]);

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x42);
        assert_eq!(cpu.pc, 0x8002);
        assert_eq!(cycles, 2);
        assert_eq!(cpu.cycles, 2);
        assert!(!cpu.get_flag(flags::ZERO));
        assert!(!cpu.get_flag(flags::NEGATIVE));
    }

    #[test]
    fn test_adc_immediate_end_to_end() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x69, 0x10]);
        cpu.a = 0x20;

        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x30);
        assert!(!cpu.get_flag(flags::CARRY));
        assert!(!cpu.get_flag(flags::OVERFLOW));
        assert!(!cpu.get_flag(flags::NEGATIVE));
        assert!(!cpu.get_flag(flags::ZERO));
    }

    #[test]
    fn test_asl_accumulator_end_to_end() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x0A]);
        cpu.a = 0x81;

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.a, 0x02);
        assert!(cpu.get_flag(flags::CARRY));
        assert!(!cpu.get_flag(flags::NEGATIVE));
        assert!(!cpu.get_flag(flags::ZERO));
        assert_eq!(cycles, 2);
    }

    #[test]
    fn test_jmp_absolute_end_to_end() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x4C, 0x34, 0x12]);

        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, 0x1234);
        assert_eq!(cycles, 3);
    }

    #[test]
    fn test_jsr_rts_end_to_end() {
        // JSR $9000 at $8000; RTS at $9000
        let mut bus = bus_with_rom(&[
            (0x8000, 0x20),
            (0x8001, 0x00),
            (0x8002, 0x90),
            (0x9000, 0x60),
        ]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc, 0x9000);
        assert_eq!(cpu.sp, 0xFB);
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x02);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc, 0x8003);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn test_inx_wraparound_sequence() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xE8, 0xE8]);
        cpu.x = 0xFF;

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.x, 0x00, "256th increment wraps to zero");
        assert!(cpu.get_flag(flags::ZERO));

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.x, 0x01);
        assert!(!cpu.get_flag(flags::ZERO));
    }

    // ========================================
    // Cycle Accounting Tests
    // ========================================

    #[test]
    fn test_page_cross_penalty_applied() {
        // LDA $80FF,X with X=1: effective $8100, crossing a page
        let (mut cpu, mut bus) = cpu_with_program(&[0xBD, 0xFF, 0x80]);
        cpu.x = 0x01;

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cycles, 5, "4 base + 1 page cross");
    }

    #[test]
    fn test_no_page_cross_penalty_within_page() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xBD, 0x00, 0x80]);
        cpu.x = 0x01;

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cycles, 4, "base cycles only");
    }

    #[test]
    fn test_store_never_pays_page_penalty() {
        // STA $80FF,X with X=1 still costs its fixed 5 cycles
        let (mut cpu, mut bus) = cpu_with_program(&[0x9D, 0xFF, 0x80]);
        cpu.x = 0x01;

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cycles, 5);
    }

    #[test]
    fn test_branch_cycle_accounting() {
        // BEQ +2 not taken: 2 cycles
        let (mut cpu, mut bus) = cpu_with_program(&[0xF0, 0x02]);
        cpu.clear_flag(flags::ZERO);
        assert_eq!(cpu.step(&mut bus).unwrap(), 2);

        // Taken within the page: 3 cycles
        let (mut cpu, mut bus) = cpu_with_program(&[0xF0, 0x02]);
        cpu.set_flag(flags::ZERO);
        assert_eq!(cpu.step(&mut bus).unwrap(), 3);
    }

    #[test]
    fn test_branch_page_cross_costs_four() {
        // BEQ at $80FD: fall-through $80FF, target $8101 on the next page
        let mut bus = bus_with_rom(&[(0x80FD, 0xF0), (0x80FE, 0x02)]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        cpu.pc = 0x80FD;
        cpu.set_flag(flags::ZERO);

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc, 0x8101);
        assert_eq!(cycles, 4, "2 base + 1 taken + 1 cross");
    }

    #[test]
    fn test_cycles_monotonically_increase() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xEA, 0xEA, 0xEA]);
        let mut last = cpu.cycles;
        for _ in 0..3 {
            cpu.step(&mut bus).unwrap();
            assert!(cpu.cycles > last);
            last = cpu.cycles;
        }
    }

    #[test]
    fn test_ppu_advances_three_per_cpu_cycle() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA9, 0x42, 0xEA]);

        cpu.step(&mut bus).unwrap();
        assert_eq!(bus.ppu().cycles(), 6, "2 CPU cycles -> 6 PPU cycles");

        cpu.step(&mut bus).unwrap();
        assert_eq!(bus.ppu().cycles(), 12);
    }

    // ========================================
    // Decode Error Tests
    // ========================================

    #[test]
    fn test_unknown_opcode_is_fatal_with_context() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x8B]);

        match cpu.step(&mut bus) {
            Err(CpuError::UnknownOpcode { pc, opcode }) => {
                assert_eq!(pc, 0x8000);
                assert_eq!(opcode, 0x8B);
            }
            other => panic!("expected UnknownOpcode, got {:?}", other),
        }
    }

    #[test]
    fn test_jam_halts_permanently() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x02, 0xEA]);

        assert!(matches!(
            cpu.step(&mut bus),
            Err(CpuError::CpuJam { pc: 0x8000, opcode: 0x02 })
        ));

        let pc_after = cpu.pc;
        // A jammed CPU reports the same error forever and goes nowhere
        assert!(matches!(cpu.step(&mut bus), Err(CpuError::CpuJam { .. })));
        assert_eq!(cpu.pc, pc_after);
    }

    // ========================================
    // Unofficial Opcode Dispatch Tests
    // ========================================

    #[test]
    fn test_lax_end_to_end() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA7, 0x40]);
        bus.write(0x0040, 0x5A);

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.a, 0x5A);
        assert_eq!(cpu.x, 0x5A);
        assert_eq!(cycles, 3);
    }

    #[test]
    fn test_unofficial_nop_consumes_operand_and_penalty() {
        // NOP $80FF,X (0xFC) with X=1 crosses a page: 4 + 1 cycles
        let (mut cpu, mut bus) = cpu_with_program(&[0xFC, 0xFF, 0x80]);
        cpu.x = 0x01;

        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc, 0x8003);
        assert_eq!(cycles, 5);
    }

    #[test]
    fn test_unofficial_sbc_alias() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xEB, 0x10]);
        cpu.a = 0x50;
        cpu.set_flag(flags::CARRY);

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.a, 0x40);
        assert!(cpu.get_flag(flags::CARRY));
    }

    // ========================================
    // Interrupt Delivery Tests
    // ========================================

    #[test]
    fn test_nmi_taken_between_instructions() {
        let mut bus = bus_with_rom(&[
            (0x8000, 0xEA),
            (0x8001, 0xEA),
            (0xFFFA, 0x00),
            (0xFFFB, 0x90),
        ]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        cpu.trigger_nmi();
        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.pc, 0x9000, "NMI entered after the instruction");
        assert_eq!(cycles, 2 + 7, "instruction plus interrupt entry");
        assert_eq!(bus.ppu().cycles(), (2 + 7) * 3, "PPU caught up for both");
    }

    #[test]
    fn test_irq_masked_then_delivered() {
        let mut bus = bus_with_rom(&[
            (0x8000, 0x58), // CLI
            (0x8001, 0xEA),
            (0xFFFE, 0x00),
            (0xFFFF, 0xA0),
        ]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        assert!(cpu.get_flag(flags::INTERRUPT_DISABLE), "masked after reset");

        cpu.trigger_irq();
        // CLI clears the mask; the IRQ lands at this instruction boundary
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.pc, 0xA000, "IRQ delivered once unmasked");
        assert!(cpu.get_flag(flags::INTERRUPT_DISABLE), "entry re-masks");
    }

    // ========================================
    // Trace Format Tests
    // ========================================

    #[test]
    fn test_trace_format_matches_reference_shape() {
        let (mut cpu, _bus) = cpu_with_program(&[0xA9, 0x42]);
        cpu.a = 0xAB;
        cpu.x = 0x01;
        cpu.y = 0x02;
        cpu.cycles = 7;

        let line = cpu.trace();
        assert_eq!(line, "8000 A:AB X:01 Y:02 P:24 SP:FD CYC:7");
    }

    #[test]
    fn test_trace_reports_pre_instruction_state() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA9, 0xFF]);

        let before = cpu.trace();
        cpu.step(&mut bus).unwrap();
        let after = cpu.trace();

        assert!(before.starts_with("8000 A:00"));
        assert!(after.starts_with("8002 A:FF"));
    }
}
