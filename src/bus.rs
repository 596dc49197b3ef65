// Bus module - Memory bus implementation
//
// This module implements the main memory bus that connects the CPU to all
// memory-mapped components in the NES system. It handles address routing,
// memory mirroring, and write protection for cartridge ROM.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$1FFF: Mirrors of RAM (3 times)
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4000-$4017: APU and I/O Registers
// $4018-$401F: APU and I/O test functionality (usually disabled)
// $4020-$5FFF: Open bus
// $6000-$7FFF: Cartridge PRG-RAM
// $8000-$FFFF: Cartridge PRG-ROM (read-only; NROM-128 mirrors $8000-$BFFF)
// ```

use log::{debug, warn};

use crate::cartridge::Mapper;
use crate::ppu::Ppu;

/// OAMDMA register address. A write here copies a whole CPU page into
/// PPU OAM and stalls the CPU for 513 or 514 cycles.
const OAM_DMA: u16 = 0x4014;

/// Main memory bus structure
///
/// The Bus connects the CPU to internal RAM, the PPU's register window,
/// and the cartridge. It owns the PPU so that register accesses can have
/// their side effects applied immediately - nothing on the bus is cached.
pub struct Bus {
    /// Internal RAM: 2KB at $0000-$07FF, mirrored up to $1FFF
    ram: [u8; 0x0800],

    /// Cartridge PRG-RAM at $6000-$7FFF
    prg_ram: [u8; 0x2000],

    /// The PPU, reachable through its register window at $2000-$3FFF
    ppu: Ppu,

    /// Cartridge mapper for $8000-$FFFF (None until a cartridge is attached)
    mapper: Option<Box<dyn Mapper>>,

    /// CPU cycles the bus has been ticked through, used for DMA stall parity
    cycles: u64,

    /// Pending CPU stall cycles from an OAMDMA transfer
    dma_stall: u16,
}

impl Bus {
    /// Create a new bus with zeroed memory and no cartridge attached.
    ///
    /// Reads from $8000-$FFFF return 0 until a cartridge is attached, so a
    /// bare bus is only useful for RAM-resident test programs.
    pub fn new() -> Self {
        Bus {
            ram: [0; 0x0800],
            prg_ram: [0; 0x2000],
            ppu: Ppu::new(),
            mapper: None,
            cycles: 0,
            dma_stall: 0,
        }
    }

    /// Create a bus with a cartridge mapper already attached.
    pub fn with_mapper(mapper: Box<dyn Mapper>) -> Self {
        let mut bus = Bus::new();
        bus.mapper = Some(mapper);
        bus
    }

    /// Attach (or replace) the cartridge mapper.
    pub fn attach_mapper(&mut self, mapper: Box<dyn Mapper>) {
        self.mapper = Some(mapper);
    }

    /// Read a byte from the bus
    ///
    /// Applies the mirroring rules first, then routes to the owning
    /// component. Reads of PPU registers apply their side effects
    /// immediately, which is why this takes `&mut self`.
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM: $0000-$07FF, mirrored through $1FFF.
            // The mirror mask keeps the lowest 11 bits.
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers: $2000-$2007, mirrored every 8 bytes through $3FFF.
            0x2000..=0x3FFF => self.ppu.handle_read(addr & 0x0007),

            // APU and I/O registers: out of scope, stubbed to open bus
            0x4000..=0x401F => 0,

            // Open bus region
            0x4020..=0x5FFF => 0,

            // Cartridge PRG-RAM
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize],

            // Cartridge PRG-ROM
            0x8000..=0xFFFF => match &self.mapper {
                Some(mapper) => mapper.cpu_read(addr),
                None => 0,
            },
        }
    }

    /// Write a byte to the bus
    ///
    /// Applies the mirroring rules first, then routes to the owning
    /// component. Writes to PRG-ROM are suppressed with a diagnostic;
    /// the ROM contents never change.
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,

            0x2000..=0x3FFF => self.ppu.handle_write(addr & 0x0007, data),

            OAM_DMA => self.oam_dma(data),

            // APU and I/O registers: accepted and dropped
            0x4000..=0x401F => {
                debug!("APU/IO write ${addr:04X} = {data:02X} ignored (stub)");
            }

            0x4020..=0x5FFF => {
                debug!("open bus write ${addr:04X} = {data:02X} ignored");
            }

            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize] = data,

            // PRG-ROM is read-only. Real NROM boards just don't connect the
            // write line; mappers with registers would decode it here.
            0x8000..=0xFFFF => {
                warn!("suppressed write of {data:02X} to ROM address ${addr:04X}");
            }
        }
    }

    /// Read a 16-bit little-endian word (low byte at `addr`).
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Write a 16-bit little-endian word (low byte at `addr`).
    pub fn write_u16(&mut self, addr: u16, data: u16) {
        self.write(addr, (data & 0xFF) as u8);
        self.write(addr.wrapping_add(1), (data >> 8) as u8);
    }

    /// Advance the PPU by three cycles for every elapsed CPU cycle.
    ///
    /// The CPU calls this once per instruction with the cycles the
    /// instruction consumed; the 2C02 runs at exactly three times the
    /// 2A03 clock.
    pub fn tick(&mut self, cpu_cycles: u32) {
        for _ in 0..cpu_cycles {
            self.cycles += 1;
            self.ppu.step();
            self.ppu.step();
            self.ppu.step();
        }
    }

    /// Take the PPU's pending NMI signal, clearing it.
    ///
    /// The CPU polls this between instructions; the PPU itself never
    /// reaches back into the interpreter.
    pub fn take_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }

    /// Take the pending OAMDMA stall cycles, clearing them.
    pub fn take_dma_stall(&mut self) -> u16 {
        std::mem::take(&mut self.dma_stall)
    }

    /// Borrow the PPU (for status inspection by hosts and tests).
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Mutably borrow the PPU.
    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// OAMDMA: copy the 256-byte CPU page `page << 8` into PPU OAM.
    ///
    /// The CPU is stalled for 513 cycles, plus one more when the write
    /// lands on an odd CPU cycle.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for offset in 0..256u16 {
            let value = self.read(base | offset);
            self.ppu.dma_write(offset as u8, value);
        }
        self.dma_stall = 513 + (self.cycles & 1) as u16;
        debug!("OAMDMA from page ${page:02X}00, stalling {} cycles", self.dma_stall);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
