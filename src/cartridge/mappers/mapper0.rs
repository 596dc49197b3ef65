// Mapper 0 (NROM) - The simplest NES mapper with no bank switching
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror of first 16KB if only 16KB total)
//
// Variants:
// - NROM-128: 16KB PRG-ROM (mirrored to fill the 32KB window)
// - NROM-256: 32KB PRG-ROM (no mirroring)

use log::warn;

use crate::cartridge::{Cartridge, CartridgeError, Mapper};

/// Mapper 0 implementation (NROM)
pub struct Mapper0 {
    /// PRG-ROM data (16KB or 32KB)
    prg_rom: Vec<u8>,
}

impl Mapper0 {
    /// Create a new Mapper0 instance from a cartridge.
    ///
    /// The PRG image must be 16KB or 32KB; the iNES parser normally
    /// guarantees this, but hosts can hand-build cartridges too.
    pub fn new(cartridge: Cartridge) -> Result<Self, CartridgeError> {
        let prg_rom_size = cartridge.prg_rom.len();
        if prg_rom_size != 16 * 1024 && prg_rom_size != 32 * 1024 {
            return Err(CartridgeError::BadPrgSize(prg_rom_size));
        }

        Ok(Mapper0 {
            prg_rom: cartridge.prg_rom,
        })
    }
}

impl Mapper for Mapper0 {
    /// Read from CPU address space
    ///
    /// The modulo folds $C000-$FFFF onto the single bank for 16KB images
    /// and is a no-op for 32KB images.
    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => {
                let index = (addr - 0x8000) as usize;
                self.prg_rom[index % self.prg_rom.len()]
            }
            // Below the PRG window; the bus never routes this here
            _ => 0,
        }
    }

    /// Write to CPU address space
    ///
    /// NROM has no registers, so every write is dropped.
    fn cpu_write(&mut self, addr: u16, value: u8) {
        warn!("NROM ignores write of {value:02X} to ${addr:04X}");
    }
}
