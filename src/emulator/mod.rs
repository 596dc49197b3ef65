// Emulator module - Main emulator coordinator
//
// Wires the CPU, bus, and cartridge together and exposes the high-level
// lifecycle: load a ROM, reset, step instructions or whole frames. Hosts
// that need finer control can reach the components directly.

mod config;

pub use config::{EmulatorConfig, ExecutionConfig};

use std::path::{Path, PathBuf};

use log::info;

use crate::bus::Bus;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::{Cpu, CpuError};
use crate::ppu::CYCLES_PER_FRAME;

/// Main emulator structure
pub struct Emulator {
    /// CPU (6502 interpreter)
    cpu: Cpu,

    /// Bus (RAM, PPU window, cartridge)
    bus: Bus,

    /// Configuration
    config: EmulatorConfig,

    /// Currently loaded ROM path, when the ROM came from disk
    rom_path: Option<PathBuf>,
}

impl Emulator {
    /// Create a new emulator with configuration from disk (or defaults).
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::load_or_default())
    }

    /// Create a new emulator with an explicit configuration.
    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.set_strict_stack(config.execution.strict_stack);
        Emulator {
            cpu,
            bus: Bus::new(),
            config,
            rom_path: None,
        }
    }

    /// Load an iNES ROM file and reset into it.
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CartridgeError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.rom_path = Some(path.to_path_buf());
        info!("loaded ROM {}", path.display());
        self.load_cartridge(cartridge)
    }

    /// Attach an already-built cartridge and reset into it.
    ///
    /// This is the loader-contract entry point: hosts that parse their
    /// own containers hand over a `Cartridge` built with
    /// `Cartridge::from_prg_rom`.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<(), CartridgeError> {
        self.bus.attach_mapper(cartridge.into_mapper()?);
        self.reset();
        Ok(())
    }

    /// Reset all components to their power-on state; PC follows the
    /// reset vector of whatever cartridge is attached.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.cpu
            .set_strict_stack(self.config.execution.strict_stack);
    }

    /// Execute one CPU instruction (with its PPU catch-up).
    /// Returns the CPU cycles consumed.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        self.cpu.step(&mut self.bus)
    }

    /// Run until the PPU finishes its current frame.
    /// Returns the CPU cycles consumed.
    pub fn run_frame(&mut self) -> Result<u32, CpuError> {
        let current_frame = self.bus.ppu().cycles() / CYCLES_PER_FRAME;
        let mut consumed = 0;
        while self.bus.ppu().cycles() / CYCLES_PER_FRAME == current_frame {
            consumed += self.step()?;
        }
        Ok(consumed)
    }

    /// The active configuration.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Path of the loaded ROM, when it came from disk.
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }

    /// Borrow the CPU.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutably borrow the CPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Borrow the bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutably borrow the bus.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
