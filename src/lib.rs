// NES CPU core library
// Cycle-counting 6502 interpreter with the bus, cartridge, and PPU timing
// machinery needed to drive it.

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod emulator;
pub mod ppu;

// Re-export main types for convenience
pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeError, Mapper, Mirroring};
pub use cpu::{Cpu, CpuError};
pub use emulator::{Emulator, EmulatorConfig};
pub use ppu::Ppu;
