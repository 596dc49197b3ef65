// Cartridge module - ROM ingestion and mapper construction
//
// Parses the iNES container format, validates the header, and hands the
// PRG image to a mapper. Only mapper 0 (NROM) exists here; anything else
// is rejected before the core ever sees the data.
//
// # iNES layout
//
// ```text
// bytes 0-3   magic "NES\x1A"
// byte 4      PRG-ROM size in 16KB units
// byte 5      CHR-ROM size in 8KB units
// byte 6      flags: mirroring, battery, trainer, four-screen, mapper low
// byte 7      flags: VS/PlayChoice, NES 2.0 marker, mapper high
// bytes 8-15  rarely used extensions
// [512-byte trainer when flag 6 bit 2 is set]
// PRG-ROM, then CHR-ROM
// ```

pub mod mappers;

pub use mappers::{Mapper, Mapper0};

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::info;

/// Size of the iNES header in bytes.
const HEADER_SIZE: usize = 16;
/// Size of one PRG-ROM bank.
const PRG_BANK_SIZE: usize = 16 * 1024;
/// Size of one CHR-ROM bank.
const CHR_BANK_SIZE: usize = 8 * 1024;
/// Size of an optional trainer blob between header and PRG-ROM.
const TRAINER_SIZE: usize = 512;

/// Nametable mirroring arrangement, fixed by the cartridge for NROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Errors from ROM ingestion and mapper construction
#[derive(Debug)]
pub enum CartridgeError {
    /// The file could not be read
    Io(io::Error),
    /// The file is shorter than an iNES header
    TruncatedHeader,
    /// The first four bytes are not "NES\x1A"
    BadMagic,
    /// The file ends before the declared PRG/CHR data
    TruncatedData { expected: usize, actual: usize },
    /// The PRG image is not 16KB or 32KB
    BadPrgSize(usize),
    /// The cartridge needs a mapper this core does not implement
    UnsupportedMapper(u8),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Io(err) => write!(f, "failed to read ROM file: {}", err),
            CartridgeError::TruncatedHeader => {
                write!(f, "ROM file is too small to hold an iNES header")
            }
            CartridgeError::BadMagic => write!(f, "missing iNES magic bytes"),
            CartridgeError::TruncatedData { expected, actual } => write!(
                f,
                "ROM file truncated: header declares {} bytes, file holds {}",
                expected, actual
            ),
            CartridgeError::BadPrgSize(size) => {
                write!(f, "PRG-ROM must be 16KB or 32KB, got {} bytes", size)
            }
            CartridgeError::UnsupportedMapper(mapper) => {
                write!(f, "mapper {} is not supported (NROM only)", mapper)
            }
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CartridgeError {
    fn from(err: io::Error) -> Self {
        CartridgeError::Io(err)
    }
}

/// Cartridge structure representing a loaded ROM
pub struct Cartridge {
    /// PRG-ROM data (16KB or 32KB for NROM)
    pub prg_rom: Vec<u8>,
    /// CHR-ROM data (unused by this core's PPU stub, kept for completeness)
    pub chr_rom: Vec<u8>,
    /// Mapper number from the header
    pub mapper: u8,
    /// Nametable mirroring arrangement
    pub mirroring: Mirroring,
}

impl Cartridge {
    /// Parse an iNES image from a byte slice.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_SIZE {
            return Err(CartridgeError::TruncatedHeader);
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(CartridgeError::BadMagic);
        }

        let prg_banks = data[4] as usize;
        let chr_banks = data[5] as usize;
        let flags6 = data[6];
        let flags7 = data[7];

        let mapper = (flags7 & 0xF0) | (flags6 >> 4);
        let has_trainer = flags6 & 0x04 != 0;
        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let prg_start = HEADER_SIZE + if has_trainer { TRAINER_SIZE } else { 0 };
        let prg_len = prg_banks * PRG_BANK_SIZE;
        let chr_start = prg_start + prg_len;
        let chr_len = chr_banks * CHR_BANK_SIZE;

        let expected = chr_start + chr_len;
        if data.len() < expected {
            return Err(CartridgeError::TruncatedData {
                expected,
                actual: data.len(),
            });
        }

        let prg_rom = data[prg_start..prg_start + prg_len].to_vec();
        let chr_rom = data[chr_start..chr_start + chr_len].to_vec();

        if prg_rom.len() != PRG_BANK_SIZE && prg_rom.len() != 2 * PRG_BANK_SIZE {
            return Err(CartridgeError::BadPrgSize(prg_rom.len()));
        }

        info!(
            "loaded iNES image: {}KB PRG, {}KB CHR, mapper {}, {:?} mirroring",
            prg_len / 1024,
            chr_len / 1024,
            mapper,
            mirroring
        );

        Ok(Cartridge {
            prg_rom,
            chr_rom,
            mapper,
            mirroring,
        })
    }

    /// Parse an iNES image from a file on disk.
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = fs::read(path)?;
        Self::from_ines_bytes(&data)
    }

    /// Build a cartridge directly from a prepared PRG image.
    ///
    /// This is the loader contract for hosts that do their own container
    /// parsing: a 16KB image is mirrored into the upper bank, a 32KB
    /// image fills $8000-$FFFF flat. Any other size is rejected.
    pub fn from_prg_rom(prg_rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if prg_rom.len() != PRG_BANK_SIZE && prg_rom.len() != 2 * PRG_BANK_SIZE {
            return Err(CartridgeError::BadPrgSize(prg_rom.len()));
        }
        Ok(Cartridge {
            prg_rom,
            chr_rom: Vec::new(),
            mapper: 0,
            mirroring: Mirroring::Horizontal,
        })
    }

    /// Whether the PRG image is the 16KB (NROM-128) variant that mirrors
    /// its single bank into $C000-$FFFF.
    pub fn prg_is_mirrored(&self) -> bool {
        self.prg_rom.len() == PRG_BANK_SIZE
    }

    /// Consume the cartridge and build its mapper.
    ///
    /// Rejects every mapper other than 0; the core never executes with an
    /// unsupported cartridge attached.
    pub fn into_mapper(self) -> Result<Box<dyn Mapper>, CartridgeError> {
        match self.mapper {
            0 => Ok(Box::new(Mapper0::new(self)?)),
            other => Err(CartridgeError::UnsupportedMapper(other)),
        }
    }
}
