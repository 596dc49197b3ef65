// PPU register handling
//
// The bus decodes $2000-$3FFF down to a register number (0-7) before
// calling in here, so mirroring never reaches this module.

use log::debug;

use super::Ppu;

impl Ppu {
    /// Read from a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register number (0-7)
    ///
    /// Write-only registers read back as 0. PPUSTATUS returns the live
    /// status byte; the stub data registers return their latched values.
    pub fn handle_read(&mut self, register: u16) -> u8 {
        match register {
            // $2000 PPUCTRL / $2001 PPUMASK: write only
            0 | 1 => 0,

            // $2002 PPUSTATUS: bit 7 is the VBlank flag
            2 => self.ppustatus,

            // $2003 OAMADDR: write only
            3 => 0,

            // $2004 OAMDATA: OAM byte at the current OAM address
            4 => self.oam[self.oam_addr as usize],

            // $2005 PPUSCROLL / $2006 PPUADDR: the stub hands back the
            // last byte written so the forwarding is observable
            5 => self.scroll_latch,
            6 => self.addr_latch,

            // $2007 PPUDATA: latched verbatim, no VRAM behind it
            7 => self.data_latch,

            // The bus masks register numbers to 0-7
            _ => 0,
        }
    }

    /// Write to a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register number (0-7)
    /// * `value` - The byte to write
    pub fn handle_write(&mut self, register: u16, value: u8) {
        match register {
            // $2000 PPUCTRL: bit 7 arms NMI-at-VBlank
            0 => self.ppuctrl = value,

            // $2001 PPUMASK
            1 => self.ppumask = value,

            // $2002 PPUSTATUS is read only
            2 => {
                debug!("ignored write of {value:02X} to read-only PPUSTATUS");
            }

            // $2003 OAMADDR
            3 => self.oam_addr = value,

            // $2004 OAMDATA: store and advance OAMADDR
            4 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }

            // $2005 PPUSCROLL / $2006 PPUADDR / $2007 PPUDATA: latched
            // verbatim for the absent rendering pipeline
            5 => self.scroll_latch = value,
            6 => self.addr_latch = value,
            7 => self.data_latch = value,

            // The bus masks register numbers to 0-7
            _ => {}
        }
    }
}
