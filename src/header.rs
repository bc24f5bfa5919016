use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RomError, Section};

pub const NES_TAG: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_ROM_PAGE_SIZE: usize = 16384; // 16 KiB
pub const CHR_ROM_BANK_SIZE: usize = 8192; // 8 KiB, as counted by byte 5
pub const CHR_PAGE_SIZE: usize = 4096; // 4 KiB, as stored in `Rom`

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Mirroring {
    VERTICAL,
    HORIZONTAL,
    FOURSCREEN,
}

bitflags! {
    // 7  bit  0
    // ---- ----
    // NNNN FTBM
    // |||| ||||
    // |||| |||+- Mirroring (1: horizontal, 0: vertical)
    // |||| ||+-- Battery-backed PRG RAM at $6000-$7FFF
    // |||| |+--- 512-byte trainer before PRG data
    // |||| +---- Four-screen VRAM, overrides bit 0
    // ++++------ Low nibble of mapper number
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags6: u8 {
        const MIRRORING     = 0b0000_0001;
        const BATTERY       = 0b0000_0010;
        const TRAINER       = 0b0000_0100;
        const FOUR_SCREEN   = 0b0000_1000;
        const MAPPER_LOW    = 0b1111_0000;
    }

    // 7  bit  0
    // ---- ----
    // NNNN 10..
    // |||| ||
    // |||| ++--- 0b10 marks a NES 2.0 header
    // ++++------ High nibble of mapper number
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags7: u8 {
        const NES2_ID       = 0b0000_1100;
        const MAPPER_HIGH   = 0b1111_0000;
    }
}

impl Flags6 {
    pub fn mirroring(&self) -> Mirroring {
        match (
            self.contains(Flags6::FOUR_SCREEN),
            self.contains(Flags6::MIRRORING),
        ) {
            (true, _) => Mirroring::FOURSCREEN,
            (false, true) => Mirroring::HORIZONTAL,
            (false, false) => Mirroring::VERTICAL,
        }
    }
}

/// Everything the 16-byte iNES header says about the rest of the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    pub header: [u8; HEADER_SIZE],
    pub mapper_id: u8,
    pub mirroring: Mirroring,
    pub has_battery_ram: bool,
    pub has_trainer: bool,
    /// Number of 16 KiB PRG banks.
    pub prg_bank_count: usize,
    /// Number of 4 KiB CHR pages (twice the 8 KiB count in byte 5).
    pub chr_page_count: usize,
    pub chr_ram_page_count: usize,
}

impl HeaderConfig {
    pub fn flags6(&self) -> Flags6 {
        Flags6::from_bits_truncate(self.header[6])
    }

    pub fn flags7(&self) -> Flags7 {
        Flags7::from_bits_truncate(self.header[7])
    }

    /// NES 2.0 images are recognised but decoded with iNES 1.0 rules.
    pub fn is_nes2(&self) -> bool {
        (self.flags7() & Flags7::NES2_ID).bits() == 0b0000_1000
    }

    pub fn prg_rom_size(&self) -> usize {
        self.prg_bank_count * PRG_ROM_PAGE_SIZE
    }

    pub fn chr_rom_size(&self) -> usize {
        self.chr_page_count * CHR_PAGE_SIZE
    }

    /// Offset of the first PRG byte.
    pub fn prg_rom_start(&self) -> usize {
        HEADER_SIZE + if self.has_trainer { TRAINER_SIZE } else { 0 }
    }

    /// Bytes the header declares: header, trainer, PRG and CHR.
    pub fn image_size(&self) -> usize {
        self.prg_rom_start() + self.prg_rom_size() + self.chr_rom_size()
    }
}

/// Parses the iNES header at the start of `raw`.
///
/// Fails with [`RomError::InvalidFormat`] unless `raw` starts with `"NES\x1A"`.
pub fn parse_header(raw: &[u8]) -> Result<HeaderConfig> {
    if raw.len() < NES_TAG.len() || raw[0..4] != NES_TAG {
        log::error!("First 4 bytes of file do not match the iNES header");
        return Err(RomError::InvalidFormat);
    }
    if raw.len() < HEADER_SIZE {
        return Err(RomError::truncated(Section::Header, 0, HEADER_SIZE, raw.len()));
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&raw[..HEADER_SIZE]);

    let flags6 = Flags6::from_bits_truncate(header[6]);
    let flags7 = Flags7::from_bits_truncate(header[7]);

    let mapper_id =
        (flags6 & Flags6::MAPPER_LOW).bits() >> 4 | (flags7 & Flags7::MAPPER_HIGH).bits();

    let prg_bank_count = header[4] as usize;
    let chr_page_count = header[5] as usize * (CHR_ROM_BANK_SIZE / CHR_PAGE_SIZE);

    // No CHR-ROM means the board carries CHR-RAM instead.
    let chr_ram_page_count = if chr_page_count == 0 { 1 } else { 0 };

    Ok(HeaderConfig {
        header,
        mapper_id,
        mirroring: flags6.mirroring(),
        has_battery_ram: flags6.contains(Flags6::BATTERY),
        has_trainer: flags6.contains(Flags6::TRAINER),
        prg_bank_count,
        chr_page_count,
        chr_ram_page_count,
    })
}
