use serde::{Deserialize, Serialize};

use crate::error::{Result, RomError, Section};
use crate::header::{
    self, CHR_PAGE_SIZE, HEADER_SIZE, HeaderConfig, Mirroring, PRG_ROM_PAGE_SIZE, TRAINER_SIZE,
};
use crate::tile::{TILE_BYTES, Tile};

pub const TILES_PER_PAGE: usize = CHR_PAGE_SIZE / TILE_BYTES; // 256

/// A decoded iNES cartridge image.
///
/// Built once per load and never mutated afterwards; loading another cartridge means
/// building another `Rom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RomRepr")]
pub struct Rom {
    pub(crate) config: HeaderConfig,
    pub(crate) prg_banks: Vec<Vec<u8>>,
    pub(crate) chr_banks: Vec<Vec<u8>>,
    pub(crate) chr_tiles: Vec<Vec<Tile>>,
}

// Deserialised data only becomes a `Rom` once it passes `Rom::validate`.
#[derive(Deserialize)]
struct RomRepr {
    config: HeaderConfig,
    prg_banks: Vec<Vec<u8>>,
    chr_banks: Vec<Vec<u8>>,
    chr_tiles: Vec<Vec<Tile>>,
}

impl TryFrom<RomRepr> for Rom {
    type Error = String;

    fn try_from(repr: RomRepr) -> std::result::Result<Self, Self::Error> {
        let rom = Rom {
            config: repr.config,
            prg_banks: repr.prg_banks,
            chr_banks: repr.chr_banks,
            chr_tiles: repr.chr_tiles,
        };
        rom.validate()?;
        Ok(rom)
    }
}

impl Rom {
    /// Parses the header and decodes every bank of `raw`.
    pub fn new(raw: &[u8]) -> Result<Rom> {
        let config = header::parse_header(raw)?;
        decode_banks(raw, &config)
    }

    pub fn config(&self) -> &HeaderConfig {
        &self.config
    }

    pub fn header(&self) -> &[u8; HEADER_SIZE] {
        &self.config.header
    }

    pub fn mapper_id(&self) -> u8 {
        self.config.mapper_id
    }

    pub fn mirroring(&self) -> Mirroring {
        self.config.mirroring
    }

    pub fn has_battery_ram(&self) -> bool {
        self.config.has_battery_ram
    }

    pub fn has_trainer(&self) -> bool {
        self.config.has_trainer
    }

    pub fn is_nes2(&self) -> bool {
        self.config.is_nes2()
    }

    /// Pages of CHR that must be emulated as RAM (1 when the image has no CHR-ROM).
    pub fn chr_ram_page_count(&self) -> usize {
        self.config.chr_ram_page_count
    }

    pub fn prg_banks(&self) -> &[Vec<u8>] {
        &self.prg_banks
    }

    pub fn prg_bank(&self, index: usize) -> Option<&[u8]> {
        self.prg_banks.get(index).map(Vec::as_slice)
    }

    pub fn chr_banks(&self) -> &[Vec<u8>] {
        &self.chr_banks
    }

    pub fn chr_bank(&self, index: usize) -> Option<&[u8]> {
        self.chr_banks.get(index).map(Vec::as_slice)
    }

    pub fn chr_tiles(&self) -> &[Vec<Tile>] {
        &self.chr_tiles
    }

    pub fn tile(&self, page: usize, index: usize) -> Option<&Tile> {
        self.chr_tiles.get(page)?.get(index)
    }

    /// Checks the shape `decode_banks` guarantees. Used on data that did not come
    /// straight from the decoder.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let config = &self.config;
        match header::parse_header(&config.header) {
            Ok(parsed) if parsed == *config => {}
            _ => return Err("header config does not match header bytes".to_string()),
        }
        if self.prg_banks.len() != config.prg_bank_count {
            return Err(format!(
                "expected {} prg banks, found {}",
                config.prg_bank_count,
                self.prg_banks.len()
            ));
        }
        if let Some(bank) = self.prg_banks.iter().position(|b| b.len() != PRG_ROM_PAGE_SIZE) {
            return Err(format!("prg bank {bank} is not {PRG_ROM_PAGE_SIZE} bytes"));
        }
        if self.chr_banks.len() != config.chr_page_count {
            return Err(format!(
                "expected {} chr pages, found {}",
                config.chr_page_count,
                self.chr_banks.len()
            ));
        }
        if let Some(page) = self.chr_banks.iter().position(|p| p.len() != CHR_PAGE_SIZE) {
            return Err(format!("chr page {page} is not {CHR_PAGE_SIZE} bytes"));
        }
        if self.chr_tiles.len() != self.chr_banks.len() {
            return Err("chr tiles are not parallel to chr pages".to_string());
        }
        if let Some(page) = self.chr_tiles.iter().position(|t| t.len() != TILES_PER_PAGE) {
            return Err(format!("chr page {page} does not hold {TILES_PER_PAGE} tiles"));
        }
        if !self.chr_tiles.iter().flatten().all(Tile::is_well_formed) {
            return Err("tile pixel out of range".to_string());
        }
        Ok(())
    }
}

/// Decodes the PRG banks and CHR pages that follow the header described by `config`.
pub fn decode_banks(raw: &[u8], config: &HeaderConfig) -> Result<Rom> {
    let mut offset = HEADER_SIZE;

    if config.has_trainer {
        take::<TRAINER_SIZE>(raw, offset, Section::Trainer)?;
        log::debug!("Skipping {TRAINER_SIZE}-byte trainer");
        offset += TRAINER_SIZE;
    }

    let mut prg_banks = Vec::with_capacity(config.prg_bank_count);
    for _ in 0..config.prg_bank_count {
        prg_banks.push(take::<PRG_ROM_PAGE_SIZE>(raw, offset, Section::PrgRom)?.to_vec());
        offset += PRG_ROM_PAGE_SIZE;
    }

    let mut chr_banks = Vec::with_capacity(config.chr_page_count);
    let mut chr_tiles = Vec::with_capacity(config.chr_page_count);
    for _ in 0..config.chr_page_count {
        let page = take::<CHR_PAGE_SIZE>(raw, offset, Section::ChrRom)?;
        chr_tiles.push(decode_tiles(page));
        chr_banks.push(page.to_vec());
        offset += CHR_PAGE_SIZE;
    }

    if raw.len() > offset {
        log::debug!("Ignoring {} trailing bytes after CHR-ROM", raw.len() - offset);
    }

    log::info!(
        "Loaded iNES image: mapper {}, {:?} mirroring, {} PRG bank(s), {} CHR page(s), {} CHR-RAM page(s)",
        config.mapper_id,
        config.mirroring,
        config.prg_bank_count,
        config.chr_page_count,
        config.chr_ram_page_count,
    );

    Ok(Rom {
        config: config.clone(),
        prg_banks,
        chr_banks,
        chr_tiles,
    })
}

/// Decodes the 256 tiles of one 4 KiB CHR page.
pub(crate) fn decode_tiles(page: &[u8; CHR_PAGE_SIZE]) -> Vec<Tile> {
    page.chunks_exact(TILE_BYTES)
        .map(|chunk| {
            let mut data = [0u8; TILE_BYTES];
            data.copy_from_slice(chunk);
            Tile::from_planes(&data)
        })
        .collect()
}

fn take<const N: usize>(raw: &[u8], offset: usize, section: Section) -> Result<&[u8; N]> {
    raw.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| RomError::truncated(section, offset, N, raw.len()))
}
