//! JazzRom: iNES cartridge image decoding.
//!
//! Turns the raw bytes of a `.nes` file into a [`Rom`]: the parsed 16-byte header,
//! the PRG-ROM banks, the CHR-ROM split into 4 KiB pages, and every CHR tile decoded
//! into 8x8 colour indices.
//!
//! ## Modules
//!
//! - **header** – [iNES header](https://www.nesdev.org/wiki/INES): magic, bank counts,
//!   flags 6/7 (mirroring, battery, trainer, mapper number)
//! - **cartridge** – bank and tile decoding into [`Rom`]
//! - **tile** – [pattern table](https://www.nesdev.org/wiki/PPU_pattern_tables) bit-plane decoding
//! - **snapshot** – bincode encoding of a decoded [`Rom`]
//! - **error** – [`RomError`]

pub mod cartridge;
pub mod error;
pub mod header;
pub mod snapshot;
pub mod tile;

pub use cartridge::{Rom, TILES_PER_PAGE, decode_banks};
pub use error::{RomError, Section};
pub use header::{HeaderConfig, Mirroring, parse_header};
pub use tile::Tile;
