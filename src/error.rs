use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RomError>;

/// Region of an iNES image that a truncation was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Trainer,
    PrgRom,
    ChrRom,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Header => "header",
            Section::Trainer => "trainer",
            Section::PrgRom => "prg-rom",
            Section::ChrRom => "chr-rom",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RomError {
    #[error("file is not in iNES file format")]
    InvalidFormat,
    #[error(
        "truncated {section}: expected {needed} bytes at offset {offset:#X}, only {available} available"
    )]
    TruncatedData {
        section: Section,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid rom snapshot: {0}")]
    Snapshot(String),
}

impl RomError {
    pub(crate) fn truncated(section: Section, offset: usize, needed: usize, len: usize) -> Self {
        RomError::TruncatedData {
            section,
            offset,
            needed,
            available: len.saturating_sub(offset),
        }
    }
}
