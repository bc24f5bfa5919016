//! Serialised form of a decoded [`Rom`], so a host can cache decoded cartridges
//! or hand them across a thread or process without decoding the image again.

use serde::{Deserialize, Serialize};

use crate::cartridge::Rom;
use crate::error::{Result, RomError};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    rom: Rom,
}

pub fn save(rom: &Rom) -> Result<Vec<u8>> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        rom: rom.clone(),
    };
    bincode::serialize(&snapshot).map_err(|e| RomError::Snapshot(e.to_string()))
}

/// Restores a `Rom` written by [`save`], rejecting blobs that do not hold a well-formed image.
pub fn load(data: &[u8]) -> Result<Rom> {
    // `Rom` deserialisation runs `Rom::validate`
    let snapshot: Snapshot =
        bincode::deserialize(data).map_err(|e| RomError::Snapshot(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(RomError::Snapshot(format!(
            "unsupported version {} (expected {SNAPSHOT_VERSION})",
            snapshot.version
        )));
    }
    Ok(snapshot.rom)
}
