//! Save/Load functionality for persisting session state
//!
//! Uses bincode for efficient binary serialization of the entire session,
//! with a JSON form for inspection and debugging. The storage medium is the
//! caller's concern: anything implementing `Read`/`Write` works. A caller
//! with no saved state simply constructs a fresh `LearnerSession`.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use ecosprout_logic::curriculum::CurriculumGraph;
use ecosprout_logic::growth::TreeGrowth;
use ecosprout_logic::inventory::Inventory;
use ecosprout_logic::progression::Progression;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the session state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Curriculum graph the progression state refers to
    pub curriculum: CurriculumGraph,
    /// Unlock/completion state
    pub progression: Progression,
    /// Resource counts
    pub inventory: Inventory,
    /// Tree stage and cost table
    pub growth: TreeGrowth,
}

/// Result of loading a session
#[derive(Debug)]
pub struct LoadedSession {
    pub curriculum: CurriculumGraph,
    pub progression: Progression,
    pub inventory: Inventory,
    pub growth: TreeGrowth,
}

fn snapshot(
    curriculum: &CurriculumGraph,
    progression: &Progression,
    inventory: &Inventory,
    growth: &TreeGrowth,
) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        curriculum: curriculum.clone(),
        progression: progression.clone(),
        inventory: inventory.clone(),
        growth: growth.clone(),
    }
}

fn unpack(save_data: SaveData) -> Result<LoadedSession, SaveError> {
    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    Ok(LoadedSession {
        curriculum: save_data.curriculum,
        progression: save_data.progression,
        inventory: save_data.inventory,
        growth: save_data.growth,
    })
}

/// Save the complete session to a writer
pub fn save_session<W: Write>(
    writer: W,
    curriculum: &CurriculumGraph,
    progression: &Progression,
    inventory: &Inventory,
    growth: &TreeGrowth,
) -> Result<(), SaveError> {
    let save_data = snapshot(curriculum, progression, inventory, growth);
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a session from a reader
pub fn load_session<R: Read>(reader: R) -> Result<LoadedSession, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    unpack(save_data)
}

/// Save the complete session as a JSON string
pub fn save_session_json(
    curriculum: &CurriculumGraph,
    progression: &Progression,
    inventory: &Inventory,
    growth: &TreeGrowth,
) -> Result<String, SaveError> {
    let save_data = snapshot(curriculum, progression, inventory, growth);
    Ok(serde_json::to_string_pretty(&save_data)?)
}

/// Load a session from a JSON string
pub fn load_session_json(json: &str) -> Result<LoadedSession, SaveError> {
    let save_data: SaveData = serde_json::from_str(json)?;
    unpack(save_data)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
