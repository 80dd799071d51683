//! Character selection and its persistent key-value store.
//!
//! The store holds string values under string keys; the session reads the
//! `selectedCharacter` key once at start-up.

use std::collections::BTreeMap;

use bevy::prelude::*;
use thiserror::Error;

/// Key under which the chosen character identifier is stored.
pub const SELECTED_CHARACTER_KEY: &str = "selectedCharacter";

/// Errors from reading or writing a selection store.
#[derive(Debug, Error)]
#[cfg_attr(
    not(any(feature = "native", test)),
    expect(dead_code, reason = "only the RON file store fails")
)]
pub enum SelectionStoreError {
    /// Reading or writing the backing file failed.
    #[error("selection store i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a RON string map.
    #[error("selection store parse: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The map could not be encoded.
    #[error("selection store serialize: {0}")]
    Serialize(#[from] ron::Error),
}

/// String key-value persistence.
pub trait SelectionStore {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, SelectionStoreError>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SelectionStoreError>;
}

/// In-memory store, used when no file is configured.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(BTreeMap<String, String>);

impl SelectionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SelectionStoreError> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SelectionStoreError> {
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// RON map file. A missing file reads as empty.
#[cfg(any(feature = "native", test))]
#[derive(Clone, Debug)]
pub struct RonFileStore {
    path: std::path::PathBuf,
}

#[cfg(any(feature = "native", test))]
impl RonFileStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SelectionStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(ron::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(any(feature = "native", test))]
impl SelectionStore for RonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SelectionStoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SelectionStoreError> {
        let mut all = self.read_all()?;
        all.insert(key.to_owned(), value.to_owned());
        let data = ron::ser::to_string_pretty(&all, ron::ser::PrettyConfig::default())?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Playable characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum Character {
    /// White suit, blue visor.
    #[default]
    Astronaut,
    /// Grey suit, green visor.
    Scout,
    /// Black armour, red visor.
    Heavy,
    /// White suit, purple visor.
    Tech,
    /// White suit, slate visor.
    Stealth,
}

/// Avatar colours for one character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Body, arms and legs.
    pub suit: Color,
    /// Helmet visor.
    pub helmet: Color,
    /// Backpack.
    pub backpack: Color,
}

impl Character {
    /// Every character in menu order.
    pub const ALL: [Character; 5] = [
        Character::Astronaut,
        Character::Scout,
        Character::Heavy,
        Character::Tech,
        Character::Stealth,
    ];

    /// Stored identifier.
    pub fn id(self) -> &'static str {
        match self {
            Character::Astronaut => "astronaut",
            Character::Scout => "scout",
            Character::Heavy => "heavy",
            Character::Tech => "tech",
            Character::Stealth => "stealth",
        }
    }

    /// Character for a stored identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Avatar colours.
    pub fn palette(self) -> Palette {
        let (suit, helmet, backpack) = match self {
            Character::Astronaut => (0xffffff, 0x2196f3, 0xcccccc),
            Character::Scout => (0x626262, 0x22c55e, 0xcccccc),
            Character::Heavy => (0x141414, 0xef4444, 0x323232),
            Character::Tech => (0xffffff, 0xa855f7, 0xcccccc),
            Character::Stealth => (0xffffff, 0x64748b, 0xcccccc),
        };
        Palette {
            suit: rgb(suit),
            helmet: rgb(helmet),
            backpack: rgb(backpack),
        }
    }
}

fn rgb(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Character chosen for this session.
#[derive(Resource, Clone, Copy, Debug, Default, Reflect)]
pub struct SelectedCharacter(pub Character);

/// Reads the stored character, falling back to the default on any problem.
pub fn load_character(store: &dyn SelectionStore) -> Character {
    match store.get(SELECTED_CHARACTER_KEY) {
        Ok(Some(id)) => Character::from_id(&id).unwrap_or_else(|| {
            warn!("unknown character {id:?}, using {}", Character::default().id());
            Character::default()
        }),
        Ok(None) => {
            info!("no stored character, using {}", Character::default().id());
            Character::default()
        }
        Err(e) => {
            warn!("{e}, using {}", Character::default().id());
            Character::default()
        }
    }
}
