use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::location::Coordinate;

/// Key the last played location is stored under.
pub const STORAGE_KEY: &str = "currentPosition";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remembers the last actual location so a restarted client can show the
/// same panorama again.
///
/// No transactional guarantees. Failures are logged and otherwise ignored.
pub trait LocationStore: Send + Sync {
    fn load(&self) -> Option<Coordinate>;
    fn save(&self, location: Option<Coordinate>);
}

#[derive(Default)]
pub struct MemoryLocationStore {
    value: Mutex<Option<Coordinate>>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(location: Coordinate) -> Self {
        Self {
            value: Mutex::new(Some(location)),
        }
    }
}

impl LocationStore for MemoryLocationStore {
    fn load(&self) -> Option<Coordinate> {
        match self.value.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn save(&self, location: Option<Coordinate>) {
        match self.value.lock() {
            Ok(mut guard) => *guard = location,
            Err(poisoned) => *poisoned.into_inner() = location,
        }
    }
}

/// A JSON object on disk, with the location under [`STORAGE_KEY`].
///
/// Other keys in the file are preserved. A file that is not a JSON object is
/// replaced on the next save, with a warning; an unreadable one is left alone.
pub struct JsonFileLocationStore {
    path: PathBuf,
}

impl JsonFileLocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(source) => Ok(serde_json::from_str(&source)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn try_load(&self) -> Result<Option<Coordinate>, StoreError> {
        let Some(value) = self.read_all()?.remove(STORAGE_KEY) else {
            return Ok(None);
        };

        let location: Option<Coordinate> = serde_json::from_value(value)?;
        Ok(location.filter(Coordinate::is_valid))
    }

    fn try_save(&self, location: Option<Coordinate>) -> Result<(), StoreError> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Json(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "replacing malformed store");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        match location {
            Some(location) => {
                entries.insert(STORAGE_KEY.to_string(), serde_json::to_value(location)?);
            }
            None => {
                entries.remove(STORAGE_KEY);
            }
        }

        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

impl LocationStore for JsonFileLocationStore {
    fn load(&self) -> Option<Coordinate> {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to load last location");
            None
        })
    }

    fn save(&self, location: Option<Coordinate>) {
        if let Err(e) = self.try_save(location) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save last location");
        }
    }
}
