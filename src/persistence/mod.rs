use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

use crate::{
    core::WaniAnkiError,
    wanikani::Subject,
};

/// Subjects seen on previous runs, keyed by subject id.
pub type SubjectCache = BTreeMap<u64, Subject>;

pub fn save_json<T: Serialize>(data: &T, path: &Path) -> Result<(), WaniAnkiError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    debug!("Data saved to: {}", path.display());
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T, WaniAnkiError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)?;
    if json.trim().is_empty() {
        return Ok(T::default());
    }

    let data: T = serde_json::from_str(&json)?;
    debug!("Data loaded from: {}", path.display());
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    match load_json::<T>(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to load {}: {}. Starting from an empty cache.", path.display(), e);
            T::default()
        }
    }
}

pub fn load_cache(path: &Path) -> SubjectCache {
    load_json_or_default(path)
}

pub fn save_cache(path: &Path, cache: &SubjectCache) -> Result<(), WaniAnkiError> {
    save_json(cache, path)
}

/// Fresh subjects replace cached entries with the same id.
pub fn merge(cache: &mut SubjectCache, fresh: Vec<Subject>) {
    for subject in fresh {
        cache.insert(subject.id, subject);
    }
}
