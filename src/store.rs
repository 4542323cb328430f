/// Persistence gateway. Profiles are plain string key-value pairs so any store
/// can hold them; `Gateway` is the typed view the session talks to.
use std::{collections::HashMap, path::PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use log::*;

pub const STREAK_KEY: &str = "seecretStreak";
pub const LAST_PLAYED_KEY: &str = "seecretLastPlayed";
pub const HIGH_CONTRAST_KEY: &str = "seecretHighContrast";
pub const BEST_COUNT_KEY: &str = "seecretBestCount";

const DATE_FORMAT: &str = "%Y-%m-%d";
// Written by older clients, e.g. "Mon Jun 09 2025".
const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y";

/// KeyValueStore is the storage behind a profile. Writes are synchronous and the
/// last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()>;
}

/// MemoryStore keeps values for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JsonFileStore keeps one JSON object per player on disk. Without a path it
/// behaves like a MemoryStore.
#[derive(Debug, Clone, Default)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty profile.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<JsonFileStore> {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(contents) => serde_json::from_slice(&contents).context(format!(
                "Error deserializing profile from {}",
                path.display()
            ))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).context(format!("Error reading file {}", path.display()));
            }
        };

        Ok(JsonFileStore {
            path: Some(path),
            values,
        })
    }

    /// Opens `{save_dir}/{player}.json`, or an unsaved store if there's no save dir.
    pub fn for_player(save_dir: &str, player: &str) -> anyhow::Result<JsonFileStore> {
        if save_dir.is_empty() {
            return Ok(JsonFileStore::default());
        }
        JsonFileStore::open(PathBuf::from(save_dir).join(format!("{}.json", player)))
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_json::to_vec(&self.values).context("Error serializing profile")?;
        std::fs::write(path, contents).context(format!("Error writing file {}", path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}

/// Profile is the cross-session record for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub streak: u32,
    pub last_played: Option<NaiveDate>,
    pub high_contrast: bool,
    pub best_count: usize,
}

impl Profile {
    /// The streak as of `today`: a streak whose last win is older than yesterday
    /// has lapsed.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match self.last_played {
            Some(last) if (today - last).num_days() <= 1 => self.streak,
            _ => 0,
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, LEGACY_DATE_FORMAT))
        .ok()
}

/// Gateway reads and writes profile fields. Absent or unreadable values read as
/// their defaults; failed writes are logged and don't interrupt play.
#[derive(Debug, Clone, Default)]
pub struct Gateway<S> {
    store: S,
}

impl<S: KeyValueStore> Gateway<S> {
    pub fn new(store: S) -> Gateway<S> {
        Gateway { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key)?;
        match value.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring unreadable profile value {}={:?}", key, value);
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, value) {
            error!("Error saving {}: {:#}", key, e);
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            streak: self.read(STREAK_KEY).unwrap_or_default(),
            last_played: self.store.get(LAST_PLAYED_KEY).and_then(|v| parse_date(v.trim())),
            high_contrast: self
                .store
                .get(HIGH_CONTRAST_KEY)
                .map(|v| v == "true")
                .unwrap_or_default(),
            best_count: self.read(BEST_COUNT_KEY).unwrap_or_default(),
        }
    }

    /// Records a win on `today` and returns the new streak. A second win on the
    /// same day doesn't extend the streak; a gap of more than a day restarts it.
    pub fn record_win(&mut self, today: NaiveDate) -> u32 {
        let profile = self.profile();
        let streak = match profile.last_played {
            Some(last) if last == today => profile.streak.max(1),
            Some(last) if (today - last).num_days() == 1 => profile.streak.saturating_add(1),
            _ => 1,
        };

        self.write(STREAK_KEY, streak.to_string());
        self.write(LAST_PLAYED_KEY, today.format(DATE_FORMAT).to_string());
        streak
    }

    pub fn set_best_count(&mut self, count: usize) {
        self.write(BEST_COUNT_KEY, count.to_string());
    }

    pub fn set_high_contrast(&mut self, enabled: bool) {
        self.write(HIGH_CONTRAST_KEY, enabled.to_string());
    }

    /// Flips the high-contrast preference and returns the new value.
    pub fn toggle_high_contrast(&mut self) -> bool {
        let enabled = !self.profile().high_contrast;
        self.set_high_contrast(enabled);
        enabled
    }
}
