// src/repositories/config_repository.rs

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::AppResult;

/// Well-known configuration keys
pub mod keys {
    /// How many days of schedule to keep materialized ahead of "now"
    pub const PLAYOUT_DAYS_TO_BUILD: &str = "playout.days_to_build";
}

/// Default for `keys::PLAYOUT_DAYS_TO_BUILD` when unset or unparsable
pub const DEFAULT_DAYS_TO_BUILD: u32 = 2;

/// Access to scalar configuration values.
///
/// A missing or invalid value is reported as `Ok(None)`; callers fall back
/// to a documented default instead of failing the build.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigRepository: Send + Sync {
    fn get_int(&self, key: &str) -> AppResult<Option<i64>>;
}

/// HashMap-backed implementation for tests and embedded use
pub struct InMemoryConfigRepository {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryConfigRepository {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    pub fn set(&self, key: &str, value: impl ToString) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for InMemoryConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRepository for InMemoryConfigRepository {
    fn get_int(&self, key: &str) -> AppResult<Option<i64>> {
        let values = self.values.read().unwrap();
        match values.get(key) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    log::warn!("config value {}={:?} is not an integer", key, raw);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}
