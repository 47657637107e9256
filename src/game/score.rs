use super::constants::HIGH_SCORE_KEY;
use std::collections::HashMap;

/// Integer key-value store used for the high score.
pub trait ScoreStore: Send {
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    values: HashMap<String, i64>,
}

impl ScoreStore for MemoryScoreStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}

pub struct ScoreBoard {
    current: i64,
    high: i64,
    store: Box<dyn ScoreStore>,
}

impl std::fmt::Debug for ScoreBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreBoard")
            .field("current", &self.current)
            .field("high", &self.high)
            .finish()
    }
}

impl ScoreBoard {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        let high = store.get_int(HIGH_SCORE_KEY, 0);
        Self {
            current: 0,
            high,
            store,
        }
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn add(&mut self, points: i64) {
        self.current += points;
        if self.current > self.high {
            self.high = self.current;
            self.store.set_int(HIGH_SCORE_KEY, self.high);
        }
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}
