use crate::game::agent::AgentSettings;
use crate::game::bounds::{ArenaBounds, BoundsError};
use crate::game::chain::ChainSettings;
use crate::game::collision::OverlapRadii;
use crate::game::constants::*;
use crate::game::food::FoodSettings;
use crate::game::types::{AgentKind, EdgePolicy, FollowStrategy, Point};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AreaConfig {
    pub min: Point,
    pub max: Point,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub move_speed: f64,
    pub rotation_speed: f64,
    pub starting_segments: usize,
    pub follow_strategy: FollowStrategy,
    pub edge_policy: EdgePolicy,
}

impl AgentConfig {
    pub fn player() -> Self {
        Self {
            move_speed: PLAYER_MOVE_SPEED,
            rotation_speed: PLAYER_ROTATION_SPEED,
            starting_segments: STARTING_SEGMENTS,
            follow_strategy: FollowStrategy::LeaderChain,
            edge_policy: EdgePolicy::Wrap,
        }
    }

    pub fn ai() -> Self {
        Self {
            move_speed: AI_MOVE_SPEED,
            rotation_speed: AI_ROTATION_SPEED,
            ..Self::player()
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::player()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmentConfig {
    /// Smoothing rate for history-following segments.
    pub follow_speed: f64,
    /// Step speed for leader-chained segments. Should outpace the head.
    pub move_speed: f64,
    /// Trailing gap between a chained segment and its leader.
    pub spacing: f64,
    pub max_segments: Option<usize>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            follow_speed: SEGMENT_FOLLOW_SPEED,
            move_speed: SEGMENT_MOVE_SPEED,
            spacing: SEGMENT_SPACING,
            max_segments: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    /// Ticks of history between consecutive segments.
    pub spacing: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            spacing: HISTORY_SPACING,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollisionConfig {
    pub self_radius: f64,
    /// Segments right behind the head that never count as self-hits.
    pub self_skip_segments: usize,
    pub overlap_radius: f64,
    pub food_radius: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            self_radius: SELF_COLLISION_RADIUS,
            self_skip_segments: SELF_COLLISION_SKIP,
            overlap_radius: OVERLAP_RADIUS,
            food_radius: FOOD_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub count: usize,
    pub direction_change_interval: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            count: AI_COUNT,
            direction_change_interval: AI_DIRECTION_CHANGE_INTERVAL,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FoodConfig {
    pub initial_count: usize,
    pub min_distance_from_snakes: f64,
    pub max_spawn_attempts: usize,
    pub growth_amount: usize,
    pub points_per_pellet: i64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            initial_count: FOOD_INITIAL_COUNT,
            min_distance_from_snakes: FOOD_MIN_DISTANCE_FROM_SNAKES,
            max_spawn_attempts: FOOD_MAX_SPAWN_ATTEMPTS,
            growth_amount: FOOD_GROWTH_AMOUNT,
            points_per_pellet: POINTS_PER_PELLET,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Physics tick length in seconds.
    pub fixed_dt: f64,
    /// Wall-clock period of the decision phase in the session loop.
    pub frame_ms: u64,
    pub max_steps_per_frame: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            frame_ms: FRAME_MS,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub arena: AreaConfig,
    /// Region AI snakes spawn in. Intersected with the arena.
    pub spawn_area: AreaConfig,
    pub player: AgentConfig,
    pub ai_agent: AgentConfig,
    pub ai: AiConfig,
    pub segment: SegmentConfig,
    pub history: HistoryConfig,
    pub collision: CollisionConfig,
    pub food: FoodConfig,
    pub timing: TimingConfig,
    /// Fixed seed for reproducible sessions; entropy-seeded when absent.
    pub rng_seed: Option<u64>,
    /// How long the headless binary runs before printing its summary.
    pub run_seconds: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: AreaConfig {
                min: Point::new(ARENA_MIN_X, ARENA_MIN_Y),
                max: Point::new(ARENA_MAX_X, ARENA_MAX_Y),
            },
            spawn_area: AreaConfig {
                min: Point::new(SPAWN_AREA_MIN_X, SPAWN_AREA_MIN_Y),
                max: Point::new(SPAWN_AREA_MAX_X, SPAWN_AREA_MAX_Y),
            },
            player: AgentConfig::player(),
            ai_agent: AgentConfig::ai(),
            ai: AiConfig::default(),
            segment: SegmentConfig::default(),
            history: HistoryConfig::default(),
            collision: CollisionConfig::default(),
            food: FoodConfig::default(),
            timing: TimingConfig::default(),
            rng_seed: None,
            run_seconds: RUN_SECONDS,
        }
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn parse_strategy(value: &str) -> Option<FollowStrategy> {
    match value.trim() {
        "leader_chain" | "leader" => Some(FollowStrategy::LeaderChain),
        "history_smoothed" | "history" => Some(FollowStrategy::HistorySmoothed),
        _ => None,
    }
}

impl GameConfig {
    /// Loads `SLITHER_CONFIG` (if set), applies environment overrides and validates.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var("SLITHER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(count) = lookup("AI_SNAKE_COUNT").and_then(|value| value.trim().parse().ok()) {
            self.ai.count = count;
        }
        if let Some(seed) = lookup("RNG_SEED").and_then(|value| value.trim().parse().ok()) {
            self.rng_seed = Some(seed);
        }
        if let Some(frame_ms) = lookup("FRAME_MS").and_then(|value| value.trim().parse().ok()) {
            self.timing.frame_ms = frame_ms;
        }
        if let Some(seconds) = lookup("RUN_SECONDS").and_then(|value| value.trim().parse().ok()) {
            self.run_seconds = seconds;
        }
        if let Some(strategy) = lookup("FOLLOW_STRATEGY").and_then(|value| parse_strategy(&value)) {
            self.player.follow_strategy = strategy;
            self.ai_agent.follow_strategy = strategy;
        }
    }

    pub fn bounds(&self) -> Result<ArenaBounds, ConfigError> {
        Ok(ArenaBounds::new(self.arena.min, self.arena.max)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = self.bounds()?;
        let spawn_min = self.spawn_area.min;
        let spawn_max = self.spawn_area.max;
        if !spawn_min.is_finite() || !spawn_max.is_finite() {
            return Err(ConfigError::Invalid("spawn_area must be finite"));
        }
        if spawn_max.x < bounds.min().x
            || spawn_min.x > bounds.max().x
            || spawn_max.y < bounds.min().y
            || spawn_min.y > bounds.max().y
        {
            return Err(ConfigError::Invalid("spawn_area does not overlap the arena"));
        }
        for agent in [&self.player, &self.ai_agent] {
            if !non_negative(agent.move_speed) || !non_negative(agent.rotation_speed) {
                return Err(ConfigError::Invalid("agent speeds must be finite and >= 0"));
            }
        }
        if !non_negative(self.segment.follow_speed)
            || !non_negative(self.segment.move_speed)
            || !non_negative(self.segment.spacing)
        {
            return Err(ConfigError::Invalid("segment settings must be finite and >= 0"));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid("history.capacity must be at least 1"));
        }
        if self.history.spacing == 0 {
            return Err(ConfigError::Invalid("history.spacing must be at least 1"));
        }
        if !non_negative(self.collision.self_radius)
            || !non_negative(self.collision.overlap_radius)
            || !non_negative(self.collision.food_radius)
        {
            return Err(ConfigError::Invalid("collision radii must be finite and >= 0"));
        }
        if !non_negative(self.ai.direction_change_interval) {
            return Err(ConfigError::Invalid("ai.direction_change_interval must be >= 0"));
        }
        if !non_negative(self.food.min_distance_from_snakes) {
            return Err(ConfigError::Invalid("food.min_distance_from_snakes must be >= 0"));
        }
        if !(self.timing.fixed_dt.is_finite() && self.timing.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid("timing.fixed_dt must be > 0"));
        }
        if self.timing.frame_ms == 0 || self.timing.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid("timing.frame_ms and max_steps_per_frame must be > 0"));
        }
        if Duration::try_from_secs_f64(self.run_seconds).is_err() {
            return Err(ConfigError::Invalid("run_seconds must be a representable duration"));
        }
        Ok(())
    }

    pub fn agent_settings(&self, kind: AgentKind) -> AgentSettings {
        let agent = match kind {
            AgentKind::Player => &self.player,
            AgentKind::Ai => &self.ai_agent,
        };
        AgentSettings {
            move_speed: agent.move_speed,
            rotation_speed: agent.rotation_speed,
            starting_segments: agent.starting_segments,
            edge_policy: agent.edge_policy,
            chain: ChainSettings {
                strategy: agent.follow_strategy,
                follow_speed: self.segment.follow_speed,
                move_speed: self.segment.move_speed,
                spacing: self.segment.spacing,
                history_spacing: self.history.spacing,
                max_segments: self.segment.max_segments,
            },
            history_capacity: self.history.capacity,
            self_collision_radius: self.collision.self_radius,
            self_collision_skip: self.collision.self_skip_segments,
            direction_change_interval: self.ai.direction_change_interval,
        }
    }

    pub fn food_settings(&self) -> FoodSettings {
        FoodSettings {
            initial_count: self.food.initial_count,
            min_distance_from_snakes: self.food.min_distance_from_snakes,
            max_spawn_attempts: self.food.max_spawn_attempts,
            growth_amount: self.food.growth_amount,
        }
    }

    pub fn overlap_radii(&self) -> OverlapRadii {
        OverlapRadii {
            body: self.collision.overlap_radius,
            food: self.collision.food_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.ai.count, 3);
        assert_eq!(config.ai_agent.move_speed, 4.0);
        assert_eq!(config.player.move_speed, 5.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "ai": { "count": 7 }, "player": { "follow_strategy": "history_smoothed" } }"#,
        )
        .expect("parse partial config");
        assert_eq!(config.ai.count, 7);
        assert_eq!(config.ai.direction_change_interval, AI_DIRECTION_CHANGE_INTERVAL);
        assert_eq!(config.player.follow_strategy, FollowStrategy::HistorySmoothed);
        assert_eq!(config.history.capacity, HISTORY_CAPACITY);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("AI_SNAKE_COUNT", "5"),
            ("RNG_SEED", "99"),
            ("FOLLOW_STRATEGY", "history"),
            ("FRAME_MS", "not-a-number"),
            ("RUN_SECONDS", "1e30"),
        ]
        .into_iter()
        .collect();
        let mut config = GameConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(config.ai.count, 5);
        assert_eq!(config.rng_seed, Some(99));
        assert_eq!(config.player.follow_strategy, FollowStrategy::HistorySmoothed);
        assert_eq!(config.ai_agent.follow_strategy, FollowStrategy::HistorySmoothed);
        assert_eq!(config.timing.frame_ms, FRAME_MS);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.arena.max = config.arena.min;
        assert!(matches!(config.validate(), Err(ConfigError::Bounds(_))));

        let mut config = GameConfig::default();
        config.history.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.timing.fixed_dt = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        for seconds in [-1.0, f64::NAN, f64::INFINITY, 1e30] {
            let mut config = GameConfig::default();
            config.run_seconds = seconds;
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        let mut config = GameConfig::default();
        config.spawn_area.min = Point::new(100.0, 100.0);
        config.spawn_area.max = Point::new(200.0, 200.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn arena_bounds_deserialize_with_validation() {
        let bounds: ArenaBounds =
            serde_json::from_str(r#"{ "min": { "x": -1.0, "y": -1.0 }, "max": { "x": 1.0, "y": 1.0 } }"#)
                .expect("valid bounds");
        assert_eq!(bounds.size(), Point::new(2.0, 2.0));
        assert!(serde_json::from_str::<ArenaBounds>(
            r#"{ "min": { "x": 1.0, "y": -1.0 }, "max": { "x": 1.0, "y": 1.0 } }"#
        )
        .is_err());
    }
}
