pub const ARENA_MIN_X: f64 = -25.0;
pub const ARENA_MIN_Y: f64 = -15.0;
pub const ARENA_MAX_X: f64 = 25.0;
pub const ARENA_MAX_Y: f64 = 15.0;

pub const SPAWN_AREA_MIN_X: f64 = -20.0;
pub const SPAWN_AREA_MIN_Y: f64 = -15.0;
pub const SPAWN_AREA_MAX_X: f64 = 20.0;
pub const SPAWN_AREA_MAX_Y: f64 = 15.0;

pub const PLAYER_MOVE_SPEED: f64 = 5.0;
pub const PLAYER_ROTATION_SPEED: f64 = 200.0;
pub const AI_MOVE_SPEED: f64 = 4.0;
pub const AI_ROTATION_SPEED: f64 = 150.0;
pub const STARTING_SEGMENTS: usize = 3;

pub const SEGMENT_FOLLOW_SPEED: f64 = 10.0;
pub const SEGMENT_MOVE_SPEED: f64 = 10.0;
pub const SEGMENT_SPACING: f64 = 0.5;

pub const HISTORY_CAPACITY: usize = 100;
pub const HISTORY_SPACING: usize = 5;

pub const SELF_COLLISION_RADIUS: f64 = 0.4;
pub const SELF_COLLISION_SKIP: usize = 3;
pub const OVERLAP_RADIUS: f64 = 0.4;
pub const FOOD_RADIUS: f64 = 0.5;

pub const AI_COUNT: usize = 3;
pub const AI_DIRECTION_CHANGE_INTERVAL: f64 = 2.0;

pub const FOOD_INITIAL_COUNT: usize = 20;
pub const FOOD_MIN_DISTANCE_FROM_SNAKES: f64 = 2.0;
pub const FOOD_MAX_SPAWN_ATTEMPTS: usize = 10;
pub const FOOD_GROWTH_AMOUNT: usize = 1;
pub const POINTS_PER_PELLET: i64 = 10;

pub const FIXED_DT: f64 = 0.02;
pub const FRAME_MS: u64 = 16;
pub const MAX_STEPS_PER_FRAME: u32 = 8;
pub const RUN_SECONDS: f64 = 30.0;

pub const HIGH_SCORE_KEY: &str = "HighScore";
