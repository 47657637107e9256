pub mod agent;
pub mod bounds;
pub mod chain;
pub mod collision;
pub mod constants;
pub mod events;
pub mod food;
pub mod history;
pub mod input;
pub mod math;
pub mod scheduler;
pub mod score;
pub mod segment;
pub mod types;
pub mod world;
