use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn is_finite(self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }
}

impl Add for Point {
  type Output = Point;

  fn add(self, rhs: Point) -> Point {
    Point {
      x: self.x + rhs.x,
      y: self.y + rhs.y,
    }
  }
}

impl AddAssign for Point {
  fn add_assign(&mut self, rhs: Point) {
    self.x += rhs.x;
    self.y += rhs.y;
  }
}

impl Sub for Point {
  type Output = Point;

  fn sub(self, rhs: Point) -> Point {
    Point {
      x: self.x - rhs.x,
      y: self.y - rhs.y,
    }
  }
}

impl Mul<f64> for Point {
  type Output = Point;

  fn mul(self, rhs: f64) -> Point {
    Point {
      x: self.x * rhs,
      y: self.y * rhs,
    }
  }
}

impl Neg for Point {
  type Output = Point;

  fn neg(self) -> Point {
    Point {
      x: -self.x,
      y: -self.y,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
  Player,
  Ai,
}

/// Closed set of overlap participants. Replaces free-form tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
  Player,
  AiSnake,
  Food,
}

impl From<AgentKind> for CollisionKind {
  fn from(kind: AgentKind) -> Self {
    match kind {
      AgentKind::Player => CollisionKind::Player,
      AgentKind::Ai => CollisionKind::AiSnake,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowStrategy {
  /// Each segment lerps toward a point sampled from the head's position history.
  HistorySmoothed,
  /// Each segment steps toward a trailing point behind the element ahead of it.
  #[default]
  LeaderChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
  #[default]
  Wrap,
  Clamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
  pub id: u64,
  pub kind: AgentKind,
  pub alive: bool,
  pub head: Point,
  pub heading: Point,
  pub facing: f64,
  pub segments: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
  pub tick: u64,
  pub score: i64,
  pub high_score: i64,
  pub game_over: bool,
  pub victory: bool,
  pub pellets: Vec<Point>,
  pub agents: Vec<AgentSnapshot>,
}
