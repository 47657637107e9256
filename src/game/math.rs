use super::types::Point;
use rand::Rng;

pub fn length(point: Point) -> f64 {
  (point.x * point.x + point.y * point.y).sqrt()
}

pub fn distance(a: Point, b: Point) -> f64 {
  length(b - a)
}

pub fn normalize(point: Point) -> Point {
  let len = length(point);
  if !len.is_finite() || len == 0.0 {
    return Point::ZERO;
  }
  Point {
    x: point.x / len,
    y: point.y / len,
  }
}

pub fn dot(a: Point, b: Point) -> f64 {
  a.x * b.x + a.y * b.y
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
  value.min(max).max(min)
}

pub fn clamp01(value: f64) -> f64 {
  clamp(value, 0.0, 1.0)
}

pub fn lerp(from: Point, to: Point, t: f64) -> Point {
  let t = clamp01(t);
  from + (to - from) * t
}

/// Steps at most `max_delta` from `current` toward `target`, landing on it when closer.
pub fn move_towards(current: Point, target: Point, max_delta: f64) -> Point {
  let delta = target - current;
  let dist = length(delta);
  if dist <= max_delta || dist == 0.0 {
    return target;
  }
  current + delta * (max_delta / dist)
}

/// Shortest signed difference between two angles in degrees, in (-180, 180].
pub fn delta_angle(current: f64, target: f64) -> f64 {
  let mut delta = (target - current).rem_euclid(360.0);
  if delta > 180.0 {
    delta -= 360.0;
  }
  delta
}

pub fn move_towards_angle(current: f64, target: f64, max_delta: f64) -> f64 {
  let delta = delta_angle(current, target);
  let next = if delta.abs() <= max_delta {
    current + delta
  } else {
    current + max_delta * delta.signum()
  };
  next.rem_euclid(360.0)
}

/// Facing angle in degrees for a heading, with 0 pointing along +y.
pub fn heading_angle(heading: Point) -> f64 {
  heading.y.atan2(heading.x).to_degrees() - 90.0
}

/// Unit vector the facing angle points at.
pub fn facing_direction(angle_degrees: f64) -> Point {
  let radians = (angle_degrees + 90.0).to_radians();
  Point {
    x: radians.cos(),
    y: radians.sin(),
  }
}

pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Point {
  let angle = rng.gen::<f64>() * std::f64::consts::PI * 2.0;
  Point {
    x: angle.cos(),
    y: angle.sin(),
  }
}

pub fn overlaps(a: Point, b: Point, radius: f64) -> bool {
  distance(a, b) < radius
}
