use super::math::clamp;
use super::types::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BoundsError {
    #[error("arena must satisfy min < max on both axes (min={min:?}, max={max:?})")]
    Empty { min: Point, max: Point },
}

/// Fixed axis-aligned play area. Built once and shared read-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds", into = "RawBounds")]
pub struct ArenaBounds {
    min: Point,
    max: Point,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawBounds {
    min: Point,
    max: Point,
}

impl TryFrom<RawBounds> for ArenaBounds {
    type Error = BoundsError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        ArenaBounds::new(raw.min, raw.max)
    }
}

impl From<ArenaBounds> for RawBounds {
    fn from(bounds: ArenaBounds) -> Self {
        RawBounds {
            min: bounds.min,
            max: bounds.max,
        }
    }
}

impl ArenaBounds {
    pub fn new(min: Point, max: Point) -> Result<Self, BoundsError> {
        if !min.is_finite() || !max.is_finite() || min.x >= max.x || min.y >= max.y {
            return Err(BoundsError::Empty { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Single-step teleport to the opposite edge on each axis that is out of range.
    pub fn wrap(&self, p: Point) -> Point {
        let mut wrapped = p;

        if p.x < self.min.x {
            wrapped.x = self.max.x;
        } else if p.x > self.max.x {
            wrapped.x = self.min.x;
        }

        if p.y < self.min.y {
            wrapped.y = self.max.y;
        } else if p.y > self.max.y {
            wrapped.y = self.min.y;
        }

        wrapped
    }

    pub fn clamp(&self, p: Point) -> Point {
        Point {
            x: clamp(p.x, self.min.x, self.max.x),
            y: clamp(p.y, self.min.y, self.max.y),
        }
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point {
            x: rng.gen_range(self.min.x..=self.max.x),
            y: rng.gen_range(self.min.y..=self.max.y),
        }
    }

    /// Uniform point inside the intersection of the arena and the given area.
    /// An area that misses the arena entirely degrades to the nearest arena edge.
    pub fn random_point_in_area<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        area_min: Point,
        area_max: Point,
    ) -> Point {
        let lo = self.clamp(Point {
            x: area_min.x.min(area_max.x),
            y: area_min.y.min(area_max.y),
        });
        let hi = self.clamp(Point {
            x: area_min.x.max(area_max.x),
            y: area_min.y.max(area_max.y),
        });
        Point {
            x: if lo.x < hi.x { rng.gen_range(lo.x..=hi.x) } else { lo.x },
            y: if lo.y < hi.y { rng.gen_range(lo.y..=hi.y) } else { lo.y },
        }
    }

    /// Distance to the closest edge. Negative once `p` is outside.
    pub fn nearest_edge_distance(&self, p: Point) -> f64 {
        let left = p.x - self.min.x;
        let right = self.max.x - p.x;
        let bottom = p.y - self.min.y;
        let top = self.max.y - p.y;
        left.min(right).min(bottom).min(top)
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }
}
