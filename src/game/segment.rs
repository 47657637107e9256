use super::math::{distance, lerp, move_towards, normalize};
use super::types::Point;
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a segment inside its owning chain. Stale once the segment is released.
    pub struct SegmentId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leader {
    Head,
    Segment(SegmentId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentTarget {
    /// Externally pushed point, approached by exponential smoothing.
    Position(Point),
    /// Trailing point `distance` behind a leader, approached at constant speed.
    Leader { leader: Leader, distance: f64 },
}

#[derive(Debug, Clone)]
pub struct Segment {
    position: Point,
    target: SegmentTarget,
    follow_speed: f64,
    move_speed: f64,
}

impl Segment {
    pub fn smoothed(position: Point, follow_speed: f64) -> Self {
        Self {
            position,
            target: SegmentTarget::Position(position),
            follow_speed: follow_speed.max(0.0),
            move_speed: 0.0,
        }
    }

    pub fn chained(position: Point, leader: Leader, distance: f64, move_speed: f64) -> Self {
        Self {
            position,
            target: SegmentTarget::Leader {
                leader,
                distance: distance.max(0.0),
            },
            follow_speed: 0.0,
            move_speed: move_speed.max(0.0),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn target(&self) -> SegmentTarget {
        self.target
    }

    pub fn leader(&self) -> Option<Leader> {
        match self.target {
            SegmentTarget::Leader { leader, .. } => Some(leader),
            SegmentTarget::Position(_) => None,
        }
    }

    pub fn follow_position(&mut self, p: Point) {
        self.target = SegmentTarget::Position(p);
    }

    pub fn set_target(&mut self, leader: Leader, distance: f64) {
        self.target = SegmentTarget::Leader {
            leader,
            distance: distance.max(0.0),
        };
    }

    /// Moves one physics tick toward the current target.
    ///
    /// `leader_position` is only consulted for leader targets; `None` there means the
    /// leader is gone and the segment holds its last position.
    pub fn advance(&mut self, dt: f64, leader_position: Option<Point>) {
        match self.target {
            SegmentTarget::Position(target) => {
                self.position = lerp(self.position, target, self.follow_speed * dt);
            }
            SegmentTarget::Leader { distance, .. } => {
                let Some(leader_pos) = leader_position else { return };
                let direction = normalize(leader_pos - self.position);
                let desired = leader_pos - direction * distance;
                self.position = move_towards(self.position, desired, self.move_speed * dt);
            }
        }
    }

    pub fn teleport(&mut self, offset: Point) {
        self.position += offset;
    }

    pub fn distance_to(&self, p: Point) -> f64 {
        distance(self.position, p)
    }
}
