use super::history::PositionHistory;
use super::math::normalize;
use super::segment::{Leader, Segment, SegmentId};
use super::types::{FollowStrategy, Point};
use slotmap::SlotMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("body chain is at capacity ({max} segments)")]
    AtCapacity { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub strategy: FollowStrategy,
    pub follow_speed: f64,
    pub move_speed: f64,
    pub spacing: f64,
    pub history_spacing: usize,
    pub max_segments: Option<usize>,
}

/// Where the head is and which way it faces (unit vector) when segments are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Point,
    pub facing: Point,
}

/// Ordered body of one agent. Index 0 trails the head directly.
#[derive(Debug, Clone)]
pub struct BodyChain {
    segments: SlotMap<SegmentId, Segment>,
    order: Vec<SegmentId>,
    settings: ChainSettings,
}

impl BodyChain {
    pub fn new(settings: ChainSettings) -> Self {
        Self {
            segments: SlotMap::with_key(),
            order: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[SegmentId] {
        &self.order
    }

    pub fn id_at(&self, index: usize) -> Option<SegmentId> {
        self.order.get(index).copied()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn segment_at(&self, index: usize) -> Option<&Segment> {
        self.id_at(index).and_then(|id| self.segments.get(id))
    }

    pub fn leader_of(&self, index: usize) -> Option<Leader> {
        self.segment_at(index).and_then(Segment::leader)
    }

    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.segments.get(*id))
            .map(Segment::position)
    }

    pub fn tail_position(&self) -> Option<Point> {
        self.order
            .last()
            .and_then(|id| self.segments.get(*id))
            .map(Segment::position)
    }

    fn leader_position(&self, leader: Leader, head_position: Point) -> Option<Point> {
        match leader {
            Leader::Head => Some(head_position),
            Leader::Segment(id) => self.segments.get(id).map(Segment::position),
        }
    }

    fn spawn_position(&self, head: HeadPose) -> Point {
        let spacing = self.settings.spacing;
        let Some(tail) = self.tail_position() else {
            return head.position - head.facing * spacing;
        };
        let ahead_of_tail = if self.order.len() >= 2 {
            self.segment_at(self.order.len() - 2)
                .map(Segment::position)
                .unwrap_or(head.position)
        } else {
            head.position
        };
        let mut backward = normalize(tail - ahead_of_tail);
        if backward == Point::ZERO {
            backward = -head.facing;
        }
        tail + backward * spacing
    }

    /// Where a history-following segment at `index` starts: its sampled point when
    /// the history reaches back that far, otherwise behind the tail.
    fn history_spawn_position(
        &self,
        index: usize,
        head: HeadPose,
        history: Option<&PositionHistory>,
    ) -> Point {
        let lookback = index.saturating_mul(self.settings.history_spacing);
        history
            .filter(|history| lookback < history.len())
            .and_then(|history| history.sample(index, self.settings.history_spacing))
            .unwrap_or_else(|| self.spawn_position(head))
    }

    /// Adds one segment at the tail, bound to the current tail (or the head when empty).
    pub fn append(
        &mut self,
        head: HeadPose,
        history: Option<&PositionHistory>,
    ) -> Result<SegmentId, ChainError> {
        if let Some(max) = self.settings.max_segments {
            if self.order.len() >= max {
                return Err(ChainError::AtCapacity { max });
            }
        }

        let segment = match self.settings.strategy {
            FollowStrategy::HistorySmoothed => Segment::smoothed(
                self.history_spawn_position(self.order.len(), head, history),
                self.settings.follow_speed,
            ),
            FollowStrategy::LeaderChain => {
                let leader = self
                    .order
                    .last()
                    .map(|id| Leader::Segment(*id))
                    .unwrap_or(Leader::Head);
                Segment::chained(
                    self.spawn_position(head),
                    leader,
                    self.settings.spacing,
                    self.settings.move_speed,
                )
            }
        };

        let id = self.segments.insert(segment);
        self.order.push(id);
        Ok(id)
    }

    /// Appends up to `n` segments and returns how many were actually created.
    pub fn grow_by(&mut self, n: usize, head: HeadPose, history: Option<&PositionHistory>) -> usize {
        let mut added = 0;
        for _ in 0..n {
            match self.append(head, history) {
                Ok(_) => added += 1,
                Err(error) => {
                    tracing::warn!(%error, requested = n, added, "segment creation skipped");
                    break;
                }
            }
        }
        added
    }

    pub fn advance(&mut self, dt: f64, head_position: Point, history: Option<&PositionHistory>) {
        let history_spacing = self.settings.history_spacing;
        for index in 0..self.order.len() {
            let id = self.order[index];
            let Some(segment) = self.segments.get(id) else { continue };

            let leader_position = match segment.leader() {
                Some(leader) => self.leader_position(leader, head_position),
                None => None,
            };

            let Some(segment) = self.segments.get_mut(id) else { continue };
            if segment.leader().is_none() {
                if let Some(target) = history.and_then(|history| history.sample(index, history_spacing)) {
                    segment.follow_position(target);
                }
            }
            segment.advance(dt, leader_position);
        }
    }

    pub fn teleport_all(&mut self, offset: Point) {
        for id in &self.order {
            if let Some(segment) = self.segments.get_mut(*id) {
                segment.teleport(offset);
            }
        }
    }

    /// Releases every segment and returns how many were still live. Safe to repeat.
    pub fn destroy_all(&mut self) -> usize {
        let mut released = 0;
        for id in self.order.drain(..) {
            if self.segments.remove(id).is_some() {
                released += 1;
            }
        }
        self.segments.clear();
        released
    }
}
