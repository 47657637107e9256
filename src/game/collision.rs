use super::agent::{AgentId, SnakeAgent};
use super::food::FoodId;
use super::math::overlaps;
use super::types::{AgentKind, CollisionKind, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapRadii {
    pub body: f64,
    pub food: f64,
}

/// Frozen view of one live agent, taken before any overlap is resolved.
#[derive(Debug, Clone)]
pub struct BodyProbe {
    pub id: AgentId,
    pub kind: AgentKind,
    pub head: Point,
    pub segments: Vec<Point>,
}

impl BodyProbe {
    pub fn of(agent: &SnakeAgent) -> Option<Self> {
        if !agent.is_alive() {
            return None;
        }
        Some(Self {
            id: agent.id(),
            kind: agent.kind(),
            head: agent.position(),
            segments: agent.chain().positions().collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    /// `head` touched `owner`'s head or one of its segments.
    Body {
        head: AgentId,
        owner: AgentId,
        owner_kind: CollisionKind,
    },
    Food { head: AgentId, pellet: FoodId },
}

impl Overlap {
    pub fn head(&self) -> AgentId {
        match self {
            Overlap::Body { head, .. } | Overlap::Food { head, .. } => *head,
        }
    }

    pub fn kind(&self) -> CollisionKind {
        match self {
            Overlap::Body { owner_kind, .. } => *owner_kind,
            Overlap::Food { .. } => CollisionKind::Food,
        }
    }
}

/// Pure distance test of every head against other agents and pellets.
/// At most one body overlap is reported per head.
pub fn detect_overlaps(
    probes: &[BodyProbe],
    pellets: &[(FoodId, Point)],
    radii: &OverlapRadii,
) -> Vec<Overlap> {
    let mut found = Vec::new();

    for probe in probes {
        for other in probes {
            if other.id == probe.id {
                continue;
            }
            let touched = overlaps(probe.head, other.head, radii.body)
                || other
                    .segments
                    .iter()
                    .any(|segment| overlaps(probe.head, *segment, radii.body));
            if touched {
                found.push(Overlap::Body {
                    head: probe.id,
                    owner: other.id,
                    owner_kind: other.kind.into(),
                });
                break;
            }
        }

        for (pellet, position) in pellets {
            if overlaps(probe.head, *position, radii.food) {
                found.push(Overlap::Food {
                    head: probe.id,
                    pellet: *pellet,
                });
            }
        }
    }

    found
}
