use super::agent::AgentId;
use super::food::FoodId;
use super::types::{AgentKind, CollisionKind, Point};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeathCause {
    SelfCollision,
    HitAgent { other: AgentId, other_kind: CollisionKind },
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathNotice {
    pub agent: AgentId,
    pub kind: AgentKind,
    pub cause: DeathCause,
    pub length: usize,
    pub position: Point,
}

/// Receives the single death notification an agent emits over its lifetime.
pub trait AgentOwner {
    fn agent_died(&mut self, notice: DeathNotice);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    AgentDied {
        agent: u64,
        kind: AgentKind,
        length: usize,
        killed_by: Option<CollisionKind>,
    },
    FoodCollected {
        agent: u64,
        pellet: u64,
        grown: usize,
    },
    GameOver {
        score: i64,
        high_score: i64,
    },
    Victory {
        score: i64,
    },
}

impl GameEvent {
    pub fn food_collected(agent: AgentId, pellet: FoodId, grown: usize) -> Self {
        GameEvent::FoodCollected {
            agent: agent.as_u64(),
            pellet: pellet.as_u64(),
            grown,
        }
    }
}

/// Collects death notices during a physics tick so the owner can act on a stable snapshot.
#[derive(Debug, Default)]
pub struct EventLog {
    deaths: Vec<DeathNotice>,
}

impl EventLog {
    pub fn deaths(&self) -> &[DeathNotice] {
        &self.deaths
    }

    pub fn take_deaths(&mut self) -> Vec<DeathNotice> {
        std::mem::take(&mut self.deaths)
    }
}

impl AgentOwner for EventLog {
    fn agent_died(&mut self, notice: DeathNotice) {
        self.deaths.push(notice);
    }
}
