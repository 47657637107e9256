use super::bounds::ArenaBounds;
use super::chain::{BodyChain, ChainSettings, HeadPose};
use super::events::{AgentOwner, DeathCause, DeathNotice};
use super::history::PositionHistory;
use super::input::heading_toward;
use super::math::{distance, facing_direction, heading_angle, move_towards_angle, random_direction};
use super::types::{AgentKind, AgentSnapshot, EdgePolicy, FollowStrategy, Point};
use rand::Rng;
use serde::Serialize;
use slotmap::{new_key_type, Key};

new_key_type! {
    pub struct AgentId;
}

impl AgentId {
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Initializing,
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    pub move_speed: f64,
    pub rotation_speed: f64,
    pub starting_segments: usize,
    pub edge_policy: EdgePolicy,
    pub chain: ChainSettings,
    pub history_capacity: usize,
    pub self_collision_radius: f64,
    pub self_collision_skip: usize,
    pub direction_change_interval: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Controller {
    Player,
    Ai { timer: f64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub wrap_offset: Option<Point>,
    pub died: bool,
}

#[derive(Debug, Clone)]
pub struct SnakeAgent {
    id: AgentId,
    kind: AgentKind,
    state: AgentState,
    position: Point,
    heading: Point,
    facing: f64,
    settings: AgentSettings,
    controller: Controller,
    chain: BodyChain,
    history: Option<PositionHistory>,
}

impl SnakeAgent {
    pub fn new(id: AgentId, kind: AgentKind, position: Point, settings: AgentSettings) -> Self {
        let history = match settings.chain.strategy {
            FollowStrategy::HistorySmoothed => Some(PositionHistory::new(settings.history_capacity)),
            FollowStrategy::LeaderChain => None,
        };
        let controller = match kind {
            AgentKind::Player => Controller::Player,
            AgentKind::Ai => Controller::Ai { timer: 0.0 },
        };
        Self {
            id,
            kind,
            state: AgentState::Initializing,
            position,
            heading: Point::ZERO,
            facing: 0.0,
            settings,
            controller,
            chain: BodyChain::new(settings.chain),
            history,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == AgentState::Alive
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> Point {
        self.heading
    }

    pub fn facing(&self) -> f64 {
        self.facing
    }

    pub fn chain(&self) -> &BodyChain {
        &self.chain
    }

    pub fn history(&self) -> Option<&PositionHistory> {
        self.history.as_ref()
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn head_pose(&self) -> HeadPose {
        HeadPose {
            position: self.position,
            facing: facing_direction(self.facing),
        }
    }

    /// Populates the starting body and enters `Alive`. No-op outside `Initializing`.
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.state != AgentState::Initializing {
            return 0;
        }
        if let Controller::Ai { .. } = self.controller {
            self.change_direction(rng);
            self.facing = heading_angle(self.heading).rem_euclid(360.0);
        }
        let added = self.chain.grow_by(
            self.settings.starting_segments,
            self.head_pose(),
            self.history.as_ref(),
        );
        self.state = AgentState::Alive;
        tracing::debug!(
            agent_id = self.id.as_u64(),
            kind = ?self.kind,
            segments = added,
            "agent spawned"
        );
        added
    }

    fn change_direction<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.heading = random_direction(rng);
        if let Controller::Ai { .. } = self.controller {
            self.controller = Controller::Ai {
                timer: self.settings.direction_change_interval,
            };
        }
    }

    /// Decision phase. Players steer toward `target`; AI snakes run their turn timer.
    pub fn decide<R: Rng + ?Sized>(&mut self, dt: f64, target: Option<Point>, rng: &mut R) {
        if !self.is_alive() {
            return;
        }
        match self.controller {
            Controller::Player => {
                let position = self.position;
                if let Some(heading) = target.and_then(|target| heading_toward(position, target)) {
                    self.heading = heading;
                }
            }
            Controller::Ai { timer } => {
                let remaining = timer - dt;
                if remaining <= 0.0 {
                    self.change_direction(rng);
                } else {
                    self.controller = Controller::Ai { timer: remaining };
                }
            }
        }
    }

    /// Physics phase: move, face, record, advance body, self-collide, then handle edges.
    pub fn physics_step<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        bounds: &ArenaBounds,
        owner: &mut dyn AgentOwner,
        rng: &mut R,
    ) -> StepReport {
        let mut report = StepReport::default();
        if !self.is_alive() {
            return report;
        }

        let previous = self.position;
        self.position += self.heading * (self.settings.move_speed * dt);
        if self.heading != Point::ZERO {
            let target_angle = heading_angle(self.heading);
            self.facing =
                move_towards_angle(self.facing, target_angle, self.settings.rotation_speed * dt);
        }

        // A stalled head adds nothing to the trail, so the body never piles onto it.
        if let Some(history) = self.history.as_mut() {
            if self.position != previous && history.latest() != Some(self.position) {
                history.record(self.position);
            }
        }
        self.chain.advance(dt, self.position, self.history.as_ref());

        if self.hits_own_body() {
            report.died = self.die(DeathCause::SelfCollision, owner);
            return report;
        }

        if !bounds.contains(self.position) {
            match self.settings.edge_policy {
                EdgePolicy::Wrap => {
                    let prewrap = self.position;
                    self.position = bounds.wrap(prewrap);
                    let offset = self.position - prewrap;
                    self.chain.teleport_all(offset);
                    if let Some(history) = self.history.as_mut() {
                        history.offset_all(offset);
                    }
                    if let Controller::Ai { .. } = self.controller {
                        self.change_direction(rng);
                    }
                    report.wrap_offset = Some(offset);
                }
                EdgePolicy::Clamp => {
                    self.position = bounds.clamp(self.position);
                }
            }
        }

        report
    }

    fn hits_own_body(&self) -> bool {
        let radius = self.settings.self_collision_radius;
        self.chain
            .positions()
            .skip(self.settings.self_collision_skip)
            .any(|segment| distance(self.position, segment) < radius)
    }

    /// Grows by `n` segments while alive. Returns how many were added.
    pub fn grow(&mut self, n: usize) -> usize {
        if !self.is_alive() {
            return 0;
        }
        self.chain.grow_by(n, self.head_pose(), self.history.as_ref())
    }

    /// Enters `Dead`, releases the body and notifies `owner`. Only the first call has effect.
    pub fn die(&mut self, cause: DeathCause, owner: &mut dyn AgentOwner) -> bool {
        if self.state == AgentState::Dead {
            return false;
        }
        self.state = AgentState::Dead;
        let length = self.chain.count();
        self.chain.destroy_all();
        if let Some(history) = self.history.as_mut() {
            history.clear();
        }
        tracing::debug!(
            agent_id = self.id.as_u64(),
            kind = ?self.kind,
            ?cause,
            length,
            "agent died"
        );
        owner.agent_died(DeathNotice {
            agent: self.id,
            kind: self.kind,
            cause,
            length,
            position: self.position,
        });
        true
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id.as_u64(),
            kind: self.kind,
            alive: self.is_alive(),
            head: self.position,
            heading: self.heading,
            facing: self.facing,
            segments: self.chain.positions().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::EventLog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use slotmap::SlotMap;

    fn settings(strategy: FollowStrategy) -> AgentSettings {
        AgentSettings {
            move_speed: 5.0,
            rotation_speed: 200.0,
            starting_segments: 3,
            edge_policy: EdgePolicy::Wrap,
            chain: ChainSettings {
                strategy,
                follow_speed: 10.0,
                move_speed: 10.0,
                spacing: 0.5,
                history_spacing: 5,
                max_segments: None,
            },
            history_capacity: 100,
            self_collision_radius: 0.4,
            self_collision_skip: 3,
            direction_change_interval: 2.0,
        }
    }

    fn agent_with(kind: AgentKind, position: Point, settings: AgentSettings) -> SnakeAgent {
        let mut ids: SlotMap<AgentId, ()> = SlotMap::with_key();
        SnakeAgent::new(ids.insert(()), kind, position, settings)
    }

    fn make_agent(kind: AgentKind, position: Point, strategy: FollowStrategy) -> SnakeAgent {
        agent_with(kind, position, settings(strategy))
    }

    fn bounds() -> ArenaBounds {
        ArenaBounds::new(Point::new(-10.0, -10.0), Point::new(10.0, 10.0)).unwrap()
    }

    #[test]
    fn spawn_moves_from_initializing_to_alive_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut agent = make_agent(AgentKind::Player, Point::ZERO, FollowStrategy::LeaderChain);
        assert_eq!(agent.state(), AgentState::Initializing);
        assert!(!agent.is_alive());

        assert_eq!(agent.spawn(&mut rng), 3);
        assert!(agent.is_alive());
        assert_eq!(agent.chain().count(), 3);

        assert_eq!(agent.spawn(&mut rng), 0);
        assert_eq!(agent.chain().count(), 3);
    }

    #[test]
    fn player_heading_points_at_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut agent = make_agent(AgentKind::Player, Point::ZERO, FollowStrategy::LeaderChain);
        agent.spawn(&mut rng);

        agent.decide(0.016, Some(Point::new(0.0, 3.0)), &mut rng);
        assert_eq!(agent.heading(), Point::new(0.0, 1.0));

        agent.decide(0.016, None, &mut rng);
        assert_eq!(agent.heading(), Point::new(0.0, 1.0));
    }

    #[test]
    fn ai_changes_direction_when_timer_expires() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut agent = make_agent(AgentKind::Ai, Point::ZERO, FollowStrategy::LeaderChain);
        agent.spawn(&mut rng);
        let initial = agent.heading();
        assert!((crate::game::math::length(initial) - 1.0).abs() < 1e-9);

        agent.decide(1.0, None, &mut rng);
        assert_eq!(agent.heading(), initial);
        agent.decide(1.0, None, &mut rng);
        assert_ne!(agent.heading(), initial);
    }

    #[test]
    fn physics_step_advances_head_by_speed() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Player, Point::ZERO, FollowStrategy::LeaderChain);
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(5.0, 0.0)), &mut rng);

        let report = agent.physics_step(0.02, &bounds(), &mut log, &mut rng);
        assert_eq!(report, StepReport::default());
        assert!((agent.position().x - 0.1).abs() < 1e-12);
        assert!(agent.facing() > 0.0);
    }

    #[test]
    fn wrap_teleports_whole_chain_by_same_offset() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Player, Point::new(9.95, 0.0), FollowStrategy::LeaderChain);
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(20.0, 0.0)), &mut rng);

        let mut report = StepReport::default();
        let mut before: Vec<Point> = Vec::new();
        for _ in 0..10 {
            before = agent.chain().positions().collect();
            report = agent.physics_step(0.02, &bounds(), &mut log, &mut rng);
            if report.wrap_offset.is_some() {
                break;
            }
        }

        let offset = report.wrap_offset.expect("head should wrap");
        assert_eq!(agent.position().x, -10.0);
        assert!(offset.x < -20.0 && offset.y == 0.0);
        let after: Vec<Point> = agent.chain().positions().collect();
        let shape_before: Vec<f64> = before.windows(2).map(|w| w[0].x - w[1].x).collect();
        let shape_after: Vec<f64> = after.windows(2).map(|w| w[0].x - w[1].x).collect();
        for (a, b) in shape_before.iter().zip(&shape_after) {
            assert!((a - b).abs() < 0.25);
        }
        assert!(after.iter().all(|p| p.x < -10.0));
    }

    #[test]
    fn clamp_policy_stops_at_the_edge() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut log = EventLog::default();
        let mut agent = agent_with(
            AgentKind::Player,
            Point::new(9.95, 0.0),
            AgentSettings {
                edge_policy: EdgePolicy::Clamp,
                ..settings(FollowStrategy::LeaderChain)
            },
        );
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(20.0, 0.0)), &mut rng);
        for _ in 0..10 {
            let report = agent.physics_step(0.02, &bounds(), &mut log, &mut rng);
            assert_eq!(report.wrap_offset, None);
        }
        assert_eq!(agent.position(), Point::new(10.0, 0.0));
    }

    #[test]
    fn history_agent_records_every_tick() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Player, Point::ZERO, FollowStrategy::HistorySmoothed);
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(0.0, 5.0)), &mut rng);
        for _ in 0..7 {
            agent.physics_step(0.02, &bounds(), &mut log, &mut rng);
        }
        let history = agent.history().expect("history strategy keeps a buffer");
        assert_eq!(history.len(), 7);
        assert_eq!(history.sample(0, 5), Some(agent.position()));
    }

    #[test]
    fn reversing_into_own_body_is_fatal() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut log = EventLog::default();
        let base = settings(FollowStrategy::LeaderChain);
        let mut agent = agent_with(
            AgentKind::Player,
            Point::ZERO,
            AgentSettings {
                starting_segments: 6,
                chain: ChainSettings {
                    move_speed: 1.0,
                    ..base.chain
                },
                ..base
            },
        );
        agent.spawn(&mut rng);

        // The body trails along -y; head straight back down through it.
        agent.decide(0.016, Some(Point::new(0.0, -100.0)), &mut rng);
        let mut died = false;
        for _ in 0..40 {
            if agent.physics_step(0.02, &bounds(), &mut log, &mut rng).died {
                died = true;
                break;
            }
        }

        assert!(died);
        assert_eq!(agent.state(), AgentState::Dead);
        assert_eq!(log.deaths().len(), 1);
        assert_eq!(log.deaths()[0].cause, DeathCause::SelfCollision);
        assert_eq!(log.deaths()[0].length, 6);
    }

    #[test]
    fn die_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Ai, Point::ZERO, FollowStrategy::LeaderChain);
        agent.spawn(&mut rng);

        assert!(agent.die(DeathCause::Teardown, &mut log));
        assert!(!agent.die(DeathCause::Teardown, &mut log));

        assert_eq!(log.deaths().len(), 1);
        assert_eq!(log.deaths()[0].length, 3);
        assert_eq!(agent.chain().count(), 0);
        assert!(!agent.is_alive());
    }

    #[test]
    fn dead_agent_ignores_ticks_and_growth() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Player, Point::ZERO, FollowStrategy::LeaderChain);
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(3.0, 0.0)), &mut rng);
        agent.die(DeathCause::Teardown, &mut log);

        let position = agent.position();
        agent.decide(0.016, Some(Point::new(-3.0, 0.0)), &mut rng);
        agent.physics_step(0.02, &bounds(), &mut log, &mut rng);
        assert_eq!(agent.position(), position);
        assert_eq!(agent.grow(4), 0);
        assert_eq!(agent.chain().count(), 0);
    }

    fn run_ticks(agent: &mut SnakeAgent, ticks: usize, log: &mut EventLog, rng: &mut StdRng) {
        for _ in 0..ticks {
            agent.physics_step(0.02, &bounds(), log, rng);
        }
    }

    #[test]
    fn history_snake_survives_growing_while_moving() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Player, Point::new(-8.0, 0.0), FollowStrategy::HistorySmoothed);
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(100.0, 0.0)), &mut rng);

        run_ticks(&mut agent, 50, &mut log, &mut rng);
        assert_eq!(agent.grow(1), 1);
        run_ticks(&mut agent, 50, &mut log, &mut rng);

        assert!(agent.is_alive());
        assert!(log.deaths().is_empty());
        assert_eq!(agent.chain().count(), 4);
        let tail = agent.chain().tail_position().expect("tail");
        assert!(distance(tail, agent.position()) > 1.0);
    }

    #[test]
    fn long_history_snake_survives_its_first_ticks() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut log = EventLog::default();
        let mut agent = agent_with(
            AgentKind::Player,
            Point::new(-8.0, 0.0),
            AgentSettings {
                starting_segments: 5,
                ..settings(FollowStrategy::HistorySmoothed)
            },
        );
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(100.0, 0.0)), &mut rng);

        run_ticks(&mut agent, 100, &mut log, &mut rng);
        assert!(agent.is_alive());
        assert_eq!(agent.chain().count(), 5);
    }

    #[test]
    fn stalled_history_snake_keeps_its_body_apart() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut log = EventLog::default();
        let mut agent = agent_with(
            AgentKind::Player,
            Point::ZERO,
            AgentSettings {
                starting_segments: 6,
                ..settings(FollowStrategy::HistorySmoothed)
            },
        );
        agent.spawn(&mut rng);

        run_ticks(&mut agent, 100, &mut log, &mut rng);
        assert!(agent.is_alive());
        assert!(agent.history().expect("history").is_empty());
        assert!(agent.chain().positions().all(|p| distance(p, Point::ZERO) >= 0.5));
    }

    #[test]
    fn wrap_shifts_history_with_the_body() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut log = EventLog::default();
        let mut agent = make_agent(AgentKind::Player, Point::new(-5.0, 0.0), FollowStrategy::HistorySmoothed);
        agent.spawn(&mut rng);
        agent.decide(0.016, Some(Point::new(100.0, 0.0)), &mut rng);

        let mut offset = None;
        for _ in 0..200 {
            offset = agent.physics_step(0.02, &bounds(), &mut log, &mut rng).wrap_offset;
            if offset.is_some() {
                break;
            }
        }
        assert!(offset.expect("head should wrap").x < -20.0);
        assert!(agent.is_alive());

        let history = agent.history().expect("history");
        let latest = history.latest().expect("recorded");
        assert!(distance(latest, agent.position()) < 1e-9);
        let trail: Vec<Point> = history.iter().copied().collect();
        for pair in trail.windows(2) {
            assert!(distance(pair[0], pair[1]) < 0.1 + 1e-9);
        }
        for (index, position) in agent.chain().positions().enumerate() {
            let sampled = history.sample(index, 5).expect("sample");
            assert!(distance(position, sampled) < 1.0);
        }

        run_ticks(&mut agent, 10, &mut log, &mut rng);
        assert!(agent.is_alive());
    }
}
