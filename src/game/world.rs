use super::agent::{AgentId, SnakeAgent};
use super::bounds::ArenaBounds;
use super::collision::{detect_overlaps, BodyProbe, Overlap, OverlapRadii};
use super::events::{DeathCause, EventLog, GameEvent};
use super::food::FoodSpawner;
use super::scheduler::FixedStep;
use super::score::{MemoryScoreStore, ScoreBoard, ScoreStore};
use super::types::{AgentKind, Point, WorldSnapshot};
use crate::config::{ConfigError, GameConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SlotMap;

/// Owns every agent, the food field and the score for one play session.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    bounds: ArenaBounds,
    radii: OverlapRadii,
    agents: SlotMap<AgentId, SnakeAgent>,
    player: Option<AgentId>,
    ai_population: Vec<AgentId>,
    food: FoodSpawner,
    score: ScoreBoard,
    rng: StdRng,
    step: FixedStep,
    deaths: EventLog,
    events: Vec<GameEvent>,
    tick: u64,
    game_over: bool,
    victory: bool,
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl World {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_store(config, Box::new(MemoryScoreStore::default()))
    }

    pub fn with_store(config: GameConfig, store: Box<dyn ScoreStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = config.bounds()?;
        let mut world = Self {
            bounds,
            radii: config.overlap_radii(),
            agents: SlotMap::with_key(),
            player: None,
            ai_population: Vec::new(),
            food: FoodSpawner::new(config.food_settings()),
            score: ScoreBoard::new(store),
            rng: seeded_rng(config.rng_seed),
            step: FixedStep::new(config.timing.fixed_dt, config.timing.max_steps_per_frame),
            deaths: EventLog::default(),
            events: Vec::new(),
            tick: 0,
            game_over: false,
            victory: false,
            config,
        };
        world.populate();
        Ok(world)
    }

    fn populate(&mut self) {
        let player = self.spawn_agent(AgentKind::Player, self.bounds.center());
        self.player = Some(player);
        for _ in 0..self.config.ai.count {
            let position = self.bounds.random_point_in_area(
                &mut self.rng,
                self.config.spawn_area.min,
                self.config.spawn_area.max,
            );
            let id = self.spawn_agent(AgentKind::Ai, position);
            self.ai_population.push(id);
        }
        let heads = self.live_heads();
        let pellets = self.food.populate(&self.bounds, &heads, &mut self.rng);
        tracing::info!(
            ai_count = self.ai_population.len(),
            pellets,
            "world populated"
        );
    }

    fn spawn_agent(&mut self, kind: AgentKind, position: Point) -> AgentId {
        let settings = self.config.agent_settings(kind);
        let id = self
            .agents
            .insert_with_key(|id| SnakeAgent::new(id, kind, position, settings));
        if let Some(agent) = self.agents.get_mut(id) {
            agent.spawn(&mut self.rng);
        }
        id
    }

    /// Throws the session away and rebuilds it from the same config.
    /// The high score survives.
    pub fn restart(&mut self) {
        self.agents.clear();
        self.player = None;
        self.ai_population.clear();
        self.food.clear();
        self.score.reset();
        self.step.reset();
        self.deaths.take_deaths();
        self.events.clear();
        self.tick = 0;
        self.game_over = false;
        self.victory = false;
        self.populate();
        tracing::info!("world restarted");
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bounds(&self) -> &ArenaBounds {
        &self.bounds
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn player_id(&self) -> Option<AgentId> {
        self.player
    }

    pub fn player(&self) -> Option<&SnakeAgent> {
        self.player.and_then(|id| self.agents.get(id))
    }

    pub fn agent(&self, id: AgentId) -> Option<&SnakeAgent> {
        self.agents.get(id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &SnakeAgent> + '_ {
        self.agents.values()
    }

    pub fn ai_ids(&self) -> &[AgentId] {
        &self.ai_population
    }

    pub fn ai_count(&self) -> usize {
        self.ai_population.len()
    }

    pub fn food(&self) -> &FoodSpawner {
        &self.food
    }

    pub fn food_mut(&mut self) -> &mut FoodSpawner {
        &mut self.food
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_victory(&self) -> bool {
        self.victory
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn live_heads(&self) -> Vec<Point> {
        self.agents
            .values()
            .filter(|agent| agent.is_alive())
            .map(|agent| agent.position())
            .collect()
    }

    /// One variable-rate frame: a decision pass followed by however many
    /// fixed physics ticks are due. Returns the tick count.
    pub fn frame(&mut self, frame_dt: f64, player_target: Option<Point>) -> u32 {
        self.decision_phase(frame_dt, player_target);
        let steps = self.step.advance(frame_dt);
        for _ in 0..steps {
            self.physics_phase();
        }
        steps
    }

    pub fn decision_phase(&mut self, frame_dt: f64, player_target: Option<Point>) {
        if self.game_over || !(frame_dt.is_finite() && frame_dt >= 0.0) {
            return;
        }
        for (id, agent) in self.agents.iter_mut() {
            let target = if Some(id) == self.player {
                player_target
            } else {
                None
            };
            agent.decide(frame_dt, target, &mut self.rng);
        }
    }

    /// One fixed tick: per-agent physics, then cross-agent overlaps, then
    /// the deaths those produced.
    pub fn physics_phase(&mut self) {
        if self.game_over {
            return;
        }
        self.tick += 1;
        let dt = self.step.fixed_dt();

        for agent in self.agents.values_mut() {
            agent.physics_step(dt, &self.bounds, &mut self.deaths, &mut self.rng);
        }

        let probes: Vec<BodyProbe> = self.agents.values().filter_map(BodyProbe::of).collect();
        let pellets = self.food.positions();
        for overlap in detect_overlaps(&probes, &pellets, &self.radii) {
            tracing::trace!(
                agent_id = overlap.head().as_u64(),
                with = ?overlap.kind(),
                "overlap"
            );
            self.apply_overlap(overlap);
        }

        self.resolve_deaths();
    }

    /// Entry point for overlaps reported from outside the tick.
    pub fn handle_overlap(&mut self, overlap: Overlap) {
        if self.game_over {
            return;
        }
        self.apply_overlap(overlap);
        self.resolve_deaths();
    }

    fn apply_overlap(&mut self, overlap: Overlap) {
        match overlap {
            Overlap::Body {
                head,
                owner,
                owner_kind,
            } => {
                if !self.agents.contains_key(owner) {
                    return;
                }
                if let Some(agent) = self.agents.get_mut(head) {
                    agent.die(
                        DeathCause::HitAgent {
                            other: owner,
                            other_kind: owner_kind,
                        },
                        &mut self.deaths,
                    );
                }
            }
            Overlap::Food { head, pellet } => {
                let Some(kind) = self
                    .agents
                    .get(head)
                    .filter(|agent| agent.is_alive())
                    .map(|agent| agent.kind())
                else {
                    return;
                };
                let heads = self.live_heads();
                let Some(collected) = self.food.collect(pellet, &self.bounds, &heads, &mut self.rng)
                else {
                    return;
                };
                let grown = self
                    .agents
                    .get_mut(head)
                    .map(|agent| agent.grow(collected.growth_amount))
                    .unwrap_or(0);
                if kind == AgentKind::Player {
                    self.score.add(self.config.food.points_per_pellet);
                }
                tracing::debug!(
                    agent_id = head.as_u64(),
                    grown,
                    score = self.score.current(),
                    "food collected"
                );
                self.events.push(GameEvent::food_collected(head, pellet, grown));
            }
        }
    }

    fn resolve_deaths(&mut self) {
        for notice in self.deaths.take_deaths() {
            self.events.push(GameEvent::AgentDied {
                agent: notice.agent.as_u64(),
                kind: notice.kind,
                length: notice.length,
                killed_by: match notice.cause {
                    DeathCause::HitAgent { other_kind, .. } => Some(other_kind),
                    DeathCause::SelfCollision | DeathCause::Teardown => None,
                },
            });
            match notice.kind {
                AgentKind::Ai => {
                    self.ai_population.retain(|id| *id != notice.agent);
                    self.agents.remove(notice.agent);
                }
                AgentKind::Player => self.end_game(),
            }
        }

        if !self.game_over
            && !self.victory
            && self.config.ai.count > 0
            && self.ai_population.is_empty()
            && self.player().is_some_and(|player| player.is_alive())
        {
            self.victory = true;
            tracing::info!(score = self.score.current(), "all ai snakes destroyed");
            self.events.push(GameEvent::Victory {
                score: self.score.current(),
            });
        }
    }

    fn end_game(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;

        let population = std::mem::take(&mut self.ai_population);
        for id in &population {
            if let Some(agent) = self.agents.get_mut(*id) {
                agent.die(DeathCause::Teardown, &mut self.deaths);
            }
            self.agents.remove(*id);
        }
        let torn_down = self.deaths.take_deaths().len();

        tracing::info!(
            score = self.score.current(),
            high_score = self.score.high(),
            torn_down,
            "game over"
        );
        self.events.push(GameEvent::GameOver {
            score: self.score.current(),
            high_score: self.score.high(),
        });
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            score: self.score.current(),
            high_score: self.score.high(),
            game_over: self.game_over,
            victory: self.victory,
            pellets: self
                .food
                .positions()
                .into_iter()
                .map(|(_, position)| position)
                .collect(),
            agents: self.agents.values().map(SnakeAgent::snapshot).collect(),
        }
    }
}
