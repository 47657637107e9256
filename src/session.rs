use crate::config::{ConfigError, GameConfig};
use crate::game::events::GameEvent;
use crate::game::input::parse_target;
use crate::game::math::distance;
use crate::game::types::{Point, WorldSnapshot};
use crate::game::world::World;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Supplies the player's steering target once per frame.
pub trait InputSource: Send + Debug {
  fn target(&mut self, world: &World) -> Option<Point>;
}

/// Steers the player at the nearest pellet.
#[derive(Debug, Default, Clone, Copy)]
pub struct Autopilot;

impl InputSource for Autopilot {
  fn target(&mut self, world: &World) -> Option<Point> {
    let head = world.player().filter(|player| player.is_alive())?.position();
    world
      .food()
      .positions()
      .into_iter()
      .map(|(_, position)| position)
      .min_by(|a, b| distance(head, *a).total_cmp(&distance(head, *b)))
      .and_then(parse_target)
  }
}

/// Always steers at the same point. `None` keeps the current heading.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedTarget(pub Option<Point>);

impl InputSource for FixedTarget {
  fn target(&mut self, _world: &World) -> Option<Point> {
    self.0.and_then(parse_target)
  }
}

#[derive(Debug)]
pub struct Session {
  id: Uuid,
  state: Mutex<SessionState>,
  running: AtomicBool,
  frame: Duration,
}

#[derive(Debug)]
struct SessionState {
  world: World,
  input: Box<dyn InputSource>,
}

impl SessionState {
  fn step(&mut self, frame_dt: f64) -> u32 {
    let target = self.input.target(&self.world);
    self.world.frame(frame_dt, target)
  }
}

impl Session {
  pub fn new(config: GameConfig, input: Box<dyn InputSource>) -> Result<Arc<Self>, ConfigError> {
    let frame = Duration::from_millis(config.timing.frame_ms);
    let world = World::new(config)?;
    Ok(Arc::new(Self {
      id: Uuid::new_v4(),
      state: Mutex::new(SessionState { world, input }),
      running: AtomicBool::new(false),
      frame,
    }))
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::SeqCst)
  }

  pub async fn snapshot(&self) -> WorldSnapshot {
    let state = self.state.lock().await;
    state.world.snapshot()
  }

  pub async fn drain_events(&self) -> Vec<GameEvent> {
    let mut state = self.state.lock().await;
    state.world.drain_events()
  }

  /// Runs one frame by hand. Returns the number of physics ticks taken.
  pub async fn step(&self, frame_dt: f64) -> u32 {
    let mut state = self.state.lock().await;
    state.step(frame_dt)
  }

  pub async fn restart(self: &Arc<Self>) {
    {
      let mut state = self.state.lock().await;
      state.world.restart();
    }
    self.ensure_loop();
  }

  /// Asks the frame loop to exit at its next tick.
  pub fn stop(&self) {
    self.running.store(false, Ordering::SeqCst);
  }

  pub fn ensure_loop(self: &Arc<Self>) {
    if self
      .running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return;
    }

    tracing::info!(session_id = %self.id, frame_ms = self.frame.as_millis() as u64, "frame loop started");
    let session = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(session.frame);
      let mut last = Instant::now();
      loop {
        interval.tick().await;
        if !session.running.load(Ordering::SeqCst) {
          break;
        }
        let now = Instant::now();
        let frame_dt = now.duration_since(last).as_secs_f64();
        last = now;

        let mut state = session.state.lock().await;
        state.step(frame_dt);
        if state.world.is_game_over() {
          session.running.store(false, Ordering::SeqCst);
          tracing::info!(
            session_id = %session.id,
            tick = state.world.tick(),
            "frame loop stopped after game over"
          );
          break;
        }
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.ai.count = 0;
    config.rng_seed = Some(3);
    config.timing.frame_ms = 5;
    config
  }

  #[test]
  fn autopilot_picks_the_nearest_pellet() {
    let mut world = World::new(quiet_config()).expect("valid config");
    world.food_mut().clear();
    world.food_mut().place(Point::new(-8.0, 0.0));
    world.food_mut().place(Point::new(3.0, 0.0));

    assert_eq!(Autopilot.target(&world), Some(Point::new(3.0, 0.0)));
  }

  #[test]
  fn fixed_target_rejects_non_finite_points() {
    let world = World::new(quiet_config()).expect("valid config");
    assert_eq!(FixedTarget(Some(Point::new(f64::NAN, 0.0))).target(&world), None);
    assert_eq!(FixedTarget(None).target(&world), None);
  }

  #[tokio::test]
  async fn manual_steps_follow_the_input_source() {
    let session = Session::new(quiet_config(), Box::new(FixedTarget(Some(Point::new(0.0, 10.0)))))
      .expect("valid config");

    assert_eq!(session.step(0.05).await, 2);

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.tick, 2);
    let player = &snapshot.agents[0];
    assert_eq!(player.heading, Point::new(0.0, 1.0));
    assert!(player.head.y > 0.0);
    assert!(!session.is_running());
  }

  #[tokio::test]
  async fn frame_loop_runs_until_stopped() {
    let session = Session::new(quiet_config(), Box::new(Autopilot)).expect("valid config");
    session.ensure_loop();
    session.ensure_loop();
    assert!(session.is_running());

    tokio::time::sleep(Duration::from_millis(150)).await;
    session.stop();
    assert!(!session.is_running());

    let snapshot = session.snapshot().await;
    assert!(snapshot.tick > 0);
    assert!(!snapshot.game_over);
  }
}
