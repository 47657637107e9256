use anyhow::Context;
use slither_arena::config::GameConfig;
use slither_arena::game::events::GameEvent;
use slither_arena::game::types::AgentKind;
use slither_arena::session::{Autopilot, Session};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = GameConfig::from_env().context("failed to load game config")?;
  let run_for =
    Duration::try_from_secs_f64(config.run_seconds).context("run_seconds out of range")?;
  let session = Session::new(config, Box::new(Autopilot)).context("failed to build session")?;
  tracing::info!(session_id = %session.id(), run_seconds = run_for.as_secs_f64(), "session starting");

  session.ensure_loop();

  let deadline = tokio::time::sleep(run_for);
  tokio::pin!(deadline);
  let mut report = tokio::time::interval(REPORT_INTERVAL);
  loop {
    tokio::select! {
      _ = &mut deadline => break,
      _ = tokio::signal::ctrl_c() => {
        tracing::info!("interrupted");
        break;
      }
      _ = report.tick() => {
        for event in session.drain_events().await {
          log_event(&event);
        }
        let snapshot = session.snapshot().await;
        let alive_ai = snapshot
          .agents
          .iter()
          .filter(|agent| agent.alive && agent.kind == AgentKind::Ai)
          .count();
        tracing::info!(
          tick = snapshot.tick,
          score = snapshot.score,
          high_score = snapshot.high_score,
          alive_ai,
          pellets = snapshot.pellets.len(),
          "progress"
        );
        if !session.is_running() {
          break;
        }
      }
    }
  }

  session.stop();
  for event in session.drain_events().await {
    log_event(&event);
  }
  let snapshot = session.snapshot().await;
  let summary = serde_json::to_string_pretty(&snapshot).context("failed to encode final snapshot")?;
  println!("{summary}");
  Ok(())
}

fn log_event(event: &GameEvent) {
  match event {
    GameEvent::GameOver { score, high_score } => {
      tracing::info!(score, high_score, "game over");
    }
    GameEvent::Victory { score } => {
      tracing::info!(score, "victory");
    }
    other => {
      tracing::debug!(event = ?other, "game event");
    }
  }
}
