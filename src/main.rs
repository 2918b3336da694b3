use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use arena_tactics::config::AgentConfig;
use arena_tactics::game::constants::Constants;
use arena_tactics::game::debug::{DebugSink, NoopDebugSink, TracingDebugSink};
use arena_tactics::game::performance::TickBudgetMonitor;
use arena_tactics::game::scenario::{Scenario, ScenarioSettings};
use arena_tactics::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging (RUST_LOG overrides, e.g. debug_draw=trace)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Arena Tactics v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AgentConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg).context("invalid configuration")?;
    info!(
        "Configuration loaded: tick_rate={}, match_ticks={}, seed={}, candidates={}",
        config.tick_rate, config.match_ticks, config.seed, config.candidate_count
    );

    let constants = match &config.constants_path {
        Some(path) => Constants::from_json_file(path)
            .with_context(|| format!("failed to load constants from {}", path.display()))?,
        None => Constants::default(),
    };
    constants.validate().context("invalid game constants")?;

    let mut scenario = Scenario::generate(
        config.seed,
        constants,
        ScenarioSettings {
            enemy_count: config.enemy_count,
            obstacle_count: config.obstacle_count,
        },
    );

    let metrics = Arc::new(Metrics::new());
    let mut budget = TickBudgetMonitor::new(config.tick_rate);
    let mut sink: Box<dyn DebugSink> = if config.debug_draw {
        Box::new(TracingDebugSink)
    } else {
        Box::new(NoopDebugSink)
    };

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / config.tick_rate as f64));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // Shutdown signal handler
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => break,
        }

        budget.tick_start();

        let step = scenario.step();
        let candidates = budget.candidate_budget(config.candidate_count);
        let probe = scenario.probe_candidates(candidates, sink.as_mut());
        scenario.move_my_unit(probe.best);

        if let Some(duration) = budget.tick_end() {
            metrics.record_tick_time(duration);
        }
        metrics.record_budget(budget.status(), probe.evaluated);
        metrics.record_danger_stats(scenario.danger_field().cache().stats());
        metrics.record_zone_radius(scenario.snapshot().zone.current_radius);
        metrics
            .collision_queries
            .fetch_add((step.collision_queries + probe.collision_queries) as u64, Ordering::Relaxed);

        debug!(
            "Tick {}: best danger {:.3} at ({:.1}, {:.1}), {} evaluated, {} blocked",
            step.tick, probe.danger, probe.best.x, probe.best.y, probe.evaluated, probe.blocked
        );

        if config.match_ticks > 0 && step.tick >= config.match_ticks {
            info!("Match finished after {} ticks", step.tick);
            break;
        }
    }

    let me = scenario.my_unit();
    info!(
        "Final state: tick {}, health {:.1}, position ({:.1}, {:.1}), danger cache hit rate {:.1}%",
        scenario.snapshot().current_tick,
        me.health,
        me.position.x,
        me.position.y,
        metrics.danger_hit_rate() * 100.0
    );
    info!("Metrics:\n{}", metrics.to_prometheus());

    Ok(())
}
