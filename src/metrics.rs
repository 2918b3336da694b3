//! Agent metrics in Prometheus text format
//!
//! Collected by the driver after every tick and dumped at shutdown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::game::performance::BudgetStatus;
use crate::game::systems::danger::CacheStats;

/// Tick time samples kept for percentiles
const TICK_HISTORY_LEN: usize = 1000;

/// Metrics registry for the agent
#[derive(Debug)]
pub struct Metrics {
    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    // Budget status (0=Relaxed, 1=Normal, 2=Tight, 3=Overrun)
    pub budget_status: AtomicU64,
    pub candidates_probed: AtomicU64,

    // Danger field cache
    pub danger_cache_hits: AtomicU64,
    pub danger_recomputes: AtomicU64,
    pub danger_clamped_queries: AtomicU64,

    pub collision_queries: AtomicU64,
    /// Zone radius in hundredths of a world unit
    pub zone_radius_centi: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            budget_status: AtomicU64::new(0),
            candidates_probed: AtomicU64::new(0),
            danger_cache_hits: AtomicU64::new(0),
            danger_recomputes: AtomicU64::new(0),
            danger_clamped_queries: AtomicU64::new(0),
            collision_queries: AtomicU64::new(0),
            zone_radius_centi: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f64 * 0.95) as usize;
            let p99_idx = (sorted.len() as f64 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Mirror the danger cache counters (they are cumulative already)
    pub fn record_danger_stats(&self, stats: CacheStats) {
        self.danger_cache_hits.store(stats.hits, Ordering::Relaxed);
        self.danger_recomputes.store(stats.recomputes, Ordering::Relaxed);
        self.danger_clamped_queries.store(stats.clamped, Ordering::Relaxed);
    }

    pub fn record_budget(&self, status: BudgetStatus, candidates: usize) {
        let code = match status {
            BudgetStatus::Relaxed => 0,
            BudgetStatus::Normal => 1,
            BudgetStatus::Tight => 2,
            BudgetStatus::Overrun => 3,
        };
        self.budget_status.store(code, Ordering::Relaxed);
        self.candidates_probed.fetch_add(candidates as u64, Ordering::Relaxed);
    }

    pub fn record_zone_radius(&self, radius: f64) {
        self.zone_radius_centi.store((radius.max(0.0) * 100.0) as u64, Ordering::Relaxed);
    }

    /// Share of danger queries answered from the cache
    pub fn danger_hit_rate(&self) -> f64 {
        let hits = self.danger_cache_hits.load(Ordering::Relaxed);
        let total = hits + self.danger_recomputes.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("arena_tactics_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("arena_tactics_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("arena_tactics_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("arena_tactics_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("arena_tactics_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        metric!("arena_tactics_budget_status", "Tick budget status (0=Relaxed, 3=Overrun)", "gauge",
            self.budget_status.load(Ordering::Relaxed));
        metric!("arena_tactics_candidates_probed_total", "Candidate positions probed", "counter",
            self.candidates_probed.load(Ordering::Relaxed));

        metric!("arena_tactics_danger_cache_hits_total", "Danger queries answered from the cache", "counter",
            self.danger_cache_hits.load(Ordering::Relaxed));
        metric!("arena_tactics_danger_recomputes_total", "Danger cells recomputed", "counter",
            self.danger_recomputes.load(Ordering::Relaxed));
        metric!("arena_tactics_danger_clamped_total", "Danger queries clamped onto the map", "counter",
            self.danger_clamped_queries.load(Ordering::Relaxed));
        metric!("arena_tactics_collision_queries_total", "Obstacle collision queries", "counter",
            self.collision_queries.load(Ordering::Relaxed));

        metric!("arena_tactics_zone_radius", "Safe zone radius", "gauge",
            self.zone_radius_centi.load(Ordering::Relaxed) as f64 / 100.0);
        metric!("arena_tactics_uptime_seconds", "Agent uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
