//! Tick deadline monitoring
//!
//! Tracks how much of the per-tick time budget the agent spends and tells
//! the driver how many candidate positions it can afford to probe next.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples needed before the status moves off its initial value
const MIN_SAMPLES: usize = 10;

/// Fewest candidates probed per tick, however tight the budget
pub const MIN_CANDIDATES: usize = 4;

/// Budget usage levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Well under budget
    Relaxed,
    /// Normal operation
    Normal,
    /// Close to the deadline, probe fewer candidates
    Tight,
    /// Deadline exceeded on average
    Overrun,
}

impl BudgetStatus {
    /// Share of the maximum candidate count to probe at this level
    pub fn candidate_share(&self) -> f64 {
        match self {
            BudgetStatus::Relaxed | BudgetStatus::Normal => 1.0,
            BudgetStatus::Tight => 0.75,
            BudgetStatus::Overrun => 0.5,
        }
    }
}

/// Rolling monitor of tick durations against the deadline
pub struct TickBudgetMonitor {
    tick_durations: VecDeque<Duration>,
    max_samples: usize,
    /// Time available per tick
    tick_budget: Duration,
    /// Below this fraction of the budget the agent is relaxed
    relaxed_threshold: f64,
    /// Above this fraction the budget is tight
    tight_threshold: f64,
    status: BudgetStatus,
    tick_start: Option<Instant>,
}

impl TickBudgetMonitor {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_durations: VecDeque::with_capacity(60),
            max_samples: 60,
            tick_budget: Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64),
            relaxed_threshold: 0.3,
            tight_threshold: 0.8,
            status: BudgetStatus::Relaxed,
            tick_start: None,
        }
    }

    pub fn tick_start(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// Finish timing the current tick, returning its duration
    pub fn tick_end(&mut self) -> Option<Duration> {
        let duration = self.tick_start.take()?.elapsed();
        self.record_tick(duration);
        Some(duration)
    }

    fn record_tick(&mut self, duration: Duration) {
        if duration > self.tick_budget {
            tracing::debug!(
                "Tick overran its budget: {:?} > {:?}",
                duration,
                self.tick_budget
            );
        }
        self.tick_durations.push_back(duration);
        while self.tick_durations.len() > self.max_samples {
            self.tick_durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.tick_durations.len() < MIN_SAMPLES {
            return;
        }
        let usage = self.budget_usage();
        let status = if usage < self.relaxed_threshold {
            BudgetStatus::Relaxed
        } else if usage < self.tight_threshold {
            BudgetStatus::Normal
        } else if usage < 1.0 {
            BudgetStatus::Tight
        } else {
            BudgetStatus::Overrun
        };
        if status != self.status {
            tracing::info!("Tick budget status {:?} -> {:?} ({:.0}% used)", self.status, status, usage * 100.0);
            self.status = status;
        }
    }

    pub fn average_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.tick_durations.iter().sum();
        sum / self.tick_durations.len() as u32
    }

    /// Average share of the budget used, 1.0 = exactly on the deadline
    pub fn budget_usage(&self) -> f64 {
        self.average_tick_duration().as_secs_f64() / self.tick_budget.as_secs_f64()
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    /// Number of candidate positions to probe next tick
    pub fn candidate_budget(&self, max_candidates: usize) -> usize {
        let scaled = (max_candidates as f64 * self.status.candidate_share()).floor() as usize;
        scaled.max(MIN_CANDIDATES).min(max_candidates.max(MIN_CANDIDATES))
    }
}
