use instant::Instant;

/// Which phase of a world tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TickPhase {
    /// Rebuild check and (rarely) grid reconstruction.
    Grid = 0,
    Populate = 1,
    /// Neighbor queries, force model, integration, boundary.
    Steer = 2,
}

const PHASE_COUNT: usize = 3;

impl TickPhase {
    pub const ALL: [TickPhase; PHASE_COUNT] = [Self::Grid, Self::Populate, Self::Steer];

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::Populate => "Populate",
            Self::Steer => "Steer",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
pub struct TickTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASE_COUNT],
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl TickTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASE_COUNT],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: TickPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: TickPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn get(&self, phase: TickPhase) -> f64 {
        self.durations_us[phase as usize]
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}

impl Default for TickTimers {
    fn default() -> Self {
        Self::new()
    }
}
