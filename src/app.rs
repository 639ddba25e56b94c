use std::env;
use std::path::PathBuf;
use std::time::Duration;

use glam::DVec2;
use instant::Instant;

use swarmlings::config::{self, Params};
use swarmlings::debug::timer::TickPhase;
use swarmlings::spawn;
use swarmlings::util::math::distance;
use swarmlings::{Entity, World};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How many lings to spawn on startup.
const INITIAL_LING_COUNT: usize = 500;
/// Default run length in ticks (10s at 60Hz).
const DEFAULT_TICKS: u64 = 600;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
const WORLD_WIDTH: f64 = 800.0;
const WORLD_HEIGHT: f64 = 600.0;

// ---------------------------------------------------------------------------
// Run options
// ---------------------------------------------------------------------------

/// Knobs read from the environment.
struct RunOptions {
    config_path: PathBuf,
    count: usize,
    ticks: u64,
    seed: Option<u64>,
    save: bool,
}

impl RunOptions {
    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var_os("SWARMLINGS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(config::DEFAULT_PATH));
        let count = match env::var("SWARMLINGS_COUNT") {
            Ok(v) => v.parse()?,
            Err(_) => INITIAL_LING_COUNT,
        };
        let ticks = match env::var("SWARMLINGS_TICKS") {
            Ok(v) => v.parse()?,
            Err(_) => DEFAULT_TICKS,
        };
        let seed = match env::var("SWARMLINGS_SEED") {
            Ok(v) => Some(v.parse()?),
            Err(_) => None,
        };
        Ok(Self {
            config_path,
            count,
            ticks,
            seed,
            save: env::var_os("SWARMLINGS_SAVE").is_some(),
        })
    }
}

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

/// Wall-clock frame timing plus how many sim ticks each frame had to run.
/// A ticks/frame ratio drifting above 1 means the sim is falling behind.
struct FrameStats {
    last_log_time: Instant,
    frames: u32,
    ticks: u64,
    slowest_frame: f64,
    total_ticks: u64,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            last_log_time: Instant::now(),
            frames: 0,
            ticks: 0,
            slowest_frame: 0.0,
            total_ticks: 0,
        }
    }

    fn record(&mut self, dt: f64, ticks_run: u32) {
        self.frames += 1;
        self.ticks += u64::from(ticks_run);
        self.total_ticks += u64::from(ticks_run);
        self.slowest_frame = self.slowest_frame.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed < FPS_LOG_INTERVAL {
            return;
        }
        log::info!(
            "FPS: {:.0} | ticks/s: {:.0} | ticks/frame: {:.2} | slowest: {:.2}ms | ticks so far: {}",
            self.frames as f64 / elapsed,
            self.ticks as f64 / elapsed,
            self.ticks as f64 / self.frames as f64,
            self.slowest_frame * 1000.0,
            self.total_ticks,
        );
        self.last_log_time = Instant::now();
        self.frames = 0;
        self.ticks = 0;
        self.slowest_frame = 0.0;
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Headless driver: steps the world at a fixed rate, no window.
struct App {
    world: World,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,
    tick_limit: u64,

    frame_stats: FrameStats,
}

impl App {
    fn new(world: World, tick_limit: u64) -> Self {
        Self {
            world,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            tick_limit,
            frame_stats: FrameStats::new(),
        }
    }

    fn done(&self) -> bool {
        self.tick_count >= self.tick_limit
    }

    /// Run fixed-timestep simulation ticks. Returns how many ran.
    fn run_fixed_update(&mut self, dt: f64) -> u32 {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        let mut ran = 0;
        while self.accumulator >= TICK_RATE && !self.done() {
            self.world.update();
            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
            ran += 1;
        }
        ran
    }

    /// One pass of the frame loop: time, tick, then sleep off the rest of
    /// the frame.
    fn frame(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            let dt = now.duration_since(last).as_secs_f64();
            let ticks_run = self.run_fixed_update(dt);
            self.frame_stats.record(dt, ticks_run);
        }
        self.last_frame_time = Some(now);

        let spent = now.elapsed().as_secs_f64();
        if spent < TICK_RATE {
            std::thread::sleep(Duration::from_secs_f64(TICK_RATE - spent));
        }
    }

    fn log_phase_timings(&self) {
        let timers = self.world.timers();
        for phase in TickPhase::ALL {
            log::info!("{:>9}: {:8.1}us", phase.label(), timers.get(phase));
        }
        log::info!("{:>9}: {:8.1}us", "Total", timers.total_us());
    }

    fn log_flock_spread(&self) {
        if let Some((centroid, spread)) = flock_spread(&self.world.entities) {
            log::info!(
                "Flock centroid ({:.1}, {:.1}), spread {:.1}px",
                centroid.x,
                centroid.y,
                spread
            );
        }
    }
}

/// Centroid of the flock and the farthest any entity sits from it.
fn flock_spread(entities: &[Entity]) -> Option<(DVec2, f64)> {
    if entities.is_empty() {
        return None;
    }
    let centroid = entities.iter().map(|e| e.pos).sum::<DVec2>() / entities.len() as f64;
    let spread = entities
        .iter()
        .map(|e| distance(centroid, e.pos))
        .fold(0.0, f64::max);
    Some((centroid, spread))
}

/// Entry point: load parameters, spawn the flock, run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let options = RunOptions::from_env()?;
    let params = Params::load_or_default(&options.config_path);

    let mut rng = match options.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let entities = spawn::spawn_entities(&mut rng, options.count, WORLD_WIDTH, WORLD_HEIGHT);
    log::info!(
        "Spawned {} lings in {}x{} ({:?} boundary)",
        entities.len(),
        WORLD_WIDTH,
        WORLD_HEIGHT,
        params.boundary
    );

    let world = World::from_params(entities, WORLD_WIDTH, WORLD_HEIGHT, &params);
    let mut app = App::new(world, options.ticks);
    while !app.done() {
        app.frame();
    }
    log::info!("Ran {} ticks", app.tick_count);
    app.log_phase_timings();
    app.log_flock_spread();

    if options.save {
        app.world.params().save(&options.config_path)?;
        log::info!("Saved parameters to {}", options.config_path.display());
    }
    Ok(())
}
