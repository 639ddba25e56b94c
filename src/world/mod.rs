use crate::config::{BoundaryKind, Params};
use crate::debug::timer::{TickPhase, TickTimers};
use crate::entity::Entity;
use crate::spatial::{Addressing, SpatialGrid, MIN_CELL_SIZE};

/// What happens at the world edge. Picked once, when the world is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Toroidal world, no wall force.
    Wrap,
    /// Hard clamp with elastic bounce, plus a soft quadratic push away from
    /// the wall once inside `margin`.
    Reflect { margin: f64, force: f64 },
}

impl Boundary {
    /// Grid addressing that matches this policy.
    pub fn addressing(self) -> Addressing {
        match self {
            Boundary::Wrap => Addressing::Wrap,
            Boundary::Reflect { .. } => Addressing::Clamp,
        }
    }
}

/// Which state an entity's neighbors are read from during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrder {
    /// Entities update in index order and write back immediately, so entity
    /// `i` sees entities `< i` already advanced this tick. Result depends on
    /// array order.
    #[default]
    Sequential,
    /// Every entity reads the pre-tick state; results are committed as the
    /// pass runs but never observed until the next tick.
    Snapshot,
}

/// Tunables frozen for the duration of one tick.
#[derive(Clone, Copy)]
struct Rules {
    avoidance_factor: f64,
    alignment_factor: f64,
    gathering_factor: f64,
    avoidance_radius: f64,
    detection_radius: f64,
    max_speed: f64,
    width: f64,
    height: f64,
    boundary: Boundary,
}

impl Rules {
    /// Force model, speed clamp, integration and boundary for one entity.
    #[inline]
    fn step(&self, me: &Entity, neighbors: &[Entity]) -> Entity {
        let mut delta = me.avoid(neighbors, self.avoidance_factor, self.avoidance_radius);
        delta += me.align(neighbors, self.alignment_factor, self.detection_radius);
        delta += me.gather(neighbors, self.gathering_factor, self.detection_radius);
        if let Boundary::Reflect { margin, force } = self.boundary {
            delta += me.wall_avoid(self.width, self.height, margin, force);
        }

        let mut next = *me;
        next.steer(delta, self.max_speed);
        next.advance();
        match self.boundary {
            Boundary::Wrap => next.wrap(self.width, self.height),
            Boundary::Reflect { .. } => next.reflect(self.width, self.height),
        }
        next
    }
}

/// The flock: entities, world bounds, tunables, and the working storage
/// reused from tick to tick.
///
/// Tunables are plain fields. Edit them between ticks; the grid picks up
/// any change that affects its shape on the next [`World::update`].
pub struct World {
    pub entities: Vec<Entity>,
    pub width: f64,
    pub height: f64,

    pub avoidance_factor: f64,
    pub alignment_factor: f64,
    pub gathering_factor: f64,
    pub detection_radius: f64,
    pub avoidance_radius: f64,
    pub max_speed: f64,
    pub boundary: Boundary,
    pub order: UpdateOrder,

    // Wall settings from the last parameter set. Reported by `params()`
    // while the boundary wraps and carries none of its own.
    wall_margin: f64,
    wall_force: f64,

    grid: Option<SpatialGrid>,
    // Scratch buffers (pre-allocated, reused each tick)
    neighbors: Vec<Entity>,
    snapshot: Vec<Entity>,
    timers: TickTimers,
}

impl World {
    pub fn new(entities: Vec<Entity>, width: f64, height: f64) -> Self {
        Self::from_params(entities, width, height, &Params::default())
    }

    pub fn from_params(entities: Vec<Entity>, width: f64, height: f64, params: &Params) -> Self {
        let mut world = Self {
            entities,
            width,
            height,
            avoidance_factor: 0.0,
            alignment_factor: 0.0,
            gathering_factor: 0.0,
            detection_radius: 0.0,
            avoidance_radius: 0.0,
            max_speed: 0.0,
            boundary: Boundary::Wrap,
            order: UpdateOrder::default(),
            wall_margin: 0.0,
            wall_force: 0.0,
            grid: None,
            neighbors: Vec::with_capacity(64),
            snapshot: Vec::new(),
            timers: TickTimers::new(),
        };
        world.apply_params(params);
        world
    }

    /// Copy every tunable from a parameter set.
    pub fn apply_params(&mut self, params: &Params) {
        self.avoidance_factor = params.avoidance_factor;
        self.alignment_factor = params.alignment_factor;
        self.gathering_factor = params.gathering_factor;
        self.avoidance_radius = params.avoidance_radius;
        self.detection_radius = params.detection_radius;
        self.max_speed = params.max_speed;
        self.wall_margin = params.wall_margin;
        self.wall_force = params.wall_force;
        self.boundary = params.boundary();
    }

    /// Current tunables as a parameter set, ready to be saved.
    ///
    /// Under [`Boundary::Wrap`] the wall settings are the ones last applied
    /// from a parameter set.
    pub fn params(&self) -> Params {
        let (boundary, wall_margin, wall_force) = match self.boundary {
            Boundary::Wrap => (BoundaryKind::Wrap, self.wall_margin, self.wall_force),
            Boundary::Reflect { margin, force } => (BoundaryKind::Reflect, margin, force),
        };
        Params {
            avoidance_factor: self.avoidance_factor,
            alignment_factor: self.alignment_factor,
            gathering_factor: self.gathering_factor,
            avoidance_radius: self.avoidance_radius,
            detection_radius: self.detection_radius,
            max_speed: self.max_speed,
            wall_margin,
            wall_force,
            boundary,
        }
    }

    /// Cell size the grid needs for the current tunables.
    ///
    /// Covers the larger interaction radius. Under sequential updates a
    /// neighbor may already have moved up to `max_speed` away from the
    /// position it was bucketed at, so that distance is added on top.
    pub fn cell_size(&self) -> f64 {
        let reach = self.detection_radius.abs().max(self.avoidance_radius.abs());
        let slack = match self.order {
            UpdateOrder::Sequential => self.max_speed.max(0.0),
            UpdateOrder::Snapshot => 0.0,
        };
        (reach + slack).max(MIN_CELL_SIZE)
    }

    /// The grid from the last tick, if any tick has run.
    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    pub fn timers(&self) -> &TickTimers {
        &self.timers
    }

    /// Advance one tick using the spatial grid for neighbor lookups.
    pub fn update(&mut self) {
        self.timers.begin();
        let mut grid = self.take_grid();
        self.timers.end(TickPhase::Grid);

        self.timers.begin();
        grid.populate(&self.entities);
        self.timers.end(TickPhase::Populate);

        self.timers.begin();
        let rules = self.rules();
        self.steer_all(rules, |i, source, out| {
            grid.neighbors(source[i].pos, i, source, out)
        });
        self.timers.end(TickPhase::Steer);

        self.grid = Some(grid);
    }

    /// Advance one tick scanning every other entity as a neighbor candidate.
    ///
    /// Same order and update policy as [`World::update`]; O(n²), meant as a
    /// reference and for tiny populations.
    pub fn update_brute_force(&mut self) {
        self.timers.begin();
        let rules = self.rules();
        self.steer_all(rules, |i, source, out| {
            out.clear();
            for (j, other) in source.iter().enumerate() {
                if j != i {
                    out.push(*other);
                }
            }
        });
        self.timers.end(TickPhase::Steer);
    }

    /// Scale every position, e.g. after the window was resized.
    pub fn update_positions(&mut self, ratio_x: f64, ratio_y: f64) {
        for entity in &mut self.entities {
            entity.pos.x *= ratio_x;
            entity.pos.y *= ratio_y;
        }
    }

    /// Change world bounds, keeping the flock's relative layout.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width == self.width && height == self.height {
            return;
        }
        if self.width > 0.0 && self.height > 0.0 {
            self.update_positions(width / self.width, height / self.height);
        }
        log::debug!(
            "World resized {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
    }

    fn rules(&self) -> Rules {
        Rules {
            avoidance_factor: self.avoidance_factor,
            alignment_factor: self.alignment_factor,
            gathering_factor: self.gathering_factor,
            avoidance_radius: self.avoidance_radius,
            detection_radius: self.detection_radius,
            max_speed: self.max_speed,
            width: self.width,
            height: self.height,
            boundary: self.boundary,
        }
    }

    /// Reuse the last grid when its shape and addressing still fit, otherwise
    /// build a new one.
    fn take_grid(&mut self) -> SpatialGrid {
        let cell_size = self.cell_size();
        let addressing = self.boundary.addressing();
        match self.grid.take() {
            Some(grid)
                if grid.addressing() == addressing
                    && !grid.needs_rebuild(self.width, self.height, cell_size) =>
            {
                grid
            }
            _ => {
                let grid = SpatialGrid::new(self.width, self.height, cell_size, addressing);
                log::debug!(
                    "Rebuilt spatial grid: {}x{} cells of {:.1}px",
                    grid.cols(),
                    grid.rows(),
                    grid.cell_size()
                );
                grid
            }
        }
    }

    /// Run `rules` over every entity in index order. `collect` fills the
    /// neighbor buffer for entity `i` from the state it should observe.
    fn steer_all<F>(&mut self, rules: Rules, mut collect: F)
    where
        F: FnMut(usize, &[Entity], &mut Vec<Entity>),
    {
        match self.order {
            UpdateOrder::Sequential => {
                for i in 0..self.entities.len() {
                    collect(i, &self.entities, &mut self.neighbors);
                    let next = rules.step(&self.entities[i], &self.neighbors);
                    self.entities[i] = next;
                }
            }
            UpdateOrder::Snapshot => {
                self.snapshot.clear();
                self.snapshot.extend_from_slice(&self.entities);
                for i in 0..self.snapshot.len() {
                    collect(i, &self.snapshot, &mut self.neighbors);
                    self.entities[i] = rules.step(&self.snapshot[i], &self.neighbors);
                }
            }
        }
    }
}
