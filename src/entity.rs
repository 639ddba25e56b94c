use glam::DVec2;

use crate::util::math::{clamp_length, distance_squared};

/// One flocking agent. Identity is its index in the world's entity array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Entity {
    /// World position in pixels.
    pub pos: DVec2,
    /// Velocity in pixels/tick.
    pub vel: DVec2,
    /// Visual radius. Physics ignores it.
    pub size: f64,
}

impl Entity {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, size: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            vel: DVec2::new(vx, vy),
            size,
        }
    }

    /// Separation: sum of `-(other - self) / dist²` over neighbors inside
    /// `radius`, scaled by `factor`. Near neighbors dominate.
    ///
    /// A neighbor sitting exactly on top of us has no direction to push
    /// away from and contributes nothing.
    pub fn avoid(&self, neighbors: &[Entity], factor: f64, radius: f64) -> DVec2 {
        let radius_sq = radius * radius;
        let mut push = DVec2::ZERO;
        for other in neighbors {
            let dist_sq = distance_squared(self.pos, other.pos);
            if dist_sq > 0.0 && dist_sq < radius_sq {
                push -= (other.pos - self.pos) / dist_sq;
            }
        }
        push * factor
    }

    /// Alignment: steer toward the average velocity of neighbors inside `radius`.
    pub fn align(&self, neighbors: &[Entity], factor: f64, radius: f64) -> DVec2 {
        let radius_sq = radius * radius;
        let mut sum = DVec2::ZERO;
        let mut count = 0u32;
        for other in neighbors {
            if distance_squared(self.pos, other.pos) < radius_sq {
                sum += other.vel;
                count += 1;
            }
        }
        if count == 0 {
            return DVec2::ZERO;
        }
        (sum / count as f64 - self.vel) * factor
    }

    /// Cohesion: steer toward the local center of mass inside `radius`.
    pub fn gather(&self, neighbors: &[Entity], factor: f64, radius: f64) -> DVec2 {
        let radius_sq = radius * radius;
        let mut sum = DVec2::ZERO;
        let mut count = 0u32;
        for other in neighbors {
            if distance_squared(self.pos, other.pos) < radius_sq {
                sum += other.pos;
                count += 1;
            }
        }
        if count == 0 {
            return DVec2::ZERO;
        }
        (sum / count as f64 - self.pos) * factor
    }

    /// Soft wall repulsion. Inside `margin` of an edge the push grows with the
    /// square of penetration depth, `strength * t²` with `t` in `(0, 1]`.
    /// Axes are independent.
    pub fn wall_avoid(&self, width: f64, height: f64, margin: f64, strength: f64) -> DVec2 {
        if margin <= 0.0 {
            return DVec2::ZERO;
        }
        DVec2::new(
            edge_push(self.pos.x, width, margin, strength),
            edge_push(self.pos.y, height, margin, strength),
        )
    }

    /// Add a steering delta to velocity, then cap speed at `max_speed`.
    #[inline]
    pub fn steer(&mut self, delta: DVec2, max_speed: f64) {
        self.vel = clamp_length(self.vel + delta, max_speed);
    }

    /// Explicit Euler step, one tick of simulated time.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }

    /// Toroidal wrap: leaving one edge re-enters from the opposite one.
    /// Positions several extents out are folded back in as well.
    pub fn wrap(&mut self, width: f64, height: f64) {
        self.pos.x = wrap_axis(self.pos.x, width);
        self.pos.y = wrap_axis(self.pos.y, height);
    }

    /// Hard clamp into `[0, width] x [0, height]`. A clamped axis whose
    /// velocity still points outward is bounced back.
    pub fn reflect(&mut self, width: f64, height: f64) {
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            if self.vel.x < 0.0 {
                self.vel.x = -self.vel.x;
            }
        } else if self.pos.x > width {
            self.pos.x = width;
            if self.vel.x > 0.0 {
                self.vel.x = -self.vel.x;
            }
        }
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            if self.vel.y < 0.0 {
                self.vel.y = -self.vel.y;
            }
        } else if self.pos.y > height {
            self.pos.y = height;
            if self.vel.y > 0.0 {
                self.vel.y = -self.vel.y;
            }
        }
    }
}

fn wrap_axis(coord: f64, extent: f64) -> f64 {
    if extent.is_nan() || extent <= 0.0 {
        return 0.0;
    }
    if coord < 0.0 || coord > extent {
        coord.rem_euclid(extent)
    } else {
        coord
    }
}

fn edge_push(coord: f64, extent: f64, margin: f64, strength: f64) -> f64 {
    if coord < margin {
        let t = (margin - coord) / margin;
        strength * t * t
    } else if extent - coord < margin {
        let t = (margin - (extent - coord)) / margin;
        -strength * t * t
    } else {
        0.0
    }
}
