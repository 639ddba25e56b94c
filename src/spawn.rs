use crate::entity::Entity;

/// Visual radius given to freshly spawned lings.
pub const DEFAULT_SIZE: f64 = 10.0;

/// Spawn a batch of lings scattered uniformly over the world, drifting
/// slowly toward +x/+y (each velocity component in `[0, 1)`).
///
/// Pass a seeded `rng` for a reproducible flock.
pub fn spawn_entities(rng: &mut fastrand::Rng, count: usize, width: f64, height: f64) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(count);
    for _ in 0..count {
        entities.push(Entity::new(
            rng.f64() * width,
            rng.f64() * height,
            rng.f64(),
            rng.f64(),
            DEFAULT_SIZE,
        ));
    }
    entities
}
