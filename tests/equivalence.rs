use swarmlings::spawn::spawn_entities;
use swarmlings::{Boundary, Entity, UpdateOrder, World};

const TOLERANCE: f64 = 1e-9;

struct Case {
    seed: u64,
    count: usize,
    width: f64,
    height: f64,
    boundary: Boundary,
    order: UpdateOrder,
}

fn random_world(rng: &mut fastrand::Rng, case: &Case, entities: Vec<Entity>) -> World {
    let mut world = World::new(entities, case.width, case.height);
    world.avoidance_factor = 0.5 + rng.f64() * 2.0;
    world.alignment_factor = rng.f64() * 0.05;
    world.gathering_factor = rng.f64() * 0.005;
    world.avoidance_radius = 10.0 + rng.f64() * 20.0;
    world.detection_radius = 30.0 + rng.f64() * 50.0;
    world.max_speed = 1.0 + rng.f64() * 4.0;
    world.boundary = case.boundary;
    world.order = case.order;
    world
}

/// Copy every tunable so both worlds tick under identical rules.
fn twin(world: &World) -> World {
    let mut other = World::from_params(world.entities.clone(), world.width, world.height, &world.params());
    other.boundary = world.boundary;
    other.order = world.order;
    other
}

fn assert_same(grid: &World, brute: &World, tick: usize) {
    for (i, (a, b)) in grid.entities.iter().zip(&brute.entities).enumerate() {
        let dp = (a.pos - b.pos).abs().max_element();
        let dv = (a.vel - b.vel).abs().max_element();
        assert!(
            dp < TOLERANCE && dv < TOLERANCE,
            "tick {tick}, entity {i}: grid {a:?} vs brute {b:?}"
        );
    }
}

fn check(case: Case, ticks: usize) {
    let mut rng = fastrand::Rng::with_seed(case.seed);
    let entities = spawn_entities(&mut rng, case.count, case.width, case.height);
    let mut grid = random_world(&mut rng, &case, entities);
    let mut brute = twin(&grid);

    for tick in 0..ticks {
        grid.update();
        brute.update_brute_force();
        assert_same(&grid, &brute, tick);
    }
}

#[test]
fn snapshot_reflect_matches_brute_force() {
    for seed in 0..4 {
        check(
            Case {
                seed,
                count: 300,
                width: 437.0,
                height: 311.0,
                boundary: Boundary::Reflect { margin: 40.0, force: 1.5 },
                order: UpdateOrder::Snapshot,
            },
            5,
        );
    }
}

#[test]
fn snapshot_wrap_matches_brute_force() {
    for seed in 10..14 {
        check(
            Case {
                seed,
                count: 300,
                width: 437.0,
                height: 311.0,
                boundary: Boundary::Wrap,
                order: UpdateOrder::Snapshot,
            },
            5,
        );
    }
}

#[test]
fn sequential_reflect_matches_brute_force() {
    for seed in 20..24 {
        check(
            Case {
                seed,
                count: 300,
                width: 437.0,
                height: 311.0,
                boundary: Boundary::Reflect { margin: 40.0, force: 1.5 },
                order: UpdateOrder::Sequential,
            },
            5,
        );
    }
}

#[test]
fn sequential_wrap_matches_brute_force() {
    for seed in 30..34 {
        check(
            Case {
                seed,
                count: 300,
                width: 437.0,
                height: 311.0,
                boundary: Boundary::Wrap,
                order: UpdateOrder::Sequential,
            },
            5,
        );
    }
}

#[test]
fn sequential_wrap_across_ragged_seam_matches_brute_force() {
    // A band of fast movers straddling the vertical seam of a world whose
    // width is not a multiple of the cell size.
    for seed in 40..44 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let entities = (0..200)
            .map(|_| {
                let x = if rng.bool() { 401.0 - rng.f64() * 20.0 } else { rng.f64() * 60.0 };
                Entity::new(x, rng.f64() * 300.0, 3.0, rng.f64() - 0.5, 10.0)
            })
            .collect();
        let mut grid = World::new(entities, 401.0, 300.0);
        grid.boundary = Boundary::Wrap;
        grid.avoidance_factor = 1.0 + rng.f64();
        grid.alignment_factor = rng.f64() * 0.05;
        grid.gathering_factor = rng.f64() * 0.005;
        grid.avoidance_radius = 15.0;
        grid.detection_radius = 47.0;
        grid.max_speed = 3.0;
        assert_eq!(grid.cell_size(), 50.0);

        let mut brute = twin(&grid);
        for tick in 0..5 {
            grid.update();
            brute.update_brute_force();
            assert_same(&grid, &brute, tick);
        }
    }
}

#[test]
fn dense_cluster_matches_brute_force() {
    // Everything packed into a couple of cells.
    let mut rng = fastrand::Rng::with_seed(99);
    let entities = spawn_entities(&mut rng, 200, 60.0, 60.0);
    let mut grid = World::new(entities, 600.0, 600.0);
    grid.order = UpdateOrder::Snapshot;
    let mut brute = twin(&grid);
    for tick in 0..3 {
        grid.update();
        brute.update_brute_force();
        assert_same(&grid, &brute, tick);
    }
}

#[test]
fn speed_clamped_every_tick() {
    let mut rng = fastrand::Rng::with_seed(5);
    let entities = spawn_entities(&mut rng, 1000, 800.0, 600.0);
    let mut world = World::new(entities, 800.0, 600.0);
    world.avoidance_factor = 20.0;
    world.alignment_factor = 0.05;
    world.gathering_factor = 0.01;
    for _ in 0..60 {
        world.update();
        for e in &world.entities {
            assert!(e.vel.x.hypot(e.vel.y) <= world.max_speed + TOLERANCE);
            assert!((0.0..=800.0).contains(&e.pos.x) && (0.0..=600.0).contains(&e.pos.y));
        }
    }
}
