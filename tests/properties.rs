// Library-level checks of the optimizer and water model on generated cities.

use flood_aco::prelude::*;
use flood_aco::simulation::pheromone::PHEROMONE_FLOOR;
use std::collections::HashSet;

/// A generated 15x15 city with drains on its `drains` lowest buildable cells
fn city(seed: u64, drains: usize) -> (Terrain, fastrand::Rng) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut terrain = Terrain::generate(15, &mut rng).unwrap();

    let mut sites: Vec<(f64, Pos)> = terrain
        .cells()
        .enumerate()
        .filter(|(_, kind)| kind.can_host_drain())
        .map(|(pos, _)| (terrain.elevation(pos).unwrap(), pos))
        .collect();
    sites.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (_, pos) in sites.into_iter().take(drains) {
        terrain.add_drain(pos).unwrap();
    }
    (terrain, rng)
}

fn params(available_budget: u64) -> ColonyParams {
    ColonyParams {
        ants: 15,
        available_budget,
        ..ColonyParams::default()
    }
}

#[test]
fn pipe_network_grows_monotonically_within_budget() {
    let (terrain, mut rng) = city(31, 3);
    let budget = 60 * flood_aco::config::PIPE_COST_PER_CELL;
    let mut colony = Colony::new(&terrain, params(budget)).unwrap();

    let mut previous: HashSet<Pos> = HashSet::new();
    for _ in 0..25 {
        if colony.is_converged() {
            break;
        }
        colony.run_iteration(&terrain, &mut rng).unwrap();

        let cells = colony.pipe_cells().clone();
        assert!(previous.is_subset(&cells));
        assert!(colony.pipe_cost() <= budget);
        assert!(colony.total_pipe_length() <= colony.params().max_pipe_length);
        previous = cells;
    }
}

#[test]
fn accepted_paths_are_simple_walks_into_drains() {
    let (terrain, mut rng) = city(8, 3);
    let mut colony = Colony::new(&terrain, params(u64::MAX)).unwrap();

    for _ in 0..5 {
        colony.run_iteration(&terrain, &mut rng).unwrap();
    }

    for path in colony.accepted_paths() {
        let unique: HashSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len());
        assert!(terrain.is_drain(*path.last().unwrap()));
        assert!(!terrain.is_drain(path[0]));
        for pair in path.windows(2) {
            assert_eq!(pair[0].chebyshev(pair[1]), 1);
        }
    }
}

#[test]
fn pheromones_never_drop_below_floor() {
    let (terrain, mut rng) = city(4, 3);
    let aggressive = ColonyParams {
        evaporation_rate: 1.0,
        convergence_threshold: 1_000,
        ..params(u64::MAX)
    };
    let mut colony = Colony::new(&terrain, aggressive).unwrap();

    for _ in 0..30 {
        colony.run_iteration(&terrain, &mut rng).unwrap();
        assert!(colony.pheromones().min_level() >= PHEROMONE_FLOOR);
    }
}

#[test]
fn zero_budget_converges_on_first_success() {
    let (terrain, mut rng) = city(12, 3);
    let mut colony = Colony::new(&terrain, params(0)).unwrap();

    while !colony.budget_exceeded() && colony.iteration() < 50 {
        colony.run_iteration(&terrain, &mut rng).unwrap();
    }

    assert!(colony.budget_exceeded());
    assert_eq!(colony.exceeded_reason(), Some(ConstraintViolation::Budget));
    assert!(colony.is_converged());
    assert!(colony.accepted_paths().is_empty());
    assert!(colony.pipe_cells().is_empty());
}

#[test]
fn stagnation_bounds_the_run() {
    let (terrain, mut rng) = city(21, 3);
    let quick = ColonyParams {
        convergence_threshold: 4,
        ..params(u64::MAX)
    };
    let mut colony = Colony::new(&terrain, quick).unwrap();

    for _ in 0..500 {
        if colony.is_converged() {
            break;
        }
        colony.run_iteration(&terrain, &mut rng).unwrap();
    }

    assert!(colony.is_converged());
    assert!(colony.stagnation() >= 4);
    assert!(colony.iteration() - colony.last_improvement_iteration() >= 4);
}

#[test]
fn obstacles_stay_dry_under_any_rain() {
    let mut terrain = Terrain::flat(6).unwrap();
    for col in 0..6 {
        terrain = terrain.with_cell(Pos::new(2, col), CellKind::Obstacle).unwrap();
    }
    let mut water = WaterField::new(6);
    let mut rng = fastrand::Rng::with_seed(77);
    let pipes: HashSet<Pos> = (0..6).map(|c| Pos::new(3, c)).collect();

    for _ in 0..40 {
        water.rain(&terrain, 2.0, &mut rng).unwrap();
        water.drain(&terrain, &pipes).unwrap();
        for col in 0..6 {
            assert_eq!(water.depth(Pos::new(2, col)).unwrap(), 0.0);
        }
        assert!(water.depths().iter().all(|&d| d >= 0.0));
    }
}
