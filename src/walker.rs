use crate::direction::Direction;
use crate::simulation::pheromone::PheromoneField;
use crate::terrain::{CellKind, Pos, Terrain};
use std::collections::HashSet;

const DRAIN_BONUS: f64 = 5.0;
const HOUSE_BONUS: f64 = 4.0;
const NEAR_HOUSE_BONUS: f64 = 2.0;

/// Result of one walker step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to a non-drain cell
    Continuing,
    /// Reached a drain
    Succeeded,
    /// No unvisited passable neighbor left
    Stuck,
}

impl StepOutcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, StepOutcome::Continuing)
    }
}

/// One ant building a path towards a drain
#[derive(Clone, Debug)]
pub struct Walker {
    pub id: u32,
    pos: Pos,
    path: Vec<Pos>,
    visited: HashSet<Pos>,
    outcome: Option<StepOutcome>,
}

impl Walker {
    /// Create a new walker at the given start cell
    pub fn new(id: u32, start: Pos) -> Self {
        Self {
            id,
            pos: start,
            path: vec![start],
            visited: HashSet::from([start]),
            outcome: None,
        }
    }

    #[inline]
    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    /// Terminal outcome, once the walker has finished
    #[inline]
    pub fn outcome(&self) -> Option<StepOutcome> {
        self.outcome
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.outcome.is_none()
    }

    #[inline]
    pub fn succeeded(&self) -> bool {
        self.outcome == Some(StepOutcome::Succeeded)
    }

    /// Take one probabilistic step. A finished walker stays where it is and
    /// keeps reporting its terminal outcome.
    pub fn step(
        &mut self,
        terrain: &Terrain,
        pheromones: &PheromoneField,
        alpha: f64,
        beta: f64,
        rng: &mut fastrand::Rng,
    ) -> StepOutcome {
        if let Some(done) = self.outcome {
            return done;
        }

        let mut candidates = [self.pos; 8];
        let mut scores = [0.0f64; 8];
        let mut k = 0usize;
        let here = terrain.elevation_at(self.pos);

        for next in terrain.neighbors(self.pos, &Direction::ALL) {
            if !terrain.kind_at(next).is_passable() || self.visited.contains(&next) {
                continue;
            }
            candidates[k] = next;
            scores[k] = pheromones.level_at(next).powf(alpha)
                * heuristic(terrain, here, next).powf(beta)
                * priority_bonus(terrain, next);
            k += 1;
        }

        if k == 0 {
            self.outcome = Some(StepOutcome::Stuck);
            return StepOutcome::Stuck;
        }

        let next = candidates[pick(&scores[..k], rng)];
        self.pos = next;
        self.path.push(next);
        self.visited.insert(next);

        if terrain.is_drain(next) {
            self.outcome = Some(StepOutcome::Succeeded);
            StepOutcome::Succeeded
        } else {
            StepOutcome::Continuing
        }
    }
}

/// Downhill drop plus one, so flat and uphill moves stay possible
#[inline]
fn heuristic(terrain: &Terrain, here: f64, next: Pos) -> f64 {
    (here - terrain.elevation_at(next)).max(0.0) + 1.0
}

/// Houses and their immediate surroundings are what the network protects
#[inline]
fn priority_bonus(terrain: &Terrain, pos: Pos) -> f64 {
    match terrain.kind_at(pos) {
        CellKind::Drain => DRAIN_BONUS,
        CellKind::House => HOUSE_BONUS,
        CellKind::Empty | CellKind::Road | CellKind::Tree | CellKind::Obstacle => {
            if terrain.near_house(pos) {
                NEAR_HOUSE_BONUS
            } else {
                1.0
            }
        }
    }
}

/// Roulette-wheel choice over `scores`; uniform when they sum to zero
fn pick(scores: &[f64], rng: &mut fastrand::Rng) -> usize {
    let total: f64 = scores.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.usize(..scores.len());
    }

    let mut target = rng.f64() * total;
    for (i, &s) in scores.iter().enumerate() {
        if target < s {
            return i;
        }
        target -= s;
    }
    // rounding can leave a sliver past the last bucket
    scores.iter().rposition(|&s| s > 0.0).unwrap_or(scores.len() - 1)
}
