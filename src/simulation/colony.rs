use crate::config::ColonyParams;
use crate::error::{Result, SimError};
use crate::simulation::pheromone::PheromoneField;
use crate::terrain::{Pos, Terrain};
use crate::walker::{StepOutcome, Walker};
use std::collections::HashSet;
use std::fmt;

/// Deposit scale: a successful path of length `len` adds `strength * 50 / len`
pub const DEPOSIT_SCALE: f64 = 50.0;

/// Optimization run lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColonyState {
    Idle,
    Iterating,
    Converged,
}

/// Which hard ceiling a candidate path would have broken
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintViolation {
    Budget,
    Length,
}

impl ConstraintViolation {
    pub const fn as_str(self) -> &'static str {
        match self {
            ConstraintViolation::Budget => "BUDGET",
            ConstraintViolation::Length => "LENGTH",
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ant colony optimizer building a drainage network under budget and length caps.
///
/// One run goes `Idle → Iterating → Idle → … → Converged`; a converged colony is
/// terminal and a new run needs a new colony. The pheromone field is only read
/// while ants step and only written in [`Colony::finish_iteration`].
#[derive(Clone, Debug)]
pub struct Colony {
    params: ColonyParams,
    pheromones: PheromoneField,
    walkers: Vec<Walker>,
    state: ColonyState,

    /// Every path committed this run, in acceptance order
    accepted: Vec<Vec<Pos>>,
    /// Running union of `accepted`, used for the constraint checks
    committed: HashSet<Pos>,
    /// Published network, refreshed at iteration boundaries
    pipe_cells: HashSet<Pos>,

    iteration: u32,
    steps_taken: u32,
    accepted_this_iteration: usize,
    violation: Option<ConstraintViolation>,

    iteration_efficiency: f64,
    best_efficiency: f64,
    stagnation: u32,
    last_improvement_iteration: u32,
}

impl Colony {
    /// Create an idle colony over `terrain`
    pub fn new(terrain: &Terrain, params: ColonyParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            pheromones: PheromoneField::new(terrain.size()),
            walkers: Vec::with_capacity(params.ants),
            params,
            state: ColonyState::Idle,
            accepted: Vec::new(),
            committed: HashSet::new(),
            pipe_cells: HashSet::new(),
            iteration: 0,
            steps_taken: 0,
            accepted_this_iteration: 0,
            violation: None,
            iteration_efficiency: f64::INFINITY,
            best_efficiency: f64::INFINITY,
            stagnation: 0,
            last_improvement_iteration: 0,
        })
    }

    /// Spawn one walker per ant on uniformly random start cells
    pub fn start_iteration(&mut self, terrain: &Terrain, rng: &mut fastrand::Rng) -> Result<()> {
        if self.state == ColonyState::Converged {
            return Err(SimError::ColonyConverged);
        }

        let starts: Vec<Pos> = terrain
            .cells()
            .enumerate()
            .filter_map(|(pos, kind)| kind.can_start_walk().then_some(pos))
            .collect();
        if starts.is_empty() {
            return Err(SimError::NoStartCell);
        }

        self.iteration += 1;
        self.steps_taken = 0;
        self.accepted_this_iteration = 0;
        self.iteration_efficiency = f64::INFINITY;
        self.walkers.clear();
        self.walkers.extend(
            (0..self.params.ants).map(|i| Walker::new(i as u32, starts[rng.usize(..starts.len())])),
        );
        self.state = ColonyState::Iterating;
        Ok(())
    }

    /// Move every active walker one step. Returns `true` once the iteration is
    /// over: no walker is active or the step ceiling has been hit.
    pub fn advance_step(&mut self, terrain: &Terrain, rng: &mut fastrand::Rng) -> bool {
        if self.state != ColonyState::Iterating {
            return true;
        }

        self.steps_taken += 1;
        let mut any_active = false;

        for i in 0..self.walkers.len() {
            let walker = &mut self.walkers[i];
            if !walker.is_active() {
                continue;
            }
            match walker.step(
                terrain,
                &self.pheromones,
                self.params.alpha,
                self.params.beta,
                rng,
            ) {
                StepOutcome::Continuing => any_active = true,
                StepOutcome::Succeeded => self.offer_path(i),
                StepOutcome::Stuck => {}
            }
        }

        !any_active || self.steps_taken >= self.params.max_steps
    }

    /// Commit walker `i`'s path if the grown network stays inside both ceilings
    fn offer_path(&mut self, i: usize) {
        let path = self.walkers[i].path();
        let added = path
            .iter()
            .filter(|p| !self.committed.contains(*p))
            .collect::<HashSet<_>>()
            .len();
        let total_length = self.committed.len() + added;
        let total_cost = (total_length as u64).saturating_mul(self.params.pipe_cost_per_cell);

        let length_ok = total_length <= self.params.max_pipe_length;
        let budget_ok = total_cost <= self.params.available_budget;

        if length_ok && budget_ok {
            self.committed.extend(path.iter().copied());
            self.accepted.push(path.to_vec());
            self.accepted_this_iteration += 1;
            return;
        }

        // a double violation reports the budget
        let reason = if budget_ok {
            ConstraintViolation::Length
        } else {
            ConstraintViolation::Budget
        };
        if self.violation.is_none() {
            tracing::warn!(
                target: "flood_aco::colony",
                iteration = self.iteration,
                reason = reason.as_str(),
                total_length,
                total_cost,
                "colony.constraint.violated"
            );
        }
        self.violation = Some(reason);
    }

    /// Publish the network, update pheromones and test for convergence
    pub fn finish_iteration(&mut self) {
        if self.state == ColonyState::Converged {
            return;
        }

        self.pipe_cells = self.accepted.iter().flatten().copied().collect();

        self.pheromones.evaporate(self.params.evaporation_rate);
        for walker in &self.walkers {
            let path = walker.path();
            if walker.succeeded() && path.len() > 1 {
                let deposit = self.params.pheromone_strength * DEPOSIT_SCALE / path.len() as f64;
                self.pheromones.deposit(path, deposit);
            }
        }

        self.update_convergence();

        tracing::debug!(
            target: "flood_aco::colony",
            iteration = self.iteration,
            steps = self.steps_taken,
            accepted = self.accepted_this_iteration,
            pipe_length = self.pipe_cells.len(),
            efficiency = self.iteration_efficiency,
            stagnation = self.stagnation,
            "colony.iteration.finished"
        );

        if self.state == ColonyState::Converged {
            tracing::info!(
                target: "flood_aco::colony",
                iteration = self.iteration,
                paths = self.accepted.len(),
                pipe_length = self.pipe_cells.len(),
                best_efficiency = self.best_efficiency,
                reason = self.violation.map(ConstraintViolation::as_str),
                "colony.converged"
            );
        }
    }

    fn update_convergence(&mut self) {
        if self.violation.is_some() {
            self.state = ColonyState::Converged;
            return;
        }

        let k = self.accepted_this_iteration;
        self.iteration_efficiency = if k > 0 {
            let fresh: HashSet<Pos> = self.accepted[self.accepted.len() - k..]
                .iter()
                .flatten()
                .copied()
                .collect();
            fresh.len() as f64 / k as f64
        } else {
            f64::INFINITY
        };

        if self.iteration_efficiency < self.best_efficiency {
            self.best_efficiency = self.iteration_efficiency;
            self.stagnation = 0;
            self.last_improvement_iteration = self.iteration;
        } else if k > 0 {
            self.stagnation += 1;
        }

        self.state = if self.stagnation >= self.params.convergence_threshold {
            ColonyState::Converged
        } else {
            ColonyState::Idle
        };
    }

    /// Run one whole iteration: start, step until done, finish
    pub fn run_iteration(&mut self, terrain: &Terrain, rng: &mut fastrand::Rng) -> Result<()> {
        self.start_iteration(terrain, rng)?;
        while !self.advance_step(terrain, rng) {}
        self.finish_iteration();
        Ok(())
    }

    pub fn params(&self) -> &ColonyParams {
        &self.params
    }

    pub fn state(&self) -> ColonyState {
        self.state
    }

    pub fn is_converged(&self) -> bool {
        self.state == ColonyState::Converged
    }

    /// Whether an iteration is in progress
    pub fn is_iterating(&self) -> bool {
        self.state == ColonyState::Iterating
    }

    pub fn pheromones(&self) -> &PheromoneField {
        &self.pheromones
    }

    /// Walkers of the current (or last) iteration
    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub fn accepted_paths(&self) -> &[Vec<Pos>] {
        &self.accepted
    }

    /// The committed network as of the last finished iteration
    pub fn pipe_cells(&self) -> &HashSet<Pos> {
        &self.pipe_cells
    }

    pub fn total_pipe_length(&self) -> usize {
        self.pipe_cells.len()
    }

    pub fn pipe_cost(&self) -> u64 {
        (self.pipe_cells.len() as u64).saturating_mul(self.params.pipe_cost_per_cell)
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub fn accepted_this_iteration(&self) -> usize {
        self.accepted_this_iteration
    }

    /// Pipe cells per accepted path in the last iteration; lower is better
    pub fn iteration_efficiency(&self) -> f64 {
        self.iteration_efficiency
    }

    pub fn best_efficiency(&self) -> f64 {
        self.best_efficiency
    }

    pub fn stagnation(&self) -> u32 {
        self.stagnation
    }

    pub fn last_improvement_iteration(&self) -> u32 {
        self.last_improvement_iteration
    }

    pub fn budget_exceeded(&self) -> bool {
        self.violation.is_some()
    }

    /// The most recent constraint a candidate path broke
    pub fn exceeded_reason(&self) -> Option<ConstraintViolation> {
        self.violation
    }
}
