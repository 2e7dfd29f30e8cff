use crate::config::Config;
use crate::error::{Result, SimError};
use crate::simulation::colony::Colony;
use crate::simulation::Phase;
use crate::terrain::{CellKind, Pos, Terrain};
use crate::utils::format_currency;
use crate::water::WaterField;
use colored::Colorize;
use std::collections::VecDeque;
use std::time::Duration;

/// Top-level game: owns the city, its water, the optimizer and the only RNG,
/// and walks through setup, optimization and defense.
pub struct SimulationEngine {
    config: Config,
    rng: fastrand::Rng,
    terrain: Terrain,
    water: WaterField,
    colony: Option<Colony>,
    phase: Phase,
    pipe_spend: u64,
    survival_ticks: u32,
    water_history: VecDeque<f64>,
}

impl SimulationEngine {
    /// Create a game over a freshly generated city
    pub fn new(config: Config, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let terrain = Terrain::generate(config.grid_size, &mut rng)?;
        Self::assemble(config, terrain, rng)
    }

    /// Create a game over a hand-made city
    pub fn with_terrain(config: Config, terrain: Terrain, seed: u64) -> Result<Self> {
        let config = Config {
            grid_size: terrain.size(),
            ..config
        };
        config.validate()?;
        Self::assemble(config, terrain, fastrand::Rng::with_seed(seed))
    }

    fn assemble(config: Config, terrain: Terrain, rng: fastrand::Rng) -> Result<Self> {
        Ok(Self {
            water: WaterField::new(terrain.size()),
            water_history: VecDeque::with_capacity(config.stabilization_window + 1),
            config,
            rng,
            terrain,
            colony: None,
            phase: Phase::Setup,
            pipe_spend: 0,
            survival_ticks: 0,
        })
    }

    fn require(&self, phase: Phase, op: &'static str) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SimError::WrongPhase {
                op,
                phase: self.phase,
            })
        }
    }

    /// Regenerate the city and return to a fresh setup phase
    pub fn reset(&mut self) -> Result<()> {
        self.terrain = Terrain::generate(self.config.grid_size, &mut self.rng)?;
        self.water = WaterField::new(self.config.grid_size);
        self.restart();
        tracing::info!(target: "flood_aco::engine", size = self.config.grid_size, "engine.reset");
        Ok(())
    }

    /// Keep the city but tear out every drain and pipe and dry it out,
    /// returning to setup from any phase
    pub fn clear_layout(&mut self) {
        let drains = self.terrain.drain_count();
        self.terrain.clear_drains();
        self.water.clear();
        self.restart();
        tracing::info!(target: "flood_aco::engine", drains, "engine.layout.cleared");
    }

    fn restart(&mut self) {
        self.colony = None;
        self.phase = Phase::Setup;
        self.pipe_spend = 0;
        self.survival_ticks = 0;
        self.water_history.clear();
    }

    /// Replace the configuration between runs; a new grid size regenerates the city
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        self.require(Phase::Setup, "set_config")?;
        config.validate()?;
        let regenerate = config.grid_size != self.config.grid_size;
        self.config = config;
        if regenerate {
            self.reset()?;
        }
        Ok(())
    }

    /// Rain intensity may change at any time, including mid-defense
    pub fn set_rain_intensity(&mut self, intensity: f64) -> Result<()> {
        let config = Config {
            rain_intensity: intensity,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Build a drain on an empty or road cell, paying the drain cost
    pub fn place_drain(&mut self, pos: Pos) -> Result<()> {
        self.require(Phase::Setup, "place_drain")?;
        let kind = self.terrain.classify(pos)?;
        if !kind.can_host_drain() {
            return Err(SimError::CellNotBuildable { pos, kind });
        }
        let available = self.remaining_budget();
        if available < self.config.drain_cost {
            return Err(SimError::InsufficientFunds {
                needed: self.config.drain_cost,
                available,
            });
        }

        self.terrain.add_drain(pos)?;
        tracing::debug!(target: "flood_aco::engine", %pos, "engine.drain.placed");
        Ok(())
    }

    /// Remove a drain and refund its cost
    pub fn remove_drain(&mut self, pos: Pos) -> Result<()> {
        self.require(Phase::Setup, "remove_drain")?;
        self.terrain.remove_drain(pos)?;
        tracing::debug!(target: "flood_aco::engine", %pos, "engine.drain.removed");
        Ok(())
    }

    /// Place up to `count` drains on the lowest buildable cells the budget allows
    pub fn auto_place_drains(&mut self, count: usize) -> Result<Vec<Pos>> {
        self.require(Phase::Setup, "auto_place_drains")?;
        let mut sites: Vec<(f64, Pos)> = self
            .terrain
            .cells()
            .enumerate()
            .filter(|(_, kind)| kind.can_host_drain())
            .map(|(pos, _)| (self.terrain.elevation_at(pos), pos))
            .collect();
        sites.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut placed = Vec::with_capacity(count);
        for (_, pos) in sites.into_iter().take(count) {
            match self.place_drain(pos) {
                Ok(()) => placed.push(pos),
                Err(SimError::InsufficientFunds { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(placed)
    }

    /// Start an optimization run with whatever budget the drains left over
    pub fn begin_optimization(&mut self) -> Result<()> {
        self.require(Phase::Setup, "begin_optimization")?;
        let available = self.config.starting_budget.saturating_sub(self.drain_spend());
        let colony = Colony::new(&self.terrain, self.config.colony_params(available))?;

        tracing::info!(
            target: "flood_aco::engine",
            drains = self.terrain.drain_count(),
            pipe_budget = available,
            ants = self.config.ants,
            "engine.optimization.started"
        );
        self.colony = Some(colony);
        self.phase = Phase::Optimizing;
        Ok(())
    }

    /// Abandon the current run and go back to placing drains
    pub fn retry_optimization(&mut self) -> Result<()> {
        self.require(Phase::Optimizing, "retry_optimization")?;
        self.colony = None;
        self.phase = Phase::Setup;
        Ok(())
    }

    fn colony_mut(&mut self, op: &'static str) -> Result<&mut Colony> {
        let phase = self.phase;
        self.colony
            .as_mut()
            .ok_or(SimError::WrongPhase { op, phase })
    }

    /// One logical optimization step: start an iteration if none is running,
    /// otherwise advance every ant and close the iteration when it ends.
    /// Returns whether the colony has converged.
    pub fn tick(&mut self) -> Result<bool> {
        self.require(Phase::Optimizing, "tick")?;
        let colony = self
            .colony
            .as_mut()
            .ok_or(SimError::WrongPhase { op: "tick", phase: Phase::Optimizing })?;

        if colony.is_converged() {
            return Ok(true);
        }
        if !colony.is_iterating() {
            colony.start_iteration(&self.terrain, &mut self.rng)?;
        } else if colony.advance_step(&self.terrain, &mut self.rng) {
            colony.finish_iteration();
        }
        Ok(colony.is_converged())
    }

    /// Run ticks until the current (or next) iteration is finished.
    /// Returns whether the colony has converged.
    pub fn optimize_iteration(&mut self) -> Result<bool> {
        self.require(Phase::Optimizing, "optimize_iteration")?;
        loop {
            let converged = self.tick()?;
            let colony = self.colony_mut("optimize_iteration")?;
            if converged || !colony.is_iterating() {
                return Ok(converged);
            }
        }
    }

    /// Iterate until convergence or `max_iterations`; returns iterations run
    pub fn run_optimization(&mut self, max_iterations: u32) -> Result<u32> {
        let start = self.colony_mut("run_optimization")?.iteration();
        loop {
            let colony = self.colony_mut("run_optimization")?;
            if colony.is_converged() || colony.iteration() - start >= max_iterations {
                return Ok(colony.iteration() - start);
            }
            self.optimize_iteration()?;
        }
    }

    /// Commit the network found so far and let the rain begin
    pub fn begin_defense(&mut self) -> Result<()> {
        self.require(Phase::Optimizing, "begin_defense")?;
        let colony = self.colony_mut("begin_defense")?;
        let pipe_spend = colony.pipe_cost();
        let pipe_length = colony.total_pipe_length();

        self.pipe_spend = pipe_spend;
        self.survival_ticks = 0;
        self.water_history.clear();
        self.phase = Phase::Defending;
        tracing::info!(
            target: "flood_aco::engine",
            pipe_length,
            pipe_cost = pipe_spend,
            total_cost = self.total_cost(),
            "engine.defense.started"
        );
        Ok(())
    }

    /// One rain tick: rain, drain through the committed network, then judge
    pub fn rain_tick(&mut self) -> Result<Phase> {
        self.require(Phase::Defending, "rain_tick")?;
        let colony = self.colony.as_ref().ok_or(SimError::WrongPhase {
            op: "rain_tick",
            phase: Phase::Defending,
        })?;

        self.water
            .rain(&self.terrain, self.config.rain_intensity, &mut self.rng)?;
        self.water.drain(&self.terrain, colony.pipe_cells())?;
        self.survival_ticks += 1;

        let total = self.water.total();
        self.water_history.push_back(total);
        if self.water_history.len() > self.config.stabilization_window {
            self.water_history.pop_front();
        }

        if total > self.config.max_water {
            self.phase = Phase::GameOver;
        } else if self.survival_ticks > self.config.victory_ticks && self.is_water_stable() {
            self.phase = Phase::Victory;
        }
        if self.phase.is_finished() {
            tracing::info!(
                target: "flood_aco::engine",
                phase = %self.phase,
                ticks = self.survival_ticks,
                total_water = total,
                "engine.defense.finished"
            );
        }
        Ok(self.phase)
    }

    /// Rain until the game is decided or `max_ticks` have passed
    pub fn run_defense(&mut self, max_ticks: u32) -> Result<Phase> {
        for _ in 0..max_ticks {
            if self.rain_tick()?.is_finished() {
                break;
            }
        }
        Ok(self.phase)
    }

    /// A full window of total-water samples with variance under the threshold
    pub fn is_water_stable(&self) -> bool {
        let n = self.water_history.len();
        if n < self.config.stabilization_window {
            return false;
        }
        let mean = self.water_history.iter().sum::<f64>() / n as f64;
        let variance = self
            .water_history
            .iter()
            .map(|w| (w - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        variance < self.config.stabilization_variance
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn water(&self) -> &WaterField {
        &self.water
    }

    pub fn colony(&self) -> Option<&Colony> {
        self.colony.as_ref()
    }

    pub fn survival_ticks(&self) -> u32 {
        self.survival_ticks
    }

    /// Every drain on the map at the current drain cost, including any
    /// that came with a hand-made city
    pub fn drain_spend(&self) -> u64 {
        (self.terrain.drain_count() as u64).saturating_mul(self.config.drain_cost)
    }

    pub fn pipe_spend(&self) -> u64 {
        self.pipe_spend
    }

    /// Drains plus committed pipes
    pub fn total_cost(&self) -> u64 {
        self.drain_spend().saturating_add(self.pipe_spend)
    }

    pub fn remaining_budget(&self) -> u64 {
        self.config.starting_budget.saturating_sub(self.total_cost())
    }

    /// Print the end-of-run summary
    pub fn print_summary(&self, elapsed: Duration) {
        let colony = self.colony.as_ref();
        let iterations = colony.map_or(0, Colony::iteration);
        let paths = colony.map_or(0, |c| c.accepted_paths().len());
        let pipe_length = colony.map_or(0, Colony::total_pipe_length);
        let efficiency = colony.map_or(f64::INFINITY, Colony::best_efficiency);
        let stagnation = colony.map_or(0, Colony::stagnation);
        let reason = colony
            .and_then(Colony::exceeded_reason)
            .map_or("none".to_string(), |r| r.to_string());

        let phase = match self.phase {
            Phase::Victory => self.phase.as_str().to_uppercase().green().bold(),
            Phase::GameOver => self.phase.as_str().to_uppercase().red().bold(),
            _ => self.phase.as_str().to_uppercase().yellow().bold(),
        };

        println!(
            "\n{}\n{} {} {} {:.3} ms",
            "===".bright_blue().bold(),
            "🌧️  Outcome:".green().bold(),
            phase,
            "|".dimmed(),
            elapsed.as_secs_f64() * 1000.0,
        );
        println!(
            "{} {} {} {} {}",
            format!("drains={}", self.terrain.drain_count()).cyan(),
            format!("houses={}", self.terrain.count(CellKind::House)).cyan(),
            format!("paths={paths}").cyan(),
            format!("pipe_length={pipe_length}").cyan(),
            format!("iterations={iterations}").cyan(),
        );
        println!(
            "{} {} {}",
            format!("efficiency={efficiency:.2}").cyan(),
            format!("stagnation={stagnation}").cyan(),
            format!("exceeded={reason}").cyan(),
        );
        println!(
            "{} {} {} {}",
            format!("spent={}", format_currency(self.total_cost())).cyan(),
            format!("remaining={}", format_currency(self.remaining_budget())).cyan(),
            format!("water={:.1}", self.water.total()).cyan(),
            format!("ticks={}", self.survival_ticks).cyan(),
        );
    }
}
