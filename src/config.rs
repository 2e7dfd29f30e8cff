use crate::error::{Result, SimError};

pub const DEFAULT_GRID_SIZE: usize = 15;
/// Currency amounts are whole pesos
pub const DEFAULT_BUDGET: u64 = 1_000_000_000;
pub const DRAIN_COST: u64 = 200_000_000;
pub const PIPE_COST_PER_CELL: u64 = 10_000_000;
pub const MAX_TOTAL_PIPE_LENGTH: usize = 500;

pub const DEFAULT_NUM_ANTS: usize = 20;
pub const DEFAULT_EVAPORATION_RATE: f64 = 0.15;
pub const DEFAULT_PHEROMONE_STRENGTH: f64 = 2.0;
pub const ACO_ALPHA: f64 = 1.0;
pub const ACO_BETA: f64 = 2.0;
/// Step ceiling for one optimization iteration
pub const ACO_MAX_STEPS: u32 = 150;
/// Iterations without an efficiency improvement before the colony converges
pub const CONVERGENCE_THRESHOLD: u32 = 20;

pub const RAIN_INTENSITY_DEFAULT: f64 = 0.6;
/// Total water above which the city floods
pub const MAX_WATER_THRESHOLD: f64 = 5000.0;
/// Rain ticks the network has to hold out for
pub const VICTORY_TICKS: u32 = 1200;
pub const STABILIZATION_WINDOW: usize = 60;
pub const STABILIZATION_VARIANCE: f64 = 1000.0;

/// Every tunable of one game, from city generation to the defense phase
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub grid_size: usize,
    pub starting_budget: u64,
    pub drain_cost: u64,
    pub pipe_cost_per_cell: u64,
    pub max_pipe_length: usize,
    pub ants: usize,
    pub alpha: f64,
    pub beta: f64,
    pub evaporation_rate: f64,
    pub pheromone_strength: f64,
    pub max_steps: u32,
    pub convergence_threshold: u32,
    pub rain_intensity: f64,
    pub max_water: f64,
    pub victory_ticks: u32,
    pub stabilization_window: usize,
    pub stabilization_variance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            starting_budget: DEFAULT_BUDGET,
            drain_cost: DRAIN_COST,
            pipe_cost_per_cell: PIPE_COST_PER_CELL,
            max_pipe_length: MAX_TOTAL_PIPE_LENGTH,
            ants: DEFAULT_NUM_ANTS,
            alpha: ACO_ALPHA,
            beta: ACO_BETA,
            evaporation_rate: DEFAULT_EVAPORATION_RATE,
            pheromone_strength: DEFAULT_PHEROMONE_STRENGTH,
            max_steps: ACO_MAX_STEPS,
            convergence_threshold: CONVERGENCE_THRESHOLD,
            rain_intensity: RAIN_INTENSITY_DEFAULT,
            max_water: MAX_WATER_THRESHOLD,
            victory_ticks: VICTORY_TICKS,
            stabilization_window: STABILIZATION_WINDOW,
            stabilization_variance: STABILIZATION_VARIANCE,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return invalid("grid size must be positive");
        }
        if self.stabilization_window == 0 {
            return invalid("stabilization window must be positive");
        }
        non_negative("rain intensity", self.rain_intensity)?;
        non_negative("flood threshold", self.max_water)?;
        non_negative("stabilization variance", self.stabilization_variance)?;
        self.colony_params(self.starting_budget).validate()
    }

    /// Colony parameters for a run with `available_budget` left for pipes
    pub fn colony_params(&self, available_budget: u64) -> ColonyParams {
        ColonyParams {
            ants: self.ants,
            evaporation_rate: self.evaporation_rate,
            pheromone_strength: self.pheromone_strength,
            alpha: self.alpha,
            beta: self.beta,
            available_budget,
            pipe_cost_per_cell: self.pipe_cost_per_cell,
            max_pipe_length: self.max_pipe_length,
            max_steps: self.max_steps,
            convergence_threshold: self.convergence_threshold,
        }
    }
}

/// Parameters of one optimization run
#[derive(Clone, Debug, PartialEq)]
pub struct ColonyParams {
    pub ants: usize,
    pub evaporation_rate: f64,
    pub pheromone_strength: f64,
    pub alpha: f64,
    pub beta: f64,
    pub available_budget: u64,
    pub pipe_cost_per_cell: u64,
    pub max_pipe_length: usize,
    pub max_steps: u32,
    pub convergence_threshold: u32,
}

impl Default for ColonyParams {
    fn default() -> Self {
        Config::default().colony_params(DEFAULT_BUDGET - DRAIN_COST)
    }
}

impl ColonyParams {
    pub fn validate(&self) -> Result<()> {
        if self.ants == 0 {
            return invalid("ant count must be positive");
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return invalid(format!(
                "evaporation rate {} is outside [0, 1]",
                self.evaporation_rate
            ));
        }
        non_negative("alpha", self.alpha)?;
        non_negative("beta", self.beta)?;
        non_negative("pheromone strength", self.pheromone_strength)?;
        if self.max_steps == 0 {
            return invalid("step ceiling must be positive");
        }
        if self.convergence_threshold == 0 {
            return invalid("stagnation threshold must be positive");
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<()> {
    Err(SimError::InvalidConfig(msg.into()))
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be a non-negative number, got {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
        assert!(ColonyParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_ants_and_grid() {
        let cfg = Config {
            ants: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));

        let cfg = Config {
            grid_size: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_evaporation_range() {
        for rate in [-0.01, 1.01, f64::NAN] {
            let params = ColonyParams {
                evaporation_rate: rate,
                ..ColonyParams::default()
            };
            assert!(params.validate().is_err(), "rate {rate} accepted");
        }
        for rate in [0.0, 0.5, 1.0] {
            let params = ColonyParams {
                evaporation_rate: rate,
                ..ColonyParams::default()
            };
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn test_zero_rain_is_allowed() {
        let cfg = Config {
            rain_intensity: 0.0,
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());

        let cfg = Config {
            rain_intensity: -1.0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_colony_params_carry_budget() {
        let params = Config::default().colony_params(42);
        assert_eq!(params.available_budget, 42);
        assert_eq!(params.ants, DEFAULT_NUM_ANTS);
    }
}
