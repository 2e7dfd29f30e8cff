use crate::config::{self, Config};
use crate::terrain::{parse_pos, Pos};
use clap::Parser;

/// CLI arguments for a headless flood-control run
#[derive(Parser, Debug)]
#[command(
    name = "flood_aco",
    about = "🌧️  Ant-colony drainage planner for a flooding city"
)]
pub struct Args {
    /// Grid side length
    #[arg(long, default_value_t = config::DEFAULT_GRID_SIZE)]
    pub size: usize,

    /// Starting budget in pesos
    #[arg(long, default_value_t = config::DEFAULT_BUDGET)]
    pub budget: u64,

    /// Cost of one drain
    #[arg(long, default_value_t = config::DRAIN_COST)]
    pub drain_cost: u64,

    /// Cost of one pipe cell
    #[arg(long, default_value_t = config::PIPE_COST_PER_CELL)]
    pub pipe_cost: u64,

    /// Maximum total pipe length in cells
    #[arg(long, default_value_t = config::MAX_TOTAL_PIPE_LENGTH)]
    pub max_pipe_length: usize,

    /// Number of ants per iteration
    #[arg(short = 'n', long = "ants", default_value_t = config::DEFAULT_NUM_ANTS)]
    pub ants: usize,

    /// Pheromone importance
    #[arg(long, default_value_t = config::ACO_ALPHA)]
    pub alpha: f64,

    /// Heuristic importance
    #[arg(long, default_value_t = config::ACO_BETA)]
    pub beta: f64,

    /// Pheromone evaporation rate in [0, 1]
    #[arg(long, default_value_t = config::DEFAULT_EVAPORATION_RATE)]
    pub evaporation: f64,

    /// Pheromone deposit strength
    #[arg(long, default_value_t = config::DEFAULT_PHEROMONE_STRENGTH)]
    pub strength: f64,

    /// Rain added per tick
    #[arg(long, default_value_t = config::RAIN_INTENSITY_DEFAULT)]
    pub rain: f64,

    /// Drain position as `row,col` (repeatable)
    #[arg(short = 'd', long = "drain", value_parser = parse_pos)]
    pub drains: Vec<Pos>,

    /// File with one `row col` drain position per line
    #[arg(short = 'p', long = "drain-plan")]
    pub drain_plan: Option<String>,

    /// Drains placed on the lowest cells when none are given explicitly
    #[arg(long, default_value_t = 3)]
    pub auto_drains: usize,

    /// Iteration cap for the optimizer
    #[arg(long, default_value_t = 200)]
    pub max_iterations: u32,

    /// Rain ticks to simulate after optimization
    #[arg(long, default_value_t = 1500)]
    pub defend_ticks: u32,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Suppress per-iteration logs (for benchmarks)
    #[arg(long, default_value_t = false)]
    pub suppress_events: bool,
}

impl Args {
    /// Game configuration described by these flags
    pub fn to_config(&self) -> Config {
        Config {
            grid_size: self.size,
            starting_budget: self.budget,
            drain_cost: self.drain_cost,
            pipe_cost_per_cell: self.pipe_cost,
            max_pipe_length: self.max_pipe_length,
            ants: self.ants,
            alpha: self.alpha,
            beta: self.beta,
            evaporation_rate: self.evaporation,
            pheromone_strength: self.strength,
            rain_intensity: self.rain,
            ..Config::default()
        }
    }
}
