use crate::simulation::Phase;
use crate::terrain::{CellKind, Pos};

/// Error types for the flood-control simulation
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A construction parameter is out of its allowed range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A query touched a position outside the grid
    #[error("position {pos} is outside the {size}x{size} grid")]
    OutOfBounds { pos: Pos, size: usize },

    /// Drains may only be built on empty or road cells
    #[error("cannot build a drain at {pos}: cell is {kind}")]
    CellNotBuildable { pos: Pos, kind: CellKind },

    #[error("no drain at {0}")]
    NoDrainAt(Pos),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// The requested operation is not valid in the current game phase
    #[error("operation `{op}` is not allowed during the {phase} phase")]
    WrongPhase { op: &'static str, phase: Phase },

    /// A converged colony is terminal; start a new run instead
    #[error("colony has already converged")]
    ColonyConverged,

    #[error("no cell is available for an ant to start on")]
    NoStartCell,

    /// IO operation failed while reading a drain plan
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed line in a drain plan
    #[error("invalid line {line}: {msg}")]
    InvalidLine { line: usize, msg: String },
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, SimError>;
