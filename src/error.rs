//! Simulation error types

/// Errors surfaced by the simulation core
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Scoring ran on a round where not every player has a finishing place
    #[error("death order has {actual} entries, expected one per player ({expected})")]
    IncompleteDeathOrder { expected: usize, actual: usize },
    #[error("unknown player slot: {0}")]
    UnknownPlayer(usize),
    #[error("invalid roster: {0}")]
    Roster(String),
    #[error("snapshot error: {0}")]
    Snapshot(#[source] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[source] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
