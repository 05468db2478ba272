pub mod config;
pub mod engine;
pub mod sort;
pub mod validation;

pub use config::WeightConfig;
pub use engine::{reverse_index, score, LocationHit, ScoreReport, ScoredSpecies, UNSCORED};
pub use sort::{SortKey, SortOrder};
pub use validation::validate_weights;
