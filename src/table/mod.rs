pub mod loader;
pub mod model;

pub use loader::{load_curated, load_survey};
pub use model::{clean_species_name, CuratedTable, SpeciesRow, SurveyTable};
