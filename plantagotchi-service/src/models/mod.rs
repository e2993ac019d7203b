pub mod question;
pub mod species;

pub use question::{PlantClassification, PlantQuestion};
pub use species::{PlantType, SpeciesInfo, SpeciesQuery, SpeciesResponse, FALLBACK_NOTE};
