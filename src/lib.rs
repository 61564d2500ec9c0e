pub mod config;
pub mod constants;
pub mod dates;
pub mod domain;
pub mod engine;
pub mod error;
pub mod facets;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod tags;
pub mod taxonomy;

// Ports for external collaborators and their adapters
pub mod app;
pub mod infra;

pub use engine::{FacetEngine, Snapshot};
pub use error::{FacetError, Result};
pub use facets::{Facet, FacetOptions, FilterState};
