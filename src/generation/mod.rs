pub mod normalize;
pub mod params;
mod service;
mod types;

pub use service::GenerationService;
pub use types::*;
