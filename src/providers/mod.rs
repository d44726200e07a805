//! Geocoding provider implementations

pub mod geoapifr;

// Re-export providers for convenience
pub use geoapifr::{GeoApiFrConfig, GeoApiFrProvider};
