//! Search source module
//!
//! Defines the source traits, the built-in backend protocols and the loader
//! that turns the configured source list into adapters.

mod loader;
mod registry;
mod traits;

// Backend protocols
pub mod geoadmin;
pub mod photon;

pub use geoadmin::{GeoAdmin, GeoAdminSearch};
pub use loader::SourceLoader;
pub use photon::Photon;
pub use registry::SourceRegistry;
pub use traits::*;

/// geo.admin.ch location search
pub const LOCATION: &str = "location";
/// geo.admin.ch layer search
pub const LAYER: &str = "layer";
/// geo.admin.ch feature search over configured layers
pub const FEATURE: &str = "feature";
/// Photon geocoder
pub const PHOTON: &str = "photon";
/// Source supplied by the host application
pub const ADDITIONAL_SOURCE: &str = "additionalSource";
