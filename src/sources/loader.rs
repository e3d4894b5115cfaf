//! Source loader: resolves the configured source list into adapters

use super::geoadmin::GeoAdmin;
use super::photon::Photon;
use super::registry::SourceRegistry;
use super::traits::SourceAdapter;
use super::{ADDITIONAL_SOURCE, FEATURE, LAYER, LOCATION, PHOTON};
use crate::config::SourceSettings;
use crate::search::SearchParameters;
use std::sync::Arc;
use tracing::{debug, warn};

/// Loader for building the enabled sources from parameters
pub struct SourceLoader;

impl SourceLoader {
    /// Resolve the configured source list, in order
    ///
    /// Misconfigured and unknown sources are skipped. A supplied additional
    /// source that is not listed merges first.
    pub fn resolve(params: &SearchParameters, endpoints: &SourceSettings) -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        let mut additional_listed = false;

        for id in &params.types {
            if id == ADDITIONAL_SOURCE {
                additional_listed = true;
            }
            if let Some(source) = Self::create_source(id, params, endpoints) {
                registry.register(source);
            }
        }

        if !additional_listed {
            if let Some(ref additional) = params.additional_source {
                registry.insert(0, SourceAdapter::Additional(additional.clone()));
            }
        }

        registry
    }

    /// Create a source by identifier
    fn create_source(
        id: &str,
        params: &SearchParameters,
        endpoints: &SourceSettings,
    ) -> Option<SourceAdapter> {
        let source = match id {
            LOCATION => SourceAdapter::Remote(Arc::new(GeoAdmin::locations(
                &endpoints.geoadmin_url,
                &params.location_origins,
            ))),
            LAYER => SourceAdapter::Remote(Arc::new(GeoAdmin::layers(&endpoints.geoadmin_url))),
            FEATURE => match params.feature_layers.as_deref().map(str::trim) {
                Some(layers) if !layers.is_empty() => SourceAdapter::Remote(Arc::new(
                    GeoAdmin::features(&endpoints.geoadmin_url, layers),
                )),
                _ => {
                    debug!("Skipping feature source: no feature layers configured");
                    return None;
                }
            },
            PHOTON => SourceAdapter::Remote(Arc::new(Photon::new(&endpoints.photon_url))),
            ADDITIONAL_SOURCE => match params.additional_source {
                Some(ref additional) => SourceAdapter::Additional(additional.clone()),
                None => {
                    debug!("Skipping additional source: none supplied");
                    return None;
                }
            },
            unknown => {
                warn!(
                    "Skipping unknown source: {} (available: {})",
                    unknown,
                    Self::available_sources().join(", ")
                );
                return None;
            }
        };

        Some(source)
    }

    /// Get list of available source identifiers
    pub fn available_sources() -> Vec<&'static str> {
        vec![LOCATION, LAYER, FEATURE, PHOTON, ADDITIONAL_SOURCE]
    }
}
