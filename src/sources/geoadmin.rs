//! geo.admin.ch SearchServer sources
//!
//! One endpoint serves three search types: locations (addresses, zip codes,
//! municipalities, ...), map layers, and features of selected layers.

use super::traits::*;
use crate::results::{FeatureCollection, SourceError, SuggestionItem};

/// The three SearchServer search types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoAdminSearch {
    /// `type=locations`, restricted to comma separated origins
    Locations { origins: String },
    /// `type=layers`
    Layers,
    /// `type=featuresearch`, over comma separated layer ids
    Features { layers: String },
}

/// SearchServer source for one search type
#[derive(Debug, Clone)]
pub struct GeoAdmin {
    name: &'static str,
    search: GeoAdminSearch,
    api_url: String,
}

impl GeoAdmin {
    pub fn new(api_url: impl Into<String>, search: GeoAdminSearch) -> Self {
        let name = match search {
            GeoAdminSearch::Locations { .. } => super::LOCATION,
            GeoAdminSearch::Layers => super::LAYER,
            GeoAdminSearch::Features { .. } => super::FEATURE,
        };
        Self {
            name,
            search,
            api_url: api_url.into(),
        }
    }

    pub fn locations(api_url: impl Into<String>, origins: impl Into<String>) -> Self {
        Self::new(
            api_url,
            GeoAdminSearch::Locations {
                origins: origins.into(),
            },
        )
    }

    pub fn layers(api_url: impl Into<String>) -> Self {
        Self::new(api_url, GeoAdminSearch::Layers)
    }

    pub fn features(api_url: impl Into<String>, layers: impl Into<String>) -> Self {
        Self::new(
            api_url,
            GeoAdminSearch::Features {
                layers: layers.into(),
            },
        )
    }
}

impl RemoteSource for GeoAdmin {
    fn name(&self) -> &str {
        self.name
    }

    fn request(&self, params: &RequestParams) -> Result<SourceRequest, SourceError> {
        let request = SourceRequest::get(&self.api_url)
            .param("geometryFormat", "geojson")
            .param("sr", &params.sr)
            .param("lang", &params.lang)
            .param("limit", params.limit)
            .param("searchText", &params.query);

        let request = match self.search {
            GeoAdminSearch::Locations { ref origins } => {
                request.param("type", "locations").param("origins", origins)
            }
            GeoAdminSearch::Layers => request.param("type", "layers"),
            GeoAdminSearch::Features { ref layers } => {
                if layers.trim().is_empty() {
                    return Err(SourceError::Config("feature search without layers".to_string()));
                }
                request.param("type", "featuresearch").param("features", layers)
            }
        };

        Ok(request)
    }

    fn response(&self, response: SourceResponse) -> Result<Vec<SuggestionItem>, SourceError> {
        let collection: FeatureCollection = response.error_for_status()?.json()?;

        Ok(collection
            .features
            .into_iter()
            .map(|feature| SuggestionItem::remote(self.name, feature))
            .collect())
    }
}
