//! Photon geocoder source (https://photon.komoot.io)
//!
//! Photon answers with plain GeoJSON features that carry address parts but
//! no display label, so a label is synthesized from those parts.

use super::traits::*;
use crate::results::{Feature, SourceError, SuggestionItem};
use serde_json::{Map, Value};

/// Languages Photon localizes results for
const SUPPORTED_LANGS: &[&str] = &["de", "en", "fr", "it"];

/// Photon geocoding source
#[derive(Debug, Clone)]
pub struct Photon {
    api_url: String,
}

impl Photon {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    /// `<b>name</b>` followed by an italic hint with the place context
    fn label_for(properties: &Map<String, Value>) -> Option<String> {
        let text = |key: &str| {
            properties
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let name = match (text("name"), text("street")) {
            (Some(name), _) => name.to_string(),
            (None, Some(street)) => match text("housenumber") {
                Some(number) => format!("{} {}", street, number),
                None => street.to_string(),
            },
            (None, None) => return None,
        };

        let locality = match (text("postcode"), text("city")) {
            (Some(postcode), Some(city)) => Some(format!("{} {}", postcode, city)),
            (postcode, city) => city.or(postcode).map(String::from),
        };
        let context: Vec<String> = locality
            .into_iter()
            .chain(text("state").map(String::from))
            .chain(text("country").map(String::from))
            .filter(|part| *part != name)
            .collect();

        if context.is_empty() {
            Some(format!("<b>{}</b>", name))
        } else {
            Some(format!("<b>{}</b> <i>{}</i>", name, context.join(", ")))
        }
    }
}

impl RemoteSource for Photon {
    fn name(&self) -> &str {
        super::PHOTON
    }

    fn request(&self, params: &RequestParams) -> Result<SourceRequest, SourceError> {
        let mut request = SourceRequest::get(&self.api_url)
            .param("q", &params.query)
            .param("limit", params.limit);

        // Photon rejects languages it does not know as a parameter but
        // falls back to the default for an unknown Accept-Language
        if SUPPORTED_LANGS.contains(&params.lang.as_str()) {
            request = request.param("lang", &params.lang);
        }
        request = request.header("Accept-Language", &params.lang);

        Ok(request)
    }

    fn response(&self, response: SourceResponse) -> Result<Vec<SuggestionItem>, SourceError> {
        let json: Value = response.error_for_status()?.json()?;

        let features = match json.get("features").and_then(|f| f.as_array()) {
            Some(features) => features,
            None => return Ok(Vec::new()),
        };

        let mut items = Vec::with_capacity(features.len());
        for raw in features {
            let mut raw = raw.clone();
            let Some(properties) = raw.get_mut("properties").and_then(|p| p.as_object_mut()) else {
                continue;
            };
            let Some(label) = Self::label_for(properties) else {
                continue;
            };
            properties.insert("label".to_string(), Value::String(label));

            let feature: Feature =
                serde_json::from_value(raw).map_err(|e| SourceError::Parse(e.to_string()))?;
            items.push(SuggestionItem::remote(self.name(), feature));
        }

        Ok(items)
    }
}
