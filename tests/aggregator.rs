use async_trait::async_trait;
use ga_search::cache::ResponseCache;
use ga_search::config::{LimitPolicy, SourceSettings};
use ga_search::network::HttpClient;
use ga_search::results::SourceError;
use ga_search::{
    AdditionalSource, Aggregator, Feature, HistoryEntry, HistoryStore, SearchParameters,
    SuggestionItem, SuggestionSet,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collection(labels: &[&str]) -> Value {
    let features: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(id, label)| {
            json!({
                "type": "Feature",
                "id": id,
                "properties": {"label": label},
                "geometry": {"type": "Point", "coordinates": [7.44, 46.95]}
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

async fn mount_geoadmin(server: &MockServer, search_type: &str, labels: &[&str], delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path("/SearchServer"))
        .and(query_param("type", search_type))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(collection(labels))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

fn endpoints(server: &MockServer) -> SourceSettings {
    SourceSettings {
        geoadmin_url: format!("{}/SearchServer", server.uri()),
        photon_url: format!("{}/api", server.uri()),
    }
}

fn aggregator(server: &MockServer) -> Aggregator {
    Aggregator::new(
        HttpClient::new().unwrap(),
        endpoints(server),
        Arc::new(HistoryStore::in_memory(10)),
    )
}

fn labels(set: &SuggestionSet) -> Vec<String> {
    set.items()
        .iter()
        .map(|item| match item {
            SuggestionItem::Remote { feature, .. } => feature.label().to_string(),
            SuggestionItem::History(entry) => entry.key.clone(),
            SuggestionItem::Additional { result } => result["name"].as_str().unwrap().to_string(),
        })
        .collect()
}

struct StaticSource {
    names: Vec<&'static str>,
    fail: bool,
}

#[async_trait]
impl AdditionalSource for StaticSource {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Value>> {
        if self.fail {
            anyhow::bail!("backend for '{}' is down", query);
        }
        Ok(self.names.iter().map(|name| json!({"name": name})).collect())
    }

    fn result_value(&self, result: &Value) -> String {
        result["name"].as_str().unwrap_or_default().to_string()
    }
}

#[tokio::test]
async fn merge_follows_configured_order_not_completion_order() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A", "B"], 50).await;
    mount_geoadmin(&server, "layers", &["C"], 10).await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default().with_types(["location", "layer"]);
    let set = aggregator.suggest("bern", &params).await;
    assert_eq!(labels(&set), vec!["A", "B", "C"]);

    let params = SearchParameters::default().with_types(["layer", "location"]);
    let set = aggregator.suggest("bern", &params).await;
    assert_eq!(labels(&set), vec!["C", "A", "B"]);
}

#[tokio::test]
async fn failing_source_contributes_nothing() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A", "B"], 0).await;
    Mock::given(method("GET"))
        .and(path("/SearchServer"))
        .and(query_param("type", "layers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default().with_types(["layer", "location"]);
    let set = aggregator.suggest("bern", &params).await;

    assert_eq!(labels(&set), vec!["A", "B"]);
    assert_eq!(set.failures().len(), 1);
    assert_eq!(set.failures()[0].source, "layer");
    assert_eq!(set.failures()[0].error, SourceError::Http(500));
    assert_eq!(set.timings().len(), 1);
}

#[tokio::test]
async fn short_input_is_answered_from_history_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(&["remote"])))
        .expect(0)
        .mount(&server)
        .await;

    let history = Arc::new(HistoryStore::in_memory(10));
    for label in ["Bern", "Thun", "Oberhofen"] {
        history.add(HistoryEntry::new(
            label,
            SuggestionItem::remote("location", Feature::with_label(label)),
        ));
    }
    let aggregator = Aggregator::new(HttpClient::new().unwrap(), endpoints(&server), history);
    let params = SearchParameters::default()
        .with_min_length(3)
        .with_types(["location", "layer"]);

    let set = aggregator.suggest("BE", &params).await;
    assert!(set.is_from_history());
    assert_eq!(labels(&set), vec!["Oberhofen", "Bern"]);

    let set = aggregator.suggest("", &params).await;
    assert_eq!(labels(&set), vec!["Oberhofen", "Thun", "Bern"]);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn request_carries_encoded_query_and_primary_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/SearchServer"))
        .and(query_param("searchText", "Zürich & co"))
        .and(query_param("lang", "fr"))
        .and(query_param("sr", "4326"))
        .and(query_param("limit", "15"))
        .and(query_param("origins", "zipcode,gg25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(&["Zürich"])))
        .expect(1)
        .mount(&server)
        .await;
    let aggregator = aggregator(&server);

    let mut params = SearchParameters::default();
    params.host_lang = "fr-CH".to_string();
    let set = aggregator.suggest("Zürich & co", &params).await;

    assert_eq!(labels(&set), vec!["Zürich"]);
}

#[tokio::test]
async fn filter_and_merged_limit_apply_to_final_list() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A", "B", "skip"], 0).await;
    mount_geoadmin(&server, "layers", &["C", "D"], 0).await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default()
        .with_types(["location", "layer"])
        .with_filter(|item| match item {
            SuggestionItem::Remote { feature, .. } => feature.label() != "skip",
            _ => true,
        });
    let set = aggregator.suggest("x", &params).await;
    assert_eq!(labels(&set), vec!["A", "B", "C", "D"]);

    let params = params.with_limit(3, LimitPolicy::Merged);
    let set = aggregator.suggest("x", &params).await;
    assert_eq!(labels(&set), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn default_limit_truncates_merged_list_in_source_order() {
    let server = MockServer::start().await;
    let many: Vec<String> = (0..15).map(|n| format!("L{}", n)).collect();
    let many: Vec<&str> = many.iter().map(String::as_str).collect();
    mount_geoadmin(&server, "locations", &many, 0).await;
    let aggregator = aggregator(&server);
    let custom = Arc::new(StaticSource {
        names: vec!["X"; 15],
        fail: false,
    });

    let params = SearchParameters::default().with_additional_source(custom.clone());
    assert_eq!(params.limit, 15);
    let set = aggregator.suggest("bern", &params).await;

    assert_eq!(set.len(), 15);
    assert!(set
        .items()
        .iter()
        .all(|item| matches!(item, SuggestionItem::Additional { .. })));

    let params = SearchParameters::default()
        .with_additional_source(custom)
        .with_limit(15, LimitPolicy::PerSource);
    let set = aggregator.suggest("bern", &params).await;
    assert_eq!(set.len(), 30);
}

#[tokio::test]
async fn slow_source_times_out() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A"], 0).await;
    mount_geoadmin(&server, "layers", &["late"], 2_000).await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default()
        .with_types(["layer", "location"])
        .with_source_timeout(Duration::from_millis(200));
    let set = aggregator.suggest("bern", &params).await;

    assert_eq!(labels(&set), vec!["A"]);
    assert_eq!(set.failures()[0].error, SourceError::Timeout);
}

#[tokio::test]
async fn additional_source_merges_at_its_position() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A"], 30).await;
    mount_geoadmin(&server, "layers", &["C"], 0).await;
    let aggregator = aggregator(&server);
    let custom = Arc::new(StaticSource {
        names: vec!["X", "Y"],
        fail: false,
    });

    let params = SearchParameters::default()
        .with_types(["location", "additionalSource", "layer"])
        .with_additional_source(custom.clone());
    let set = aggregator.suggest("bern", &params).await;
    assert_eq!(labels(&set), vec!["A", "X", "Y", "C"]);
    assert!(matches!(set.items()[1], SuggestionItem::Additional { .. }));

    let params = SearchParameters::default()
        .with_types(["location", "layer"])
        .with_additional_source(custom);
    let set = aggregator.suggest("bern", &params).await;
    assert_eq!(labels(&set), vec!["X", "Y", "A", "C"]);
}

#[tokio::test]
async fn failing_additional_source_degrades() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A"], 0).await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default()
        .with_types(["additionalSource", "location"])
        .with_additional_source(Arc::new(StaticSource {
            names: vec![],
            fail: true,
        }));
    let set = aggregator.suggest("bern", &params).await;

    assert_eq!(labels(&set), vec!["A"]);
    assert!(matches!(set.failures()[0].error, SourceError::Caller(_)));
}

#[tokio::test]
async fn feature_source_without_layers_is_not_queried() {
    let server = MockServer::start().await;
    mount_geoadmin(&server, "locations", &["A"], 0).await;
    Mock::given(method("GET"))
        .and(query_param("type", "featuresearch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(&["F"])))
        .expect(0)
        .mount(&server)
        .await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default().with_types(["feature", "location"]);
    let set = aggregator.suggest("bern", &params).await;

    assert_eq!(labels(&set), vec!["A"]);
    assert!(set.failures().is_empty());
}

#[tokio::test]
async fn cached_responses_are_reused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/SearchServer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(&["A"])))
        .expect(1)
        .mount(&server)
        .await;
    let aggregator = aggregator(&server).with_cache(Some(ResponseCache::default()));
    let params = SearchParameters::default();

    assert_eq!(labels(&aggregator.suggest("bern", &params).await), vec!["A"]);
    assert_eq!(labels(&aggregator.suggest("bern", &params).await), vec!["A"]);
}

#[tokio::test]
async fn cleared_cache_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/SearchServer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(&["A"])))
        .expect(2)
        .mount(&server)
        .await;
    let uncached = aggregator(&server);
    let aggregator = aggregator(&server).with_cache(Some(ResponseCache::default()));
    let params = SearchParameters::default();

    aggregator.suggest("bern", &params).await;
    aggregator.clear_cache();
    assert_eq!(labels(&aggregator.suggest("bern", &params).await), vec!["A"]);
    assert_eq!(uncached.clear_cache(), 0);
}

#[tokio::test]
async fn photon_sends_language_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(header("accept-language", "it"))
        .and(query_param("lang", "it"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"features": []})))
        .expect(1)
        .mount(&server)
        .await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default()
        .with_types(["photon"])
        .with_lang("it-CH");
    let set = aggregator.suggest("Lugano", &params).await;

    assert!(set.is_empty());
    assert!(set.failures().is_empty());
}

#[tokio::test]
async fn photon_results_are_labelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("q", "Bundesplatz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [7.44, 46.94]},
                "properties": {"name": "Bundesplatz", "postcode": "3011", "city": "Bern", "country": "Schweiz"}
            }]
        })))
        .mount(&server)
        .await;
    let aggregator = aggregator(&server);

    let params = SearchParameters::default().with_types(["photon"]);
    let set = aggregator.suggest("Bundesplatz", &params).await;

    assert_eq!(labels(&set), vec!["<b>Bundesplatz</b> <i>3011 Bern, Schweiz</i>"]);
    assert_eq!(set.items()[0].source(), "photon");
}
