//! Suggestion controller
//!
//! Binds raw input to the aggregator and selections to the history store.
//! The host pushes every input change through [`SuggestionController::input`]
//! and receives rendered lists and submissions through the registered
//! handlers; no rendering surface is required.
//!
//! Two counters keep the displayed list consistent with what the user typed:
//! the keystroke generation collapses bursts of input into one search once
//! the debounce interval elapses, and the invocation sequence makes sure a
//! slow invocation never replaces the list of a newer one.

use crate::highlight::{extract_value, highlight};
use crate::history::{HistoryEntry, HistoryStore};
use crate::results::SuggestionItem;
use crate::search::{Aggregator, SearchParameters};
use crate::sources::AdditionalSource;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Observer of submissions
pub type SubmitHandler = Arc<dyn Fn(&SubmitEvent) + Send + Sync>;

/// Observer of displayed lists, called with the query and its suggestions
pub type ResultsHandler = Arc<dyn Fn(&str, &[RenderedSuggestion]) + Send + Sync>;

/// Notification fired once per confirmed selection
#[derive(Debug)]
pub struct SubmitEvent {
    /// Payload of the selection, without source or history tagging
    pub result: Value,
    /// Display label of the selection
    pub label: String,
    /// The selected item, without history wrapping
    pub item: SuggestionItem,
    default_prevented: AtomicBool,
}

impl SubmitEvent {
    /// Keep this selection out of the history
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::Relaxed);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }
}

/// A suggestion ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSuggestion {
    /// Highlighted label, passed through the custom renderer if any
    pub html: String,
    /// Plain value for the input field
    pub value: String,
    pub item: SuggestionItem,
}

#[derive(Default)]
struct Displayed {
    seq: u64,
    query: String,
    suggestions: Vec<RenderedSuggestion>,
}

struct Inner {
    aggregator: Aggregator,
    params: RwLock<SearchParameters>,
    /// Generation of the latest input
    keystrokes: AtomicU64,
    /// Sequence number of the latest issued invocation
    issued: AtomicU64,
    displayed: Mutex<Displayed>,
    submit_handlers: RwLock<Vec<SubmitHandler>>,
    results_handlers: RwLock<Vec<ResultsHandler>>,
}

/// Debounced, last-query-wins front of the aggregator
#[derive(Clone)]
pub struct SuggestionController {
    inner: Arc<Inner>,
}

impl SuggestionController {
    pub fn new(aggregator: Aggregator, params: SearchParameters) -> Self {
        aggregator.history().set_capacity(params.history_capacity);

        Self {
            inner: Arc::new(Inner {
                aggregator,
                params: RwLock::new(params),
                keystrokes: AtomicU64::new(0),
                issued: AtomicU64::new(0),
                displayed: Mutex::new(Displayed::default()),
                submit_handlers: RwLock::new(Vec::new()),
                results_handlers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Snapshot of the live parameters
    pub fn params(&self) -> SearchParameters {
        self.inner
            .params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the live parameters; the next search uses them
    pub fn set_params(&self, params: SearchParameters) {
        self.update_params(|current| *current = params);
    }

    /// Mutate the live parameters in place
    pub fn update_params(&self, f: impl FnOnce(&mut SearchParameters)) {
        let capacity = {
            let mut params = self.inner.params.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut params);
            params.history_capacity
        };
        self.history().set_capacity(capacity);
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.inner.aggregator.history()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.inner.aggregator
    }

    /// Register a submission observer
    pub fn on_submit(&self, handler: impl Fn(&SubmitEvent) + Send + Sync + 'static) {
        self.inner
            .submit_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Register an observer of displayed lists
    ///
    /// Handlers run while the displayed list is locked and must not call
    /// [`SuggestionController::displayed`].
    pub fn on_results(
        &self,
        handler: impl Fn(&str, &[RenderedSuggestion]) + Send + Sync + 'static,
    ) {
        self.inner
            .results_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Feed the current input value
    ///
    /// A search runs once the input has been quiet for the debounce
    /// interval; earlier values of a burst never reach the aggregator.
    pub fn input(&self, value: impl Into<String>) -> JoinHandle<()> {
        let value = value.into();
        let generation = self.inner.keystrokes.fetch_add(1, Ordering::SeqCst) + 1;
        let debounce = self.params().debounce;
        let controller = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if controller.inner.keystrokes.load(Ordering::SeqCst) != generation {
                debug!("Input '{}' superseded during debounce", value);
                return;
            }
            controller.search(&value).await;
        })
    }

    /// Search immediately and display the result
    ///
    /// Returns `None` when a newer invocation was issued before this one
    /// resolved; its result is then discarded.
    pub async fn search(&self, query: &str) -> Option<Vec<RenderedSuggestion>> {
        let seq = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let params = self.params();

        let set = self.inner.aggregator.suggest(query, &params).await;

        if self.inner.issued.load(Ordering::SeqCst) != seq {
            debug!("Discarding superseded results for '{}'", query);
            return None;
        }

        let suggestions: Vec<RenderedSuggestion> = set
            .into_items()
            .into_iter()
            .map(|item| self.rendered(item, query, &params))
            .collect();

        self.publish(seq, query, suggestions.clone())
            .then_some(suggestions)
    }

    /// Store the list as displayed unless a newer invocation got there first
    fn publish(&self, seq: u64, query: &str, suggestions: Vec<RenderedSuggestion>) -> bool {
        let mut displayed = self
            .inner
            .displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if displayed.seq > seq || self.inner.issued.load(Ordering::SeqCst) != seq {
            debug!("Discarding superseded results for '{}'", query);
            return false;
        }

        *displayed = Displayed {
            seq,
            query: query.to_string(),
            suggestions,
        };

        let handlers = self
            .inner
            .results_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            handler(&displayed.query, &displayed.suggestions);
        }

        true
    }

    /// The last displayed query and list
    pub fn displayed(&self) -> (String, Vec<RenderedSuggestion>) {
        let displayed = self
            .inner
            .displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        (displayed.query.clone(), displayed.suggestions.clone())
    }

    /// Display label of an item
    pub fn label(&self, item: &SuggestionItem) -> String {
        label_of(item, self.params().additional_source.as_ref())
    }

    /// Plain value of an item, used for matching and the input field
    pub fn result_value(&self, item: &SuggestionItem) -> String {
        extract_value(&self.label(item))
    }

    /// Highlighted, custom-rendered label of an item
    pub fn render(&self, item: &SuggestionItem, query: &str) -> String {
        self.rendered(item.clone(), query, &self.params()).html
    }

    fn rendered(
        &self,
        item: SuggestionItem,
        query: &str,
        params: &SearchParameters,
    ) -> RenderedSuggestion {
        let label = label_of(&item, params.additional_source.as_ref());
        let highlighted = highlight(&label, query);
        let html = match params.renderer {
            Some(ref renderer) => renderer(&item, &highlighted),
            None => highlighted,
        };

        RenderedSuggestion {
            html,
            value: extract_value(&label),
            item,
        }
    }

    /// Confirm a selection
    ///
    /// Every submit handler sees the event exactly once. Unless one of them
    /// prevents the default, the selection is recorded in the history under
    /// its display label (when history is enabled).
    pub fn submit(&self, item: &SuggestionItem) -> SubmitEvent {
        let params = self.params();
        let label = label_of(item, params.additional_source.as_ref());

        let event = SubmitEvent {
            result: item.payload(),
            label: label.clone(),
            item: item.clone().into_unwrapped(),
            default_prevented: AtomicBool::new(false),
        };

        info!("Submitting '{}' from {}", label, item.source());

        let handlers = self
            .inner
            .submit_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            handler(&event);
        }

        if params.history_enabled && !event.is_default_prevented() {
            self.history()
                .add(HistoryEntry::new(label, event.item.clone()));
        }

        event
    }
}

/// Label of an item; additional results go through the caller's extractor
fn label_of(item: &SuggestionItem, additional: Option<&Arc<dyn AdditionalSource>>) -> String {
    match item {
        SuggestionItem::Remote { feature, .. } => feature.label().to_string(),
        SuggestionItem::History(entry) => entry.key.clone(),
        SuggestionItem::Additional { result } => match additional {
            Some(source) => source.result_value(result),
            None => match result {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        },
    }
}
