use super::{messages, Dialogs};
use crate::api::{ApiClient, NumberForm, PlaceForm};
use crate::configuration::DefaultsConfig;
use crate::search::{normalize_input, CreateOffer, DebouncedSearch, SearchState};
use crate::shell::{Route, UnsavedChanges};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct SearchPage {
    api: Arc<ApiClient>,
    search: DebouncedSearch,
    query: String,
    defaults: DefaultsConfig,
}

impl UnsavedChanges for SearchPage {}

impl SearchPage {
    pub fn new(api: Arc<ApiClient>, debounce: Duration, defaults: DefaultsConfig) -> Self {
        let search = DebouncedSearch::spawn(api.clone(), debounce);
        Self {
            api,
            search,
            query: String::new(),
            defaults,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Handles a change of the search box and returns the normalised text shown.
    pub fn on_input(&mut self, raw: &str) -> &str {
        self.query = normalize_input(raw);
        self.search.input.push(&self.query);
        &self.query
    }

    pub fn state(&self) -> SearchState {
        self.search.current()
    }

    /// Waits until the results reflect the current query, or `limit` passes.
    pub async fn settle(&mut self, limit: Duration) -> SearchState {
        let query = self.query.clone();
        let results = &mut self.search.results;
        let wait = async {
            loop {
                if results.borrow().query == query {
                    break;
                }
                if results.changed().await.is_err() {
                    break;
                }
            }
        };
        if tokio::time::timeout(limit, wait).await.is_err() {
            info!(query = %query, "Search results did not settle in time");
        }
        self.state()
    }

    /// The create offer for the current query, if it matched nothing.
    pub fn submit(&self) -> Option<CreateOffer> {
        let state = self.state();
        if self.query.trim().is_empty() || state.query != self.query {
            return None;
        }
        state.offer
    }

    /// Confirms and creates the offered entity. Returns the route of the new record.
    pub async fn accept_offer(&mut self, offer: &CreateOffer, dialogs: &dyn Dialogs) -> Option<Route> {
        match offer {
            CreateOffer::Number { phone } => {
                if !dialogs.confirm(messages::ADD_NUMBER_TITLE, phone).await {
                    return None;
                }
                let form = NumberForm::new(phone, self.defaults.operator);
                match self.api.create_number(&form).await {
                    Ok(number) => {
                        info!(id = %number.id, phone = %number.phone, "Number created from search");
                        self.on_input("");
                        Some(Route::NumberDetail(number.id))
                    }
                    Err(e) => {
                        error!(err = %e, "Failed to create number");
                        dialogs.alert(&e.user_message(messages::ADD_NUMBER_FAILED)).await;
                        None
                    }
                }
            }
            CreateOffer::Place { name } => {
                if !dialogs.confirm(messages::ADD_PLACE_TITLE, name).await {
                    return None;
                }
                let form = PlaceForm::new(name, self.defaults.category);
                match self.api.create_place(&form).await {
                    Ok(place) => {
                        info!(id = %place.id, name = %place.name, "Place created from search");
                        self.on_input("");
                        Some(Route::PlaceDetail(place.id))
                    }
                    Err(e) => {
                        error!(err = %e, "Failed to create place");
                        dialogs.alert(&e.user_message(messages::ADD_PLACE_FAILED)).await;
                        None
                    }
                }
            }
        }
    }
}
