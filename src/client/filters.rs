use std::collections::HashMap;

use crate::catalog::{ClubQuery, FacetFilters, SortOption};
use crate::client::api::{ClientError, ClubsApi};
use crate::client::remote::RemoteData;
use crate::db::catalog::Club;

/// Session key the club filters are cached under.
pub const FILTERS_KEY: &str = "filters";

/// Per-tab key/value cache that survives back-navigation.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    entries: HashMap<String, String>,
}

impl SessionStorage {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Facet selection plus sort for the club listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    query: ClubQuery,
}

impl FilterState {
    pub fn filters(&self) -> &FacetFilters {
        &self.query.filters
    }

    pub fn sort(&self) -> SortOption {
        self.query.sort
    }

    pub fn query(&self) -> &ClubQuery {
        &self.query
    }

    /// Select `value` for `facet`, or clear it if it's already selected.
    ///
    /// A facet holds one value at a time: picking a different value
    /// replaces the previous one.
    pub fn toggle(&mut self, facet: &str, value: &str) {
        let filters = &mut self.query.filters;
        let selected = filters
            .get(facet)
            .is_some_and(|values| values.iter().any(|v| v == value));
        if !selected {
            filters.insert(facet.to_string(), vec![value.to_string()]);
            return;
        }

        let now_empty = filters.get_mut(facet).is_none_or(|values| {
            values.retain(|v| v != value);
            values.is_empty()
        });
        if now_empty {
            filters.remove(facet);
        }
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.query.sort = sort;
    }

    pub fn to_query_string(&self) -> String {
        self.query.to_query_string()
    }

    /// Parse a location query string, with or without the leading `?`.
    pub fn from_query_string(query: &str) -> Self {
        let params: HashMap<String, String> =
            url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect();
        Self {
            query: ClubQuery::from_params(&params),
        }
    }

    /// Cache the facet selection. Sort is not persisted.
    pub fn save(&self, session: &mut SessionStorage) {
        match serde_json::to_string(&self.query.filters) {
            Ok(json) => session.set(FILTERS_KEY, json),
            Err(e) => tracing::warn!(error = %e, "could not cache filters"),
        }
    }

    /// Restore a cached selection; a missing or corrupt entry yields no filters.
    pub fn restore(session: &SessionStorage) -> Self {
        let filters = session
            .get(FILTERS_KEY)
            .and_then(|json| serde_json::from_str::<FacetFilters>(json).ok())
            .unwrap_or_default();
        Self {
            query: ClubQuery {
                filters,
                sort: SortOption::default(),
            },
        }
    }
}

/// Storefront club listing: filter state kept in sync with the location
/// query string and the session cache.
pub struct ClubBrowser<A: ClubsApi> {
    api: A,
    state: FilterState,
    session: SessionStorage,
    location_query: String,
    clubs: RemoteData<Vec<Club>>,
}

impl<A: ClubsApi> ClubBrowser<A> {
    /// Open the listing. A non-empty location query wins over the session cache.
    pub async fn open(api: A, location_query: &str, session: SessionStorage) -> Self {
        let state = if location_query.trim_start_matches('?').is_empty() {
            FilterState::restore(&session)
        } else {
            FilterState::from_query_string(location_query)
        };

        let mut browser = Self {
            api,
            state,
            session,
            location_query: String::new(),
            clubs: RemoteData::Idle,
        };
        browser.sync().await;
        browser
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn clubs(&self) -> &RemoteData<Vec<Club>> {
        &self.clubs
    }

    pub fn location_query(&self) -> &str {
        &self.location_query
    }

    pub fn session(&self) -> &SessionStorage {
        &self.session
    }

    pub async fn toggle_filter(&mut self, facet: &str, value: &str) {
        self.state.toggle(facet, value);
        self.sync().await;
    }

    pub async fn set_sort(&mut self, sort: SortOption) {
        self.state.set_sort(sort);
        self.sync().await;
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.clubs = RemoteData::Loading;
        let result = self.api.list_clubs(self.state.query()).await;
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.clone());
        self.clubs = RemoteData::settle(result);
        outcome
    }

    async fn sync(&mut self) {
        self.location_query = self.state.to_query_string();
        self.state.save(&mut self.session);
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "club listing failed");
        }
    }
}
